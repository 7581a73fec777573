use glam::Vec3;

use crate::collab::Classifier;

/// Entry stored alongside the hash so overlap queries never touch the ECS.
#[derive(Debug, Clone, Copy)]
pub struct EntitySnapshot {
    pub entity: hecs::Entity,
    pub pos: Vec3,
    pub classifier: Classifier,
}

/// Spatial hash over the ground plane (x, z).
///
/// Uses multiplicative hash for even distribution.
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    /// Each bucket holds snapshot indices. Pre-allocated, cleared each rebuild.
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            buckets.push(Vec::with_capacity(8));
        }
        Self {
            inv_cell_size: 1.0 / cell_size,
            table_size,
            buckets,
        }
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear(); // Keeps allocation.
        }
    }

    pub fn insert(&mut self, pos: Vec3, index: u32) {
        let hash = self.hash(pos);
        self.buckets[hash].push(index);
    }

    /// Visit every index in cells overlapping a square of half-size `radius`.
    /// Callers still need an exact distance check; hash collisions can also
    /// report the same index twice for large radii.
    ///
    /// A square with at least as many cells as the table visits each bucket
    /// once instead, so the cost never exceeds one pass over the table.
    pub fn query_radius(&self, pos: Vec3, radius: f32, mut callback: impl FnMut(u32)) {
        let span = (radius * self.inv_cell_size).ceil().max(1.0);
        let side = 2.0 * span + 1.0;
        if !side.is_finite() || side * side >= self.table_size as f32 {
            for bucket in &self.buckets {
                for &index in bucket {
                    callback(index);
                }
            }
            return;
        }

        let (cx, cy) = self.cell_coords(pos);
        let reach = span as i32;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let hash = self.hash_cell(cx.wrapping_add(dx), cy.wrapping_add(dy));
                for &index in &self.buckets[hash] {
                    callback(index);
                }
            }
        }
    }

    fn cell_coords(&self, pos: Vec3) -> (i32, i32) {
        let cx = (pos.x * self.inv_cell_size).floor() as i32;
        let cy = (pos.z * self.inv_cell_size).floor() as i32;
        (cx, cy)
    }

    fn hash(&self, pos: Vec3) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        self.hash_cell(cx, cy)
    }

    fn hash_cell(&self, cx: i32, cy: i32) -> usize {
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}
