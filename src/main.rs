mod app;

use std::path::PathBuf;

fn main() {
    env_logger::init();
    log::info!("junkle starting up");

    let mut options = app::Options::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--fast" => options.fast = true,
            _ if arg.starts_with("--seed=") => match arg["--seed=".len()..].parse() {
                Ok(seed) => options.seed = Some(seed),
                Err(e) => {
                    log::error!("Bad seed {arg:?}: {e}");
                    std::process::exit(2);
                }
            },
            _ => options.config_path = Some(PathBuf::from(&arg)),
        }
    }

    if let Err(e) = app::run(options) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
