use std::path::PathBuf;

use tally_platform::{RunnerConfig, run_terminal_app};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => RunnerConfig::load(&path)?,
        None => RunnerConfig::default(),
    };
    log::info!("starting signin ({})", config.title);
    run_terminal_app(signin::RootView, &config)
}
