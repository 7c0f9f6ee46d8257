//! zmetricsd daemon.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use zmetricsdlib::{
    config::{load_config, ConfigOverrides},
    init_logging, runner,
};

#[derive(Parser, Debug)]
#[command(name = "zmetricsd", about = "Per-block privacy metrics for a Zcash node")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "./zmetrics.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args.config, &args.overrides) {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            error!("{e}");
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);
    info!(
        "Loaded config. Base TOML file checked: '{}'",
        args.config.display()
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(runner::run(config)) {
        error!("Run failed: {e}");
        std::process::exit(1);
    }
}
