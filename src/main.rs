use afaire::config::{Config, USAGE};
use afaire::error::{self, AfaireError, ConfigError};
use afaire::{logging, TuiApplication};
use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(AfaireError::Config(ConfigError::MissingDirectory)) => {
            println!("{}", USAGE);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    logging::init(&config.log);
    error::setup_panic_handler();
    log::info!("starting afaire in {}", config.directory.display());

    let directory = config.directory.display().to_string();
    let mut app = TuiApplication::new(config)
        .with_context(|| format!("failed to start editor for {}", directory))?;
    app.run().context("terminal session failed")?;
    Ok(())
}
