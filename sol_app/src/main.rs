//! Sol: opens a window and runs the Solarium renderer
//!
//! Settings come from `solarium.toml` in the working directory when it
//! exists; `RUST_LOG` overrides the configured log level.

use solarium::prelude::*;
use std::path::Path;
use std::process::ExitCode;

const APP_NAME: &str = "Sol";
const CONFIG_PATH: &str = "solarium.toml";

fn load_config() -> Result<ApplicationConfig, ConfigError> {
    if Path::new(CONFIG_PATH).exists() {
        ApplicationConfig::load_from_file(CONFIG_PATH)
    } else {
        Ok(ApplicationConfig::new(APP_NAME))
    }
}

fn run(config: &ApplicationConfig) -> Result<(), EngineError> {
    let mut engine = Engine::new(config)?;
    engine.run()
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            logging::fatal(&format!("Failed to load {CONFIG_PATH}: {e}"));
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.engine.log_level);
    log::info!("Starting {}", config.renderer.application_name);

    match run(&config) {
        Ok(()) => {
            log::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            logging::fatal(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
