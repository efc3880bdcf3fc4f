use colored::Colorize;
use log::{error, info, warn};
use prenota_server::{run_server, ConfigError, ServerConfig};
use thiserror::Error;
use tokio::runtime;

mod logging;

#[derive(Debug, Error)]
enum PrenotaError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Server stopped: {0}")]
    Server(#[from] std::io::Error),
}

impl PrenotaError {
    fn hint(&self) -> String {
        match self {
            PrenotaError::Config(_) => "Check the PRENOTA_* environment variables, numeric ones must be plain whole numbers.".to_string(),
            PrenotaError::Server(_) => "Make sure the port is free and the process is allowed to bind it.".to_string(),
        }
    }
}

fn run() -> Result<(), PrenotaError> {
    let config = ServerConfig::from_env()?;

    for missing in config.missing() {
        // Requests needing it will fail with a 500 naming the variable
        warn!("{} is not set", missing);
    }

    info!("Building async runtime...");
    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("prenota-async")
        .build()?;

    info!("Initialized successfully, serving on port {}", config.port);
    runtime.block_on(run_server(config))?;

    Ok(())
}

fn main() {
    logging::init_logger();

    if let Err(error) = run() {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "prenota failed!".bold().red()
        );
        error!("{}", error);
        error!(
            "{}",
            format!("Hint: {}", error.hint()).dimmed().italic()
        );
    }
}
