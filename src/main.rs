//! Reflecto CLI entry point.

use clap::Parser;

use reflecto::cli::commands;
use reflecto::cli::context::load_config;
use reflecto::cli::{handle_error, Cli, Commands};
use reflecto::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, json),
    };

    let _logger = match LogConfig::from_settings(&config.logging).and_then(|c| LoggerImpl::init(&c)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, json).await,
        Commands::Session(args) => commands::session::execute(args, &config, json).await,
        Commands::Daily(args) => commands::daily::execute(args, &config, json).await,
        Commands::Ask(args) => commands::ask::execute(args, json).await,
        Commands::Mood(args) => commands::mood::execute(args, &config, json).await,
        Commands::Memory(args) => commands::memory::execute(args, &config, json).await,
    };

    if let Err(err) = result {
        handle_error(err, json);
    }
}
