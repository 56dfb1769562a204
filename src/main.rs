mod cli;
mod config;
mod core;
mod models;

use clap::Parser;
use log::{warn, LevelFilter};
use simplelog::{ColorChoice, Config as LogConfig, TermLogger, TerminalMode};

fn main() {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let _ = TermLogger::init(level, LogConfig::default(), TerminalMode::Mixed, ColorChoice::Auto);

    if let Err(e) = ctrlc::set_handler(|| {
        warn!("the program execution was interrupted");
        std::process::exit(130);
    }) {
        warn!("could not install the interrupt handler: {}", e);
    }

    if let Err(e) = cli::run(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
