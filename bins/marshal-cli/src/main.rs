mod cmd;
mod config;
mod error;
mod hex;

use clap::Parser;
use config::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let codec = match config::effective_codec(&cli.global) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Encode(args) => cmd::encode::run(&args, &codec),
        Commands::Decode(args) => cmd::decode::run(&args, &codec),
        Commands::Column(args) => cmd::column::run(&args, &codec),
        Commands::Inspect(args) => cmd::inspect::run(&args, &codec),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
