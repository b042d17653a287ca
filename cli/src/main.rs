use clap::Parser;
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;
use verbnav_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = verbnav_cli::run(cli).await {
        eprintln!(
            "{} {err:#}",
            "error:".if_supports_color(Stream::Stderr, |t| t.red())
        );
        std::process::exit(1);
    }
}
