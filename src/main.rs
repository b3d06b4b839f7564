use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatline")]
#[command(about = "A line-oriented terminal client for one-to-one chat servers")]
#[command(
    long_about = "Chatline signs in to a chat server's REST API, keeps the session \
across runs, and lets you browse the user directory and exchange one-to-one \
messages from the terminal.\n\n\
Configuration lives in config.toml under the platform config directory; the \
--server flag overrides it for one run. Set RUST_LOG for diagnostic output."
)]
struct Args {
    /// Chat server base URL (overrides the configured one)
    #[arg(short, long)]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatline=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    chatline::cli::run(args.server).await
}
