// src/main.rs — reviselab entry point

use clap::Parser;

use reviselab::cli::Cli;
use reviselab::infra::logger;

#[tokio::main]
async fn main() {
    // .env may hold OPENAI_API_KEY / TAVILY_API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logging(if cli.quiet { "warn" } else { "info" });

    if let Err(e) = reviselab::cli::dispatch(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
