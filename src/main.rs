use clap::Parser as _;

mod app;
mod cli;
mod config;
mod shell;
mod views;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
    let cli = cli::Cli::parse();
    cli::run(cli).await
}
