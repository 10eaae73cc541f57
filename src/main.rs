use project_hub::cli::{commands::handle_command, Cli, Parser};
use project_hub::utils::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG still wins over the configured level
    let default_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    handle_command(cli, config).await
}
