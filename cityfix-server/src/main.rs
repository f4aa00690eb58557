use cityfix_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load .env before reading any configuration
    dotenv::dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env()?;

    // 3. Work dir and logger
    setup_environment(&config)?;
    print_banner();
    tracing::info!(environment = %config.environment, "CityFix server starting...");

    // 4. Open storage and wire services
    let state = ServerState::initialize(&config)?;

    // 5. Serve until ctrl-c
    if let Err(e) = Server::new(config, state).run().await {
        tracing::error!(error = %e, "Server exited with error");
        return Err(e.into());
    }

    Ok(())
}
