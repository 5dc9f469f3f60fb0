use stowage_api::setup::{initialize_app, server::start_server};
use stowage_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let app = initialize_app(config.clone()).await?;

    let served = start_server(&config, app.router).await;

    // Pending jobs stay queued for the next start
    app.queue.shutdown().await;

    served
}
