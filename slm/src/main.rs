mod config;
mod routes;

use slm_client::Client;
use slm_core::{license::LicenseClient, scheduler::TaskScheduler, triggers};
use slm_database::{Database, MemoryStore, OptionStore};
use std::{error::Error, sync::Arc};
use tokio::{net::TcpListener, sync::mpsc};
use tracing_subscriber::EnvFilter;

use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn OptionStore> = if let Some(connection_string) = &config.database_conn {
        Arc::new(Database::new(connection_string).await?)
    } else {
        tracing::warn!("DATABASE_CONN is not set, the license state is kept in memory only");
        Arc::new(MemoryStore::new())
    };

    let (triggers_tx, triggers_rx) = mpsc::unbounded_channel();
    let scheduler = Arc::new(TaskScheduler::new(triggers_tx.clone()));
    let client = Arc::new(LicenseClient::new(
        config.settings,
        Arc::new(Client::new()),
        store,
        scheduler,
    ));

    let scheduled = client.restore_schedule().await?;
    tracing::info!(
        domain = %client.settings().registered_domain,
        version = %client.settings().version,
        scheduled,
        "license client ready"
    );
    tokio::spawn(triggers::run(client.clone(), triggers_rx));

    let app = routes::router(AppState {
        client,
        triggers: triggers_tx,
    });
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
