pub mod config;
pub mod modules;
pub mod services;

use std::sync::Arc;

use config::Config;
use modules::auth::AuthCrud;
use modules::inventory::InventoryCrud;
use modules::system::SystemCrud;
use services::dashboard::Dashboard;
use services::metrics::{MetricsError, MetricsRegistry};
use services::poller::LivePoller;
use services::session::{BulkFlooder, LoadGenerator, SessionRegistry};
use services::transport::{CredentialStore, ResilientTransport, Transport};

/// Everything wired around one shared resilient transport
pub struct AppContext {
    pub transport: Arc<dyn Transport>,
    pub credentials: CredentialStore,
    pub metrics: Arc<MetricsRegistry>,
    pub sessions: SessionRegistry,
    pub auth: AuthCrud,
    pub inventory: InventoryCrud,
    pub system: SystemCrud,
    pub dashboard: Dashboard,
    pub load_generator: LoadGenerator,
    pub flooder: BulkFlooder,
}

pub fn create_context(config: &Config) -> Result<AppContext, MetricsError> {
    let metrics = MetricsRegistry::new()?;
    let credentials = CredentialStore::with_token(config.token.clone());

    let transport: Arc<dyn Transport> = Arc::new(
        ResilientTransport::new(
            config.api_url.clone(),
            config.request_timeout,
            credentials.clone(),
            config.retry.clone(),
        )
        .with_metrics(metrics.clone()),
    );

    Ok(create_context_with_transport(transport, credentials, metrics, config))
}

/// Same wiring over any transport
pub fn create_context_with_transport(
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    metrics: Arc<MetricsRegistry>,
    config: &Config,
) -> AppContext {
    let sessions = SessionRegistry::new().with_metrics(metrics.clone());
    let auth = AuthCrud::new(transport.clone(), credentials.clone());
    let inventory = InventoryCrud::new(transport.clone());
    let system = SystemCrud::new(transport.clone());

    let dashboard = Dashboard::new(
        LivePoller::new().with_metrics(metrics.clone()),
        system.clone(),
        inventory.clone(),
        config.intervals,
    );
    let load_generator = LoadGenerator::new(transport.clone(), sessions.clone());
    let flooder = BulkFlooder::new(inventory.clone(), sessions.clone());

    AppContext {
        transport,
        credentials,
        metrics,
        sessions,
        auth,
        inventory,
        system,
        dashboard,
        load_generator,
        flooder,
    }
}
