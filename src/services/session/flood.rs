use chrono::Utc;
use rand::seq::IndexedRandom;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::registry::{SessionError, SessionHandle, SessionKind, SessionRegistry};
use crate::modules::inventory::{InventoryCrud, ItemCreate};
use crate::services::metrics::SessionMetricsCollector;

pub const ITEM_TYPES: [&str; 7] = ["PC", "Laptop", "Monitor", "Impresora", "Proyector", "Router", "Switch"];
pub const ITEM_STATUSES: [&str; 3] = ["Operativa", "Dañada", "En Mantenimiento"];
pub const ITEM_AREAS: [&str; 6] = ["Sala 1", "Sala 2", "Sala 3", "Laboratorio A", "Laboratorio B", "Bodega"];

/// Random payload; the code is unique per (millisecond, iteration)
pub fn random_item(iteration: u32) -> ItemCreate {
    let mut rng = rand::rng();
    let now = Utc::now();

    ItemCreate {
        code: format!("FLOOD-{}-{}", now.timestamp_millis(), iteration),
        item_type: pick(&ITEM_TYPES, &mut rng),
        status: pick(&ITEM_STATUSES, &mut rng),
        area: pick(&ITEM_AREAS, &mut rng),
        acquisition_date: Some(now.format("%Y-%m-%d").to_string()),
    }
}

fn pick(values: &[&str], rng: &mut impl rand::Rng) -> String {
    values.choose(rng).copied().unwrap_or_default().to_string()
}

#[derive(Debug, Clone)]
pub struct FloodConfig {
    pub max_items: u32,
    /// Pause after each create call
    pub delay: Duration,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloodProgress {
    pub attempted: u32,
    pub created: u32,
    pub failed: u32,
    /// Created items the backend reported as written to the backup path
    pub saved_to_backup: u32,
    pub max_items: u32,
    pub finished: bool,
}

/// Sequential create-item campaign used to saturate the primary store
#[derive(Clone)]
pub struct BulkFlooder {
    inventory: InventoryCrud,
    registry: SessionRegistry,
    config: FloodConfig,
}

impl BulkFlooder {
    pub fn new(inventory: InventoryCrud, registry: SessionRegistry) -> Self {
        Self::with_config(inventory, registry, FloodConfig::default())
    }

    pub fn with_config(inventory: InventoryCrud, registry: SessionRegistry, config: FloodConfig) -> Self {
        Self {
            inventory,
            registry,
            config,
        }
    }

    /// Same flooder with a different item budget
    pub fn with_max_items(&self, max_items: u32) -> Self {
        let mut flooder = self.clone();
        flooder.config.max_items = max_items;
        flooder
    }

    pub fn config(&self) -> &FloodConfig {
        &self.config
    }

    pub fn start(&self) -> Result<FloodSession, SessionError> {
        let handle = self.registry.try_start(SessionKind::Flood)?;
        let (tx, rx) = watch::channel(FloodProgress {
            max_items: self.config.max_items,
            ..FloodProgress::default()
        });

        tracing::info!("🌊 Flood session started ({} items)", self.config.max_items);

        let task = tokio::spawn(run_flood(
            self.inventory.clone(),
            self.registry.clone(),
            handle.clone(),
            self.config.clone(),
            tx,
            self.registry.metrics().cloned(),
        ));

        Ok(FloodSession {
            handle,
            registry: self.registry.clone(),
            progress: rx,
            task: Some(task),
        })
    }
}

async fn run_flood(
    inventory: InventoryCrud,
    registry: SessionRegistry,
    handle: SessionHandle,
    config: FloodConfig,
    progress: watch::Sender<FloodProgress>,
    metrics: Option<SessionMetricsCollector>,
) -> FloodProgress {
    let token: &CancellationToken = handle.token();

    for iteration in 1..=config.max_items {
        if token.is_cancelled() {
            break;
        }

        // An in-flight create finishes and is counted even if stop arrives meanwhile
        let item = random_item(iteration);
        let outcome = inventory.create_item(&item).await;

        progress.send_modify(|p| {
            p.attempted += 1;
            match &outcome {
                Ok(response) => {
                    p.created += 1;
                    if response.source.is_backup() {
                        p.saved_to_backup += 1;
                    }
                }
                Err(_) => p.failed += 1,
            }
        });

        match &outcome {
            Ok(response) => {
                tracing::info!("✅ Flood item {} created via {}", item.code, response.source);
                if let Some(metrics) = &metrics {
                    metrics.record_request(SessionKind::Flood.as_str(), true);
                    metrics.record_flood_item(response.source.as_str());
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ Flood item {} skipped: {}", item.code, e);
                if let Some(metrics) = &metrics {
                    metrics.record_request(SessionKind::Flood.as_str(), false);
                }
            }
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(config.delay) => {}
        }
    }

    progress.send_modify(|p| p.finished = true);
    registry.stop(&handle);

    let summary = progress.borrow().clone();
    tracing::info!(
        "🏁 Flood session finished: {}/{} created, {} failed, {} on backup",
        summary.created,
        summary.max_items,
        summary.failed,
        summary.saved_to_backup
    );
    summary
}

/// A running flood campaign. Dropping it stops the campaign.
pub struct FloodSession {
    handle: SessionHandle,
    registry: SessionRegistry,
    progress: watch::Receiver<FloodProgress>,
    task: Option<JoinHandle<FloodProgress>>,
}

impl FloodSession {
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn progress(&self) -> FloodProgress {
        self.progress.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FloodProgress> {
        self.progress.clone()
    }

    pub fn stop(&self) {
        self.registry.stop(&self.handle);
    }

    /// Resolves once the campaign ends, by budget or by stop
    pub async fn wait(mut self) -> FloodProgress {
        let result = match self.task.take() {
            Some(task) => task.await.ok(),
            None => None,
        };
        result.unwrap_or_else(|| self.progress())
    }
}

impl Drop for FloodSession {
    fn drop(&mut self) {
        self.stop();
    }
}
