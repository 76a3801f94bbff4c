use std::sync::Mutex;
use std::time::Duration;

use crate::config::FeedIntervals;
use crate::modules::inventory::{InventoryCrud, ItemsPage, Laboratory};
use crate::modules::system::{HealthSnapshot, ServerStatus, SyncSnapshot, SystemCrud};
use crate::services::poller::{LivePoller, PollSubscription, SnapshotCell};
use crate::services::reset::ResetCoordinator;

pub const CLUSTER_FEED: &str = "cluster_status";
pub const HEALTH_FEED: &str = "system_health";
pub const SYNC_FEED: &str = "sync_status";
pub const LABS_FEED: &str = "labs";
pub const ITEMS_FEED: &str = "inventory_items";

struct Feeds {
    cluster: PollSubscription,
    fast_status: bool,
    // Held only to keep the subscriptions alive
    _others: Vec<PollSubscription>,
}

/// Owns the independent feeds an operator watches while exercising the cluster
pub struct Dashboard {
    poller: LivePoller,
    system: SystemCrud,
    inventory: InventoryCrud,
    intervals: FeedIntervals,
    cluster: SnapshotCell<Vec<ServerStatus>>,
    health: SnapshotCell<HealthSnapshot>,
    sync: SnapshotCell<SyncSnapshot>,
    labs: SnapshotCell<Vec<Laboratory>>,
    items: SnapshotCell<ItemsPage>,
    feeds: Mutex<Option<Feeds>>,
}

impl Dashboard {
    pub fn new(
        poller: LivePoller,
        system: SystemCrud,
        inventory: InventoryCrud,
        intervals: FeedIntervals,
    ) -> Self {
        Self {
            poller,
            system,
            inventory,
            intervals,
            cluster: SnapshotCell::new(),
            health: SnapshotCell::new(),
            sync: SnapshotCell::new(),
            labs: SnapshotCell::new(),
            items: SnapshotCell::new(),
            feeds: Mutex::new(None),
        }
    }

    pub fn cluster(&self) -> SnapshotCell<Vec<ServerStatus>> {
        self.cluster.clone()
    }

    pub fn health(&self) -> SnapshotCell<HealthSnapshot> {
        self.health.clone()
    }

    /// Polled on the health cadence but published on its own, so a failing
    /// `/sync/status` never hides a fresh health reading
    pub fn sync(&self) -> SnapshotCell<SyncSnapshot> {
        self.sync.clone()
    }

    pub fn labs(&self) -> SnapshotCell<Vec<Laboratory>> {
        self.labs.clone()
    }

    pub fn items(&self) -> SnapshotCell<ItemsPage> {
        self.items.clone()
    }

    pub fn intervals(&self) -> FeedIntervals {
        self.intervals
    }

    /// Shares the cluster snapshot so a reset is visible before the next tick
    pub fn reset_coordinator(&self) -> ResetCoordinator {
        ResetCoordinator::new(self.system.clone(), self.cluster.clone())
    }

    pub fn is_running(&self) -> bool {
        self.feeds.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Starts every feed. Calling it again while running is a no-op.
    pub fn start(&self) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        if feeds.is_some() {
            return;
        }

        let system = self.system.clone();
        let health = self.poller.subscribe(
            HEALTH_FEED,
            self.health.clone(),
            Some(self.intervals.health),
            move || {
                let system = system.clone();
                async move { system.health().await }
            },
        );

        let system = self.system.clone();
        let sync = self.poller.subscribe(
            SYNC_FEED,
            self.sync.clone(),
            Some(self.intervals.health),
            move || {
                let system = system.clone();
                async move { system.sync_status().await }
            },
        );

        let inventory = self.inventory.clone();
        let labs = self.poller.subscribe(LABS_FEED, self.labs.clone(), None, move || {
            let inventory = inventory.clone();
            async move { inventory.list_labs().await }
        });

        let inventory = self.inventory.clone();
        let items = self.poller.subscribe(
            ITEMS_FEED,
            self.items.clone(),
            Some(self.intervals.items),
            move || {
                let inventory = inventory.clone();
                async move { inventory.list_items().await }
            },
        );

        *feeds = Some(Feeds {
            cluster: self.subscribe_cluster(self.intervals.status),
            fast_status: false,
            _others: vec![health, sync, labs, items],
        });
        tracing::info!("📊 Dashboard feeds started");
    }

    /// Switches the cluster feed between the normal and the fast cadence.
    /// The held snapshot survives the switch.
    pub fn set_fast_status(&self, fast: bool) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        let Some(feeds) = feeds.as_mut() else {
            return;
        };
        if feeds.fast_status == fast {
            return;
        }

        feeds.cluster.cancel();
        let interval = if fast {
            self.intervals.fast_status
        } else {
            self.intervals.status
        };
        feeds.cluster = self.subscribe_cluster(interval);
        feeds.fast_status = fast;
    }

    pub fn is_fast_status(&self) -> bool {
        self.feeds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|feeds| feeds.fast_status)
    }

    /// Cancels every feed; snapshots keep their last values
    pub fn stop(&self) {
        let feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner()).take();
        if feeds.is_some() {
            // Dropping the subscriptions cancels them
            drop(feeds);
            tracing::info!("📊 Dashboard feeds stopped");
        }
    }

    fn subscribe_cluster(&self, interval: Duration) -> PollSubscription {
        let system = self.system.clone();
        self.poller
            .subscribe(CLUSTER_FEED, self.cluster.clone(), Some(interval), move || {
                let system = system.clone();
                async move { system.cluster_status().await }
            })
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.stop();
    }
}
