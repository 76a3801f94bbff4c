use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

/// Latest state of one feed. `value` is replaced wholesale on every successful tick.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    pub value: Option<T>,
    pub last_error: Option<String>,
    pub ticks: u64,
    pub failures: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            value: None,
            last_error: None,
            ticks: 0,
            failures: 0,
            updated_at: None,
        }
    }
}

/// Shared, observable snapshot of a feed. Cloning shares the same cell.
pub struct SnapshotCell<T> {
    tx: Arc<watch::Sender<FeedState<T>>>,
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> SnapshotCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FeedState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> FeedState<T> {
        self.tx.borrow().clone()
    }

    pub fn value(&self) -> Option<T> {
        self.tx.borrow().value.clone()
    }

    /// Successful tick: the new value replaces the old one and clears the error
    pub fn replace(&self, value: T) {
        self.tx.send_modify(|state| {
            state.value = Some(value);
            state.last_error = None;
            state.ticks += 1;
            state.updated_at = Some(Utc::now());
        });
    }

    /// Failed tick: the previous value stays visible next to the error
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.last_error = Some(message);
            state.ticks += 1;
            state.failures += 1;
        });
    }

    /// Local edit of the held value. Returns false when nothing is held yet.
    pub fn modify_value(&self, edit: impl FnOnce(&mut T)) -> bool {
        self.tx.send_if_modified(|state| match state.value.as_mut() {
            Some(value) => {
                edit(value);
                true
            }
            None => false,
        })
    }
}
