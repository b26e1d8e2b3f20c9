//! Process-wide registry of pools keyed by alias.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::RwLock;

use crate::lifecycle::DriverPool;

static GLOBAL: Lazy<Arc<PoolRegistry>> = Lazy::new(|| Arc::new(PoolRegistry::new()));

/// A driver pool that is currently registered.
pub(crate) struct ActivePool {
    pub(crate) pool: Arc<dyn DriverPool>,
    pub(crate) generation: u64,
    pub(crate) created_at: Instant,
}

/// The registry entry for one alias.
///
/// `state` is the lifecycle lock: leases hold a read guard, creation and
/// teardown hold the write guard. `active` and `leases` mirror the state
/// for lock-free existence checks.
pub(crate) struct PoolSlot {
    pub(crate) alias: &'static str,
    pub(crate) state: Arc<RwLock<Option<ActivePool>>>,
    pub(crate) active: AtomicBool,
    pub(crate) leases: AtomicUsize,
}

impl PoolSlot {
    fn new(alias: &'static str) -> Self {
        Self {
            alias,
            state: Arc::new(RwLock::new(None)),
            active: AtomicBool::new(false),
            leases: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }
}

/// Registry of named pools.
///
/// Every [`ConnectionPoolManager`](crate::ConnectionPoolManager) built on
/// the same registry and alias shares one pool. [`PoolRegistry::global`]
/// is the process-wide instance; tests build private registries.
#[derive(Default)]
pub struct PoolRegistry {
    slots: Mutex<HashMap<&'static str, Arc<PoolSlot>>>,
}

impl PoolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    #[must_use]
    pub fn global() -> Arc<PoolRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Get the slot for an alias, creating an empty one if needed.
    pub(crate) fn slot(&self, alias: &'static str) -> Arc<PoolSlot> {
        let mut slots = self.slots.lock();
        Arc::clone(
            slots
                .entry(alias)
                .or_insert_with(|| Arc::new(PoolSlot::new(alias))),
        )
    }

    /// Whether a pool is currently registered under `alias`.
    #[must_use]
    pub fn is_active(&self, alias: &str) -> bool {
        self.slots
            .lock()
            .get(alias)
            .is_some_and(|slot| slot.is_active())
    }

    /// Aliases with a registered pool.
    #[must_use]
    pub fn active_aliases(&self) -> Vec<&'static str> {
        let mut aliases: Vec<_> = self
            .slots
            .lock()
            .values()
            .filter(|slot| slot.is_active())
            .map(|slot| slot.alias)
            .collect();
        aliases.sort_unstable();
        aliases
    }
}

impl std::fmt::Debug for PoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("active", &self.active_aliases())
            .finish()
    }
}
