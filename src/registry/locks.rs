//! Per-entity write locks.
//!
//! Writers of the same record queue on one async mutex for the whole
//! read-modify-commit cycle, so they never race each other's version
//! preconditions. Entries are dropped from the table once no writer holds
//! or waits on them.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type EntityKey = (String, &'static str, String);

#[derive(Debug, Default)]
pub(super) struct EntityLocks {
    entries: Mutex<HashMap<EntityKey, Arc<Mutex<()>>>>,
}

impl EntityLocks {
    /// Wait for exclusive write access to one record of a tenant.
    pub(super) async fn acquire(
        &self,
        tenant_id: &str,
        resource_type: &'static str,
        id: &str,
    ) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().await;
            // Only the table holds idle entries
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            entries
                .entry((tenant_id.to_string(), resource_type, id.to_string()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        entries.len()
    }
}
