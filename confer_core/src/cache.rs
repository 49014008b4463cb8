use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::command::Command;
use crate::error::ScanError;

static GLOBAL: OnceLock<Arc<ScanCache>> = OnceLock::new();

/// Scanned commands, memoized per type for the lifetime of the cache.
///
/// Reads share the lock; a miss scans outside of the lock and publishes the first result to arrive.
/// Scan errors are not cached.
#[derive(Debug, Default)]
pub struct ScanCache {
    commands: RwLock<HashMap<TypeId, Arc<Command>>>,
}

impl ScanCache {
    /// The process wide cache, used by pipelines with the standard scanner and registry.
    pub fn global() -> Arc<ScanCache> {
        GLOBAL.get_or_init(|| Arc::new(ScanCache::default())).clone()
    }

    /// The cached command for `type_id`, if any.
    pub fn get(&self, type_id: TypeId) -> Option<Arc<Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
    }

    /// The cached command for `type_id`, or else the result of `scan` (which is cached when successful).
    pub fn get_or_scan(
        &self,
        type_id: TypeId,
        scan: impl FnOnce() -> Result<Command, ScanError>,
    ) -> Result<Arc<Command>, ScanError> {
        if let Some(command) = self.get(type_id) {
            return Ok(command);
        }

        let command = Arc::new(scan()?);
        let mut commands = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let published = commands.entry(type_id).or_insert(command);
        debug!("Cached the command '{}'.", published.name());
        Ok(published.clone())
    }

    /// The number of cached commands.
    pub fn len(&self) -> usize {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no command is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
