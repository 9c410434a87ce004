use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::resolver::{Metadata, Mode, ResolveError, Resolver};

type Slot = Arc<Mutex<Option<Metadata>>>;

/// Memoizes resolver results by unit name for the lifetime of one run.
///
/// Keyed by name only: the first successful resolution of a name is
/// returned for every later request, whatever its mode or source
/// directory. Failures are never stored, so a failed name is retried the
/// next time it is requested.
///
/// Each name gets its own slot. Concurrent first requests for the same
/// name queue on that slot and the later ones are answered by the first;
/// requests for different names never wait on each other's resolver call.
pub struct ResolutionCache<R> {
    resolver: R,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<R: Resolver> ResolutionCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Cached metadata for `name`, calling the resolver on a miss.
    pub fn resolve(
        &self,
        name: &str,
        source_dir: &Path,
        mode: Mode,
    ) -> Result<Metadata, ResolveError> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(name.to_string()).or_default())
        };

        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(meta) = entry.as_ref() {
            tracing::trace!(name, "cache hit");
            return Ok(meta.clone());
        }

        tracing::trace!(name, ?mode, "cache miss");
        let meta = self.resolver.resolve(name, source_dir, mode)?;
        *entry = Some(meta.clone());
        Ok(meta)
    }

    /// Number of names with a stored result.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .is_some_and(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
    }
}
