use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Loaded models keyed by model ID.
///
/// Lookups of loaded models only take a read lock. First loads of one ID are
/// serialized by a per-ID lock, so racing callers wait for and share a single
/// load instead of each building their own model. A per-ID lock is dropped
/// once its model is in, and kept after a failed load so retries stay
/// serialized. Models are never evicted.
pub struct ModelCache<M: ?Sized> {
    models: RwLock<HashMap<String, Arc<M>>>,
    loading: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<M: ?Sized> Default for ModelCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> ModelCache<M> {
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    /// The loaded model for `model_id`, if any.
    pub fn get(&self, model_id: &str) -> Option<Arc<M>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_id)
            .cloned()
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(model_id)
    }

    /// Number of loaded models.
    pub fn len(&self) -> usize {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the model for `model_id`, running `load` first if it is not
    /// loaded yet.
    ///
    /// A failed load leaves the ID unloaded; the next call tries again.
    pub fn get_or_load<E, F>(&self, model_id: &str, load: F) -> Result<Arc<M>, E>
    where
        F: FnOnce(&str) -> Result<Arc<M>, E>,
    {
        if let Some(model) = self.get(model_id) {
            return Ok(model);
        }

        let key_lock = Arc::clone(
            self.loading
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(model_id.to_string())
                .or_default(),
        );
        let _guard = key_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the load while we waited.
        if let Some(model) = self.get(model_id) {
            return Ok(model);
        }

        let model = load(model_id)?;
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model_id.to_string(), Arc::clone(&model));

        // Later callers find the model on the read path and never need this
        // lock again. Waiters still hold their own handle to it.
        self.loading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(model_id);
        Ok(model)
    }
}
