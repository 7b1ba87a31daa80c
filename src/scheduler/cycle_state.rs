use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// State shared by the plugins of one scheduling cycle. Readers may run concurrently.
#[derive(Default)]
pub struct CycleState {
    data: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl CycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write<T: Any + Send + Sync>(&self, key: &str, value: T) {
        // a poisoned lock only means a writer panicked; the map itself is intact
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());
        data.insert(key.to_string(), Arc::new(value));
    }

    pub fn read<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        data.get(key).cloned().and_then(|v| v.downcast::<T>().ok())
    }
}
