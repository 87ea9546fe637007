use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

pub const TENANT_LIST_TAG: &str = "tenants:list";

pub fn tenant_detail_tag(id: Uuid) -> String {
    format!("tenant:{}", id)
}

/// In-process invalidation signal for cached console views. Lifecycle
/// mutations bump a per-tag generation counter; view consumers compare
/// generations to decide whether a cached page is stale.
pub struct ViewCache {
    generations: RwLock<HashMap<String, u64>>,
}

impl ViewCache {
    pub fn global() -> &'static ViewCache {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<ViewCache> = OnceLock::new();
        INSTANCE.get_or_init(ViewCache::new)
    }

    pub fn new() -> Self {
        Self {
            generations: RwLock::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self, tag: &str) {
        let mut generations = self.generations.write().expect("view cache lock poisoned");
        *generations.entry(tag.to_string()).or_insert(0) += 1;
    }

    pub fn generation(&self, tag: &str) -> u64 {
        let generations = self.generations.read().expect("view cache lock poisoned");
        generations.get(tag).copied().unwrap_or(0)
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}
