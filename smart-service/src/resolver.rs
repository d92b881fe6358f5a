use crate::error::ServiceError;
use dashmap::DashMap;
use smart_entity::entity_type::{EntityType, EntityTypeLoader};
use std::sync::Arc;
use tracing::debug;

/// 实体类型解析器
/// - 按名称解析实体类型描述，并在进程生命周期内缓存
/// - 缓存只增不减；并发首次解析同一名称时可能重复加载，但最终收敛到同一描述
pub struct EntityTypeResolver {
    loader: Arc<dyn EntityTypeLoader>,
    cache: DashMap<String, Arc<EntityType>>,
}

impl EntityTypeResolver {
    pub fn new(loader: Arc<dyn EntityTypeLoader>) -> Self {
        Self {
            loader,
            cache: DashMap::new(),
        }
    }

    pub fn resolve(&self, entity_type: &str) -> Result<Arc<EntityType>, ServiceError> {
        if let Some(hit) = self.cache.get(entity_type) {
            return Ok(Arc::clone(hit.value()));
        }

        // 加载期间不持有分片锁
        let loaded = self
            .loader
            .load(entity_type)
            .ok_or_else(|| ServiceError::EntityTypeNotFound(entity_type.to_string()))?;
        debug!(entity = entity_type, "entity type loaded");

        let cached = self
            .cache
            .entry(entity_type.to_string())
            .or_insert_with(|| Arc::new(loaded));
        Ok(Arc::clone(cached.value()))
    }

    /// 已缓存的实体类型数量
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use smart_entity::entity::EntityModel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Sku {
        id: String,
    }

    impl EntityModel for Sku {
        const TYPE: &'static str = "Sku";
        const FIELDS: &'static [&'static str] = &["id"];
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        loads: AtomicUsize,
    }

    impl EntityTypeLoader for CountingLoader {
        fn load(&self, name: &str) -> Option<EntityType> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            (name == Sku::TYPE).then(EntityType::of::<Sku>)
        }
    }

    #[test]
    fn caches_after_first_resolution() {
        let loader = Arc::new(CountingLoader::default());
        let resolver = EntityTypeResolver::new(loader.clone());

        let a = resolver.resolve("Sku").unwrap();
        let b = resolver.resolve("Sku").unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn unknown_type_is_fatal_and_not_cached() {
        let resolver = EntityTypeResolver::new(Arc::new(CountingLoader::default()));
        match resolver.resolve("Ghost").unwrap_err() {
            ServiceError::EntityTypeNotFound(name) => assert_eq!(name, "Ghost"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(resolver.cached_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_resolution_converges() {
        let resolver = Arc::new(EntityTypeResolver::new(Arc::new(CountingLoader::default())));

        let mut set = JoinSet::new();
        for _ in 0..64 {
            let resolver = resolver.clone();
            set.spawn(async move { resolver.resolve("Sku").unwrap() });
        }

        let mut resolved = Vec::new();
        while let Some(res) = set.join_next().await {
            resolved.push(res.unwrap());
        }

        assert_eq!(resolved.len(), 64);
        assert_eq!(resolver.cached_len(), 1);
        let cached = resolver.resolve("Sku").unwrap();
        assert!(resolved.iter().all(|ty| Arc::ptr_eq(ty, &cached)));
    }
}
