use crate::model::ServiceModel;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// 服务名到服务定义的注册表
/// - 并发安全，可在运行期热替换定义
/// - 重新注册同名服务时整体替换，已被取走的旧定义不受影响
#[derive(Default)]
pub struct ServiceRegistry {
    services: DashMap<String, Arc<ServiceModel>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册（或替换）服务定义，返回被替换的旧定义
    pub fn register(&self, model: ServiceModel) -> Option<Arc<ServiceModel>> {
        debug!(service = %model.name, invoke = ?model.invoke, "service registered");
        self.services.insert(model.name.clone(), Arc::new(model))
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ServiceModel>> {
        self.services.get(name).map(|m| Arc::clone(m.value()))
    }

    /// 已注册的服务名（只读视图）
    pub fn registered_services(&self) -> Vec<String> {
        self.services.iter().map(|e| e.key().clone()).collect()
    }
}

impl FromIterator<ServiceModel> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = ServiceModel>>(iter: I) -> Self {
        let registry = Self::new();
        for model in iter {
            registry.register(model);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationKind;

    fn model(name: &str, kind: OperationKind) -> ServiceModel {
        ServiceModel::builder()
            .name(name)
            .entity_name("Article")
            .invoke(kind)
            .build()
    }

    #[test]
    fn register_replaces_without_mutating_previous() {
        let registry = ServiceRegistry::new();
        assert!(registry.register(model("svc", OperationKind::Create)).is_none());

        let before = registry.lookup("svc").unwrap();
        let replaced = registry.register(model("svc", OperationKind::Remove)).unwrap();

        assert_eq!(before.invoke, Some(OperationKind::Create));
        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(
            registry.lookup("svc").unwrap().invoke,
            Some(OperationKind::Remove)
        );
    }

    #[test]
    fn collects_and_lists() {
        let registry: ServiceRegistry = [
            model("a", OperationKind::Create),
            model("b", OperationKind::FindById),
        ]
        .into_iter()
        .collect();

        let mut names = registry.registered_services();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert!(registry.lookup("c").is_none());
    }
}
