use crate::{
    context::ServiceContext, engine::Engine, error::ServiceError, registry::ServiceRegistry,
    result::ServiceResult,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 服务调度器
/// - 持有服务注册表与按名称注册的引擎
/// - 按服务定义的 `engine_name` 选择引擎并转发调用
/// - 鉴权、事务等策略开关由上层解释，这里只记录
pub struct ServiceDispatcher {
    registry: Arc<ServiceRegistry>,
    engines: DashMap<&'static str, Arc<dyn Engine>>,
}

impl ServiceDispatcher {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            engines: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// 注册引擎；同名引擎只能注册一次
    pub fn register_engine(&self, engine: Arc<dyn Engine>) -> Result<(), ServiceError> {
        let name = engine.name();
        if self.engines.contains_key(name) {
            return Err(ServiceError::AlreadyRegisteredEngine(name.to_string()));
        }
        self.engines.insert(name, engine);
        Ok(())
    }

    /// 已注册的引擎名（只读视图）
    pub fn registered_engines(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| *e.key()).collect()
    }

    #[instrument(skip_all, fields(service = %service_name))]
    pub async fn run_sync(
        &self,
        service_name: &str,
        ctx: &ServiceContext,
    ) -> Result<ServiceResult, ServiceError> {
        if service_name.trim().is_empty() {
            return Err(ServiceError::EmptyServiceName);
        }
        let model = self
            .registry
            .lookup(service_name)
            .ok_or_else(|| ServiceError::ServiceNotFound(service_name.to_string()))?;

        let engine_name = model
            .engine_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ServiceError::ServiceMisconfigured {
                service: service_name.to_string(),
                reason: "engine name is not set".to_string(),
            })?;
        let Some(engine) = self.engines.get(engine_name).map(|e| Arc::clone(e.value())) else {
            return Err(ServiceError::EngineNotFound {
                service: service_name.to_string(),
                engine: engine_name.to_string(),
            });
        };

        debug!(
            engine = engine_name,
            require_auth = model.require_auth,
            transaction = model.transaction,
            callbacks = ?model.callbacks,
            "dispatching service"
        );
        engine.run_sync(service_name, ctx).await
    }
}
