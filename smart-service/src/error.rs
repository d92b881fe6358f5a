/// 使用/配置类错误
///
/// 表示调用点或服务元数据存在问题，直接以 `Err` 返回调用方，不做重试；
/// 业务问题（校验失败、缺少 id 等）不在此列，而是以 `ServiceResult::Problem` 返回。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("the service name is empty")]
    EmptyServiceName,

    #[error("the service context is missing: service={0}")]
    ContextMissing(String),

    #[error("unable to locate the service: {0}")]
    ServiceNotFound(String),

    #[error("service misconfigured: service={service}, reason={reason}")]
    ServiceMisconfigured { service: String, reason: String },

    #[error("service requires a delegator: {0}")]
    DelegatorRequired(String),

    #[error("entity type not found: {0}")]
    EntityTypeNotFound(String),

    #[error("engine not found: service={service}, engine={engine}")]
    EngineNotFound { service: String, engine: String },

    #[error("engine already registered: {0}")]
    AlreadyRegisteredEngine(String),
}
