use smart_entity::delegator::Delegator;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// 调用上下文中的保留键
///
/// 键名与既有调用方约定一致，不可更改。
pub mod keys {
    /// 委托器句柄（随上下文传入，不在参数映射中）
    pub const DELEGATOR: &str = "delegator";
    pub const ENTITY_ID: &str = "entityId";
    pub const USE_CACHE: &str = "useCache";
    pub const CONDITION: &str = "condition";
    pub const AND_MAP: &str = "andMap";
    pub const FIELDS_TO_SELECT: &str = "fieldsToSelect";
    pub const ORDER_BY: &str = "orderBy";
    pub const PAGE_NO: &str = "pageNo";
    pub const PAGE_SIZE: &str = "pageSize";
    pub const RETURN_NAME: &str = "returnName";
    /// 实体的“更新时间”字段，用于默认排序
    pub const UPDATED_AT: &str = "updated_at";

    // --- 结果键 ---
    pub const MODEL: &str = "model";
    pub const MODEL_LIST: &str = "modelList";
    pub const REMOVED_MODEL: &str = "removedModel";
}

/// 服务调用上下文（Invocation Context）
///
/// 承载一次调用的松散参数映射与本次调用使用的委托器：
/// - `params`：调用方提供的原始参数，包括实体字段与保留键；
/// - `delegator`：持久化入口，逐次调用注入，因而每次调用可指向不同的存储/会话。
///
/// 典型用法：
/// ```rust
/// use smart_service::context::ServiceContext;
/// use smart_entity::InMemoryDelegator;
/// use std::sync::Arc;
///
/// let ctx = ServiceContext::new()
///     .with_delegator(Arc::new(InMemoryDelegator::new()))
///     .with("title", "hello")
///     .with("pageSize", 50);
/// assert_eq!(ctx.get("pageSize"), Some(&serde_json::json!(50)));
/// ```
#[derive(Clone, Default)]
pub struct ServiceContext {
    pub params: Map<String, Value>,
    pub delegator: Option<Arc<dyn Delegator>>,
}

impl ServiceContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: Map<String, Value>) -> Self {
        Self {
            params,
            delegator: None,
        }
    }

    pub fn with_delegator(mut self, delegator: Arc<dyn Delegator>) -> Self {
        self.delegator = Some(delegator);
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn delegator(&self) -> Option<&Arc<dyn Delegator>> {
        self.delegator.as_ref()
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContext")
            .field("params", &self.params)
            .field(keys::DELEGATOR, &self.delegator.is_some())
            .finish()
    }
}
