//! 参数到实体的转换（Converter）
//!
//! 将调用方传入的松散参数映射尽早转换为强类型实体实例。
//!
use crate::delegator::Delegator;
use crate::entity::BoxEntity;
use crate::entity_type::EntityType;
use crate::error::DomainResult;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait EntityConverter: Send + Sync {
    /// 按目标类型构造实体；`delegator` 供需要解析关联实体的实现使用
    async fn convert(
        &self,
        ty: &EntityType,
        params: &Map<String, Value>,
        delegator: &dyn Delegator,
    ) -> DomainResult<BoxEntity>;
}

/// 基于 serde 的默认转换器
///
/// 只保留目标类型声明过的字段（保留键与多余参数被忽略），
/// 缺失字段由实体的 `Default` 补齐。
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeEntityConverter;

#[async_trait]
impl EntityConverter for SerdeEntityConverter {
    async fn convert(
        &self,
        ty: &EntityType,
        params: &Map<String, Value>,
        _delegator: &dyn Delegator,
    ) -> DomainResult<BoxEntity> {
        let fields: Map<String, Value> = params
            .iter()
            .filter(|(k, _)| ty.has_field(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        ty.instantiate(Value::Object(fields))
    }
}
