//! 实体（Entity）基础抽象
//!
//! - `EntityModel`：面向业务代码的强类型实体定义（通常由 `#[entity_model]` 宏生成实现）；
//! - `Entity`：对象安全的实体视图，供引擎、委托器在运行时以 `Box<dyn Entity>` 形式传递。
//!
//! 任何实现 `EntityModel` 的类型都会自动获得 `Entity` 实现。
//!
use crate::error::DomainResult;
use crate::validation::{ConstraintViolation, ValidateProfile};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::any::Any;
use std::fmt::Debug;

/// 运行时传递的实体实例
pub type BoxEntity = Box<dyn Entity>;

/// 强类型实体定义
pub trait EntityModel:
    Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static
{
    /// 实体类型标识（服务定义中的 `entity_name` 指向它）
    const TYPE: &'static str;

    /// 存储表名；同一继承体系下的实体共享同一张表
    const TABLE: &'static str = Self::TYPE;

    /// 标识字段名
    const ID_FIELD: &'static str = "id";

    /// 声明的字段（序列化后的键名）
    const FIELDS: &'static [&'static str];

    type Id: Serialize;

    fn id(&self) -> &Self::Id;

    /// 实体自带的校验规则，默认无规则
    fn validate(&self, _profile: ValidateProfile) -> Vec<ConstraintViolation> {
        Vec::new()
    }
}

/// 对象安全的实体视图
pub trait Entity: Debug + Send + Sync {
    /// 具体类型标识（多态体系下为子类型）
    fn entity_type(&self) -> &'static str;

    fn table(&self) -> &'static str;

    fn id_value(&self) -> DomainResult<Value>;

    fn to_value(&self) -> DomainResult<Value>;

    fn validate(&self, profile: ValidateProfile) -> Vec<ConstraintViolation>;

    fn clone_box(&self) -> BoxEntity;

    fn as_any(&self) -> &dyn Any;
}

impl<T: EntityModel> Entity for T {
    fn entity_type(&self) -> &'static str {
        T::TYPE
    }

    fn table(&self) -> &'static str {
        T::TABLE
    }

    fn id_value(&self) -> DomainResult<Value> {
        Ok(serde_json::to_value(EntityModel::id(self))?)
    }

    fn to_value(&self) -> DomainResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self, profile: ValidateProfile) -> Vec<ConstraintViolation> {
        EntityModel::validate(self, profile)
    }

    fn clone_box(&self) -> BoxEntity {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Clone for BoxEntity {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl dyn Entity {
    /// 还原为具体实体类型
    pub fn downcast_ref<T: EntityModel>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Tag {
        id: u64,
        label: String,
    }

    impl EntityModel for Tag {
        const TYPE: &'static str = "Tag";
        const FIELDS: &'static [&'static str] = &["id", "label"];
        type Id = u64;

        fn id(&self) -> &u64 {
            &self.id
        }
    }

    #[test]
    fn blanket_entity_view() {
        let tag = Tag {
            id: 7,
            label: "rust".into(),
        };
        let boxed: BoxEntity = Box::new(tag);

        assert_eq!(boxed.entity_type(), "Tag");
        assert_eq!(boxed.table(), "Tag");
        assert_eq!(boxed.id_value().unwrap(), serde_json::json!(7));
        assert_eq!(
            boxed.to_value().unwrap(),
            serde_json::json!({"id": 7, "label": "rust"})
        );
        assert!(boxed.validate(ValidateProfile::Create).is_empty());

        let copy = boxed.clone();
        assert_eq!(copy.downcast_ref::<Tag>().unwrap().label, "rust");
    }
}
