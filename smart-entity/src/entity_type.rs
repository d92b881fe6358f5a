//! 实体类型描述与加载
//!
//! `EntityType` 是按名称解析出的类型描述（字段、表名、实例工厂），
//! 一经加载即不可变。`EntityTypeLoader` 定义“按名称加载”的协议；
//! `EntityTypeRegistry` 是启动时由配置装配的默认实现。
//!
use crate::entity::{BoxEntity, EntityModel};
use crate::error::{DomainError, DomainResult};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

type Factory = fn(Value) -> DomainResult<BoxEntity>;

/// 实体类型描述
#[derive(Clone)]
pub struct EntityType {
    name: &'static str,
    table: &'static str,
    id_field: &'static str,
    fields: &'static [&'static str],
    factory: Factory,
}

impl EntityType {
    /// 由强类型实体生成描述
    pub fn of<T: EntityModel>() -> Self {
        Self {
            name: T::TYPE,
            table: T::TABLE,
            id_field: T::ID_FIELD,
            fields: T::FIELDS,
            factory: instantiate::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn id_field(&self) -> &'static str {
        self.id_field
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// 从字段映射构造实体实例
    pub fn instantiate(&self, value: Value) -> DomainResult<BoxEntity> {
        (self.factory)(value)
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("id_field", &self.id_field)
            .field("fields", &self.fields)
            .finish()
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table == other.table
    }
}

fn instantiate<T: EntityModel>(value: Value) -> DomainResult<BoxEntity> {
    let entity: T = serde_json::from_value(value).map_err(|e| DomainError::Conversion {
        entity_type: T::TYPE.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Box::new(entity))
}

/// 按名称加载实体类型
///
/// 加载可能较为昂贵（读取配置、构造描述等），调用方应自行缓存结果。
pub trait EntityTypeLoader: Send + Sync {
    fn load(&self, name: &str) -> Option<EntityType>;
}

/// 启动期装配的实体类型注册表
#[derive(Default)]
pub struct EntityTypeRegistry {
    types: HashMap<&'static str, EntityType>,
}

impl EntityTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册实体类型（同名覆盖）
    pub fn register<T: EntityModel>(mut self) -> Self {
        self.types.insert(T::TYPE, EntityType::of::<T>());
        self
    }
}

impl EntityTypeLoader for EntityTypeRegistry {
    fn load(&self, name: &str) -> Option<EntityType> {
        self.types.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Note {
        id: String,
        body: String,
        updated_at: Option<String>,
    }

    impl EntityModel for Note {
        const TYPE: &'static str = "Note";
        const FIELDS: &'static [&'static str] = &["id", "body", "updated_at"];
        type Id = String;

        fn id(&self) -> &String {
            &self.id
        }
    }

    #[test]
    fn registry_loads_registered_types_only() {
        let registry = EntityTypeRegistry::new().register::<Note>();

        let ty = registry.load("Note").unwrap();
        assert_eq!(ty.name(), "Note");
        assert_eq!(ty.id_field(), "id");
        assert!(ty.has_field("updated_at"));
        assert!(registry.load("Missing").is_none());
    }

    #[test]
    fn instantiate_fills_defaults_and_reports_bad_input() {
        let ty = EntityType::of::<Note>();

        let note = ty
            .instantiate(serde_json::json!({"id": "n-1"}))
            .unwrap();
        assert_eq!(note.downcast_ref::<Note>().unwrap().body, "");

        let err = ty
            .instantiate(serde_json::json!({"id": 42}))
            .unwrap_err();
        match err {
            DomainError::Conversion { entity_type, .. } => assert_eq!(entity_type, "Note"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
