//! 实体层基础库（smart-entity）
//!
//! 为声明式服务引擎提供实体侧的通用抽象：
//! - 实体建模（`entity`）与按名称解析的类型描述（`entity_type`）
//! - 持久化委托器协议（`delegator`）及内存实现（`inmemory_delegator`）
//! - 参数到实体的转换（`converter`）与约束校验（`validation`）
//! - 查询选项与分页结果（`query`）
//!
//! 本 crate 不绑定具体存储、查询语言或校验规则语言，只定义引擎所需的最小协议，
//! 由基础设施层（如数据库访问层）提供具体实现并在每次调用时注入。
//!
pub mod converter;
pub mod delegator;
pub mod entity;
pub mod entity_type;
pub mod error;
pub mod inmemory_delegator;
pub mod query;
pub mod validation;

pub use converter::{EntityConverter, SerdeEntityConverter};
pub use delegator::Delegator;
pub use entity::{BoxEntity, Entity, EntityModel};
pub use entity_type::{EntityType, EntityTypeLoader, EntityTypeRegistry};
pub use error::{DomainError, DomainResult};
pub use inmemory_delegator::InMemoryDelegator;
pub use query::{Direction, FieldSet, FindOptions, OrderBy, Page, PageRequest};
pub use validation::{ConstraintViolation, EntityRulesValidator, ValidateProfile, Validator};

// 允许在本 crate 内部通过 ::smart_entity 进行自引用，
// 以便过程宏在本 crate 的测试中也能解析到 ::smart_entity 路径。
extern crate self as smart_entity;
