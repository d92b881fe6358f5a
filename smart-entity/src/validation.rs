//! 约束校验（Validation）
//!
//! 校验器按“校验场景”（`ValidateProfile`）检查实体实例，返回零个或多个
//! 约束违例；空列表即为通过。规则本身如何表达不在本 crate 的范围内，
//! 默认实现 `EntityRulesValidator` 只是把校验委托给实体自身。
//!
use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 校验场景：同一实体在新建与更新时可适用不同规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidateProfile {
    Create,
    Update,
}

impl fmt::Display for ValidateProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidateProfile::Create => "CREATE",
            ValidateProfile::Update => "UPDATE",
        };
        f.write_str(s)
    }
}

/// 单条约束违例
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    /// 违例字段
    pub field: String,
    /// 违反的规则标识（如 `required`、`max_length`）
    pub rule: String,
    /// 可读消息
    pub message: String,
}

impl ConstraintViolation {
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// 校验器
pub trait Validator: Send + Sync {
    fn validate(&self, entity: &dyn Entity, profile: ValidateProfile) -> Vec<ConstraintViolation>;
}

/// 将校验委托给实体自身（`EntityModel::validate`）的默认校验器
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityRulesValidator;

impl Validator for EntityRulesValidator {
    fn validate(&self, entity: &dyn Entity, profile: ValidateProfile) -> Vec<ConstraintViolation> {
        entity.validate(profile)
    }
}
