//! 实体层统一错误定义
//!
//! 聚焦参数转换、校验、仓储访问与约束冲突等最小必要集合，
//! 委托器（Delegator）、转换器与校验器的实现统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 数据库驱动在约束冲突时常见的错误标记
const CONSTRAINT_MARKER: &str = "CONSTRAINT";

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化/参数转换 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("conversion failed: entity={entity_type}, reason={reason}")]
    Conversion { entity_type: String, reason: String },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch { expected: String, found: String },

    // --- 仓储/持久化 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("database error: {reason}")]
    Database { reason: String },
    #[error("constraint violation: {reason}")]
    ConstraintViolation { reason: String },
    #[error("unsupported operation: {reason}")]
    Unsupported { reason: String },

    // --- 值与状态 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

impl DomainError {
    /// 是否为引用完整性（约束）冲突
    ///
    /// 除了显式的 `ConstraintViolation` 外，也识别消息中带有大写 `CONSTRAINT`
    /// 标记的数据库错误（部分驱动只在消息里体现约束名）。标记区分大小写，
    /// `NOT NULL constraint failed` 之类的普通约束错误不计入。
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DomainError::ConstraintViolation { .. } => true,
            DomainError::Database { reason } | DomainError::Repository { reason } => {
                reason.contains(CONSTRAINT_MARKER)
            }
            _ => false,
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----

#[cfg(feature = "infra-sqlx")]
impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound {
                reason: "row not found".to_string(),
            },
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::ConstraintViolation {
                    reason: db.message().to_string(),
                }
            }
            other => DomainError::Database {
                reason: other.to_string(),
            },
        }
    }
}

impl From<std::num::ParseIntError> for DomainError {
    fn from(err: std::num::ParseIntError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<std::str::ParseBoolError> for DomainError {
    fn from(err: std::str::ParseBoolError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
