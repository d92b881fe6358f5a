//! 统一结果信封（ServiceResult）
//!
//! 所有操作类型共用同一形态：成功时为操作相关的结果映射，失败（业务问题）时为带
//! 机器可读代码、可读消息与可选结构化详情的问题报告。调用方只需按判别字段分支。
//!
use serde::Serialize;
use serde_json::{Map, Value};

/// 问题代码
pub mod codes {
    pub const VALIDATION_NOT_PASSED: &str = "VALIDATION_NOT_PASSED";
    pub const ENTITY_ID_REQUIRED: &str = "ENTITY_ID_REQUIRED";
    pub const ENTITY_REFERENCED_CONSTRAINT: &str = "ENTITY_REFERENCED_CONSTRAINT";
    pub const ENTITY_AUTO_ENGINE_ERROR: &str = "ENTITY_AUTO_ENGINE_ERROR";
}

/// 松散映射形态下使用的键
pub const RESPONSE_MESSAGE: &str = "responseMessage";
pub const RESPONSE_SUCCESS: &str = "success";
pub const RESPONSE_PROBLEM: &str = "problem";
pub const PROBLEM_CODE: &str = "problemCode";
pub const PROBLEM_MESSAGE: &str = "problemMessage";
pub const PROBLEM_DETAIL: &str = "problemDetail";

/// 业务问题报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub code: String,
    pub message: String,
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResult {
    Success(Map<String, Value>),
    Problem(Problem),
}

impl ServiceResult {
    pub fn success() -> Self {
        ServiceResult::Success(Map::new())
    }

    pub fn problem(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceResult::Problem(Problem {
            code: code.into(),
            message: message.into(),
            detail: None,
        })
    }

    pub fn problem_with_detail(
        code: impl Into<String>,
        message: impl Into<String>,
        detail: Value,
    ) -> Self {
        ServiceResult::Problem(Problem {
            code: code.into(),
            message: message.into(),
            detail: Some(detail),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ServiceResult::Success(_))
    }

    /// 成功结果中的某个键
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            ServiceResult::Success(map) => map.get(key),
            ServiceResult::Problem(_) => None,
        }
    }

    pub fn as_problem(&self) -> Option<&Problem> {
        match self {
            ServiceResult::Problem(p) => Some(p),
            ServiceResult::Success(_) => None,
        }
    }

    /// 投影为松散映射，供无类型边界（远程调用、脚本等）使用
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            ServiceResult::Success(mut map) => {
                map.insert(RESPONSE_MESSAGE.into(), RESPONSE_SUCCESS.into());
                map
            }
            ServiceResult::Problem(p) => {
                let mut map = Map::new();
                map.insert(RESPONSE_MESSAGE.into(), RESPONSE_PROBLEM.into());
                map.insert(PROBLEM_CODE.into(), p.code.into());
                map.insert(PROBLEM_MESSAGE.into(), p.message.into());
                if let Some(detail) = p.detail {
                    map.insert(PROBLEM_DETAIL.into(), detail);
                }
                map
            }
        }
    }
}
