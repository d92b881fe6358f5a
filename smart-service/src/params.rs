//! 保留键的读取与类型收敛
//!
//! 调用方以松散形式传参，这里负责把保留键收敛为强类型；类型不符时返回
//! `DomainError::Parse`，由引擎统一转换为问题报告。
//!
use serde_json::{Map, Value};
use smart_entity::error::{DomainError, DomainResult};
use smart_entity::query::{FieldSet, OrderBy};

fn mismatch(key: &str, expected: &str, found: &Value) -> DomainError {
    DomainError::Parse {
        reason: format!("{key}: expected {expected}, found {found}"),
    }
}

/// 读取值，`null` 视为缺失
pub(crate) fn present<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    params.get(key).filter(|v| !v.is_null())
}

/// id 为空：缺失、`null`、空白字符串或空容器
pub(crate) fn is_empty_id(id: Option<&Value>) -> bool {
    match id {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

pub(crate) fn read_bool(params: &Map<String, Value>, key: &str) -> DomainResult<Option<bool>> {
    match present(params, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => Ok(Some(s.trim().parse()?)),
        Some(other) => Err(mismatch(key, "boolean", other)),
    }
}

pub(crate) fn read_str<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> DomainResult<Option<&'a str>> {
    match present(params, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(mismatch(key, "string", other)),
    }
}

pub(crate) fn read_map<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> DomainResult<Option<&'a Map<String, Value>>> {
    match present(params, key) {
        None => Ok(None),
        Some(Value::Object(m)) => Ok(Some(m)),
        Some(other) => Err(mismatch(key, "object", other)),
    }
}

fn read_strings(params: &Map<String, Value>, key: &str) -> DomainResult<Option<Vec<String>>> {
    match present(params, key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                other => Err(mismatch(key, "string item", other)),
            })
            .collect::<DomainResult<Vec<_>>>()
            .map(Some),
        // 逗号分隔的单个字符串
        Some(Value::String(s)) => Ok(Some(
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )),
        Some(other) => Err(mismatch(key, "array of strings", other)),
    }
}

pub(crate) fn read_fields(params: &Map<String, Value>, key: &str) -> DomainResult<Option<FieldSet>> {
    Ok(read_strings(params, key)?.map(|v| v.into_iter().collect()))
}

pub(crate) fn read_order_by(
    params: &Map<String, Value>,
    key: &str,
) -> DomainResult<Option<Vec<OrderBy>>> {
    read_strings(params, key)?
        .map(|v| v.iter().map(|s| s.parse()).collect::<DomainResult<Vec<_>>>())
        .transpose()
}

/// 数字或数字字符串收敛为正整数
pub(crate) fn read_positive(
    params: &Map<String, Value>,
    key: &str,
) -> DomainResult<Option<u32>> {
    let n: i64 = match present(params, key) {
        None => return Ok(None),
        Some(v @ Value::Number(n)) => n.as_i64().ok_or_else(|| mismatch(key, "integer", v))?,
        Some(Value::String(s)) => s.trim().parse()?,
        Some(other) => return Err(mismatch(key, "integer", other)),
    };

    u32::try_from(n)
        .ok()
        .filter(|n| *n > 0)
        .map(Some)
        .ok_or_else(|| DomainError::InvalidValue {
            reason: format!("{key} must be a positive integer, got {n}"),
        })
}
