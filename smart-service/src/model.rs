//! 服务定义（ServiceModel）
//!
//! 一个可调用服务的声明式描述：名称、目标实体、操作类型、策略开关与参数声明。
//! 定义一经构造即不可变，重新注册时整体替换。
//!
use bon::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 实体自动服务的操作类型
///
/// 未识别的操作名保留在 `Other` 中，引擎对其不做任何处理。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Remove,
    FindById,
    FindListByAnd,
    FindListByCondition,
    FindPageByAnd,
    FindPageByCondition,
    Other(String),
}

impl OperationKind {
    pub fn as_str(&self) -> &str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Remove => "remove",
            OperationKind::FindById => "findById",
            OperationKind::FindListByAnd => "findListByAnd",
            OperationKind::FindListByCondition => "findListByCond",
            OperationKind::FindPageByAnd => "findPageByAnd",
            OperationKind::FindPageByCondition => "findPageByCond",
            OperationKind::Other(s) => s,
        }
    }
}

impl FromStr for OperationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "create" => OperationKind::Create,
            "update" => OperationKind::Update,
            "remove" => OperationKind::Remove,
            "findById" => OperationKind::FindById,
            "findListByAnd" => OperationKind::FindListByAnd,
            "findListByCond" | "findListByCondition" => OperationKind::FindListByCondition,
            "findPageByAnd" => OperationKind::FindPageByAnd,
            "findPageByCond" | "findPageByCondition" => OperationKind::FindPageByCondition,
            other => OperationKind::Other(other.to_string()),
        };
        Ok(kind)
    }
}

impl From<&str> for OperationKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OperationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OperationKind::from(s.as_str()))
    }
}

/// 服务参数声明（仅用于自省，引擎不据此校验）
#[derive(Builder, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parameter {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub description: Option<String>,
    #[builder(default)]
    pub required: bool,
    #[builder(into)]
    pub default_value: Option<String>,
    #[serde(rename = "type")]
    #[builder(into)]
    pub type_name: Option<String>,
}

/// 服务定义
///
/// `require_auth`、`export`、`persist`、`transaction` 与 `callbacks`
/// 由外层调度器解释，引擎只原样保留。
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub engine_name: Option<String>,
    #[builder(into)]
    pub entity_name: Option<String>,
    pub invoke: Option<OperationKind>,
    #[builder(into)]
    pub location: Option<String>,
    #[builder(into)]
    pub description: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub require_auth: bool,
    #[serde(default)]
    #[builder(default)]
    pub export: bool,
    #[serde(default = "default_persist")]
    #[builder(default = true)]
    pub persist: bool,
    #[serde(default)]
    #[builder(default)]
    pub transaction: bool,
    /// 调用完成后通知的回调名称，按声明顺序
    #[serde(default, alias = "callback")]
    #[builder(default)]
    pub callbacks: Vec<String>,
    #[serde(default)]
    #[builder(default)]
    pub parameters: Vec<Parameter>,
}

fn default_persist() -> bool {
    true
}

impl ServiceModel {
    /// 查找参数声明
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
