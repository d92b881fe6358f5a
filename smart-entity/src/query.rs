//! 查询参数与分页结果
//!
//! 描述委托器查询共享的选项：投影字段、排序、是否走缓存，以及分页请求/结果。
//! 过滤条件本身（等值映射或预编译条件串）由委托器解释。
//!
use crate::error::{DomainError, DomainResult};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 投影字段集合
pub type FieldSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

/// 单个排序键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// 支持 `field`、`field ASC`、`field DESC` 与 `-field`（降序）
impl FromStr for OrderBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(field) = s.strip_prefix('-') {
            return non_empty(field).map(OrderBy::desc);
        }

        let mut parts = s.split_whitespace();
        let field = non_empty(parts.next().unwrap_or_default())?;
        let direction = match parts.next() {
            None => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) => {
                return Err(DomainError::Parse {
                    reason: format!("invalid order direction: {d}"),
                });
            }
        };
        if parts.next().is_some() {
            return Err(DomainError::Parse {
                reason: format!("invalid order clause: {s}"),
            });
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

fn non_empty(field: &str) -> DomainResult<&str> {
    let field = field.trim();
    if field.is_empty() {
        return Err(DomainError::Parse {
            reason: "empty order field".to_string(),
        });
    }
    Ok(field)
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => write!(f, "{} ASC", self.field),
            Direction::Desc => write!(f, "{} DESC", self.field),
        }
    }
}

/// 列表/分页查询共享选项
#[derive(Builder, Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// 投影字段；为空表示全部字段
    pub fields: Option<FieldSet>,
    /// 排序键；为空表示由存储决定
    pub order_by: Option<Vec<OrderBy>>,
    #[builder(default)]
    pub use_cache: bool,
}

/// 分页请求，页码从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_no: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_no: u32, page_size: u32) -> DomainResult<Self> {
        if page_no == 0 || page_size == 0 {
            return Err(DomainError::InvalidValue {
                reason: format!("page_no and page_size must be positive: {page_no}/{page_size}"),
            });
        }
        Ok(Self { page_no, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page_no as usize - 1) * self.page_size as usize
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total_count: u64,
    pub page_no: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        let total_pages = total_count.div_ceil(u64::from(request.page_size));
        Self {
            list,
            total_count,
            page_no: request.page_no,
            page_size: request.page_size,
            total_pages,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let list = self.list.into_iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Page {
            list,
            total_count: self.total_count,
            page_no: self.page_no,
            page_size: self.page_size,
            total_pages: self.total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_parsing() {
        assert_eq!("name".parse::<OrderBy>().unwrap(), OrderBy::asc("name"));
        assert_eq!(
            "updated_at desc".parse::<OrderBy>().unwrap(),
            OrderBy::desc("updated_at")
        );
        assert_eq!("-score".parse::<OrderBy>().unwrap(), OrderBy::desc("score"));
        assert!("name sideways".parse::<OrderBy>().is_err());
        assert!(" ".parse::<OrderBy>().is_err());
        assert_eq!(OrderBy::desc("updated_at").to_string(), "updated_at DESC");
    }

    #[test]
    fn page_math() {
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.offset(), 40);

        let page = Page::new(vec![1, 2], 41, req);
        assert_eq!(page.total_pages, 3);
        assert!(PageRequest::new(0, 20).is_err());
    }

    #[test]
    fn page_serializes_camel_case() {
        let page = Page::new(vec!["a"], 1, PageRequest::new(1, 20).unwrap());
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "list": ["a"],
                "totalCount": 1,
                "pageNo": 1,
                "pageSize": 20,
                "totalPages": 1
            })
        );
    }
}
