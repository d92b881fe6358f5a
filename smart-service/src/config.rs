use crate::context::keys;

/// 实体自动引擎配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAutoConfig {
    /// 未指定 `pageNo` 时的页码
    pub default_page_no: u32,
    /// 未指定 `pageSize` 时的页大小
    pub default_page_size: u32,
    /// 默认排序使用的“更新时间”字段；实体声明了该字段且未指定 `orderBy` 时按其降序
    pub updated_at_field: String,
}

impl Default for EntityAutoConfig {
    fn default() -> Self {
        Self {
            default_page_no: 1,
            default_page_size: 20,
            updated_at_field: keys::UPDATED_AT.to_string(),
        }
    }
}
