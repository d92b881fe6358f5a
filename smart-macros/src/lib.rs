use proc_macro::TokenStream;

mod attrs;
mod entity_model;
mod fields;

/// 实体模型宏
/// - 若缺失则追加字段 `id: IdType` 并置于字段最前
/// - 合并派生：`Debug`、`Clone`、`Default`、`serde::Serialize`、`serde::Deserialize`，
///   并追加 `#[serde(default)]`，使部分参数也能构造实体
/// - 自动实现 `::smart_entity::entity::EntityModel`（`TYPE/TABLE/FIELDS/id/validate`）
/// - 支持参数：`#[entity_model(name = "...", table = "...", id = IdType, validate = path)]`
///   - `name` 默认结构体名
///   - `table` 默认与 `name` 相同；多态实体可共享父类型的表
///   - `id` 默认 `String`，仅在结构体缺少 `id` 字段时生效
///   - `validate` 指向 `fn(&Self, ValidateProfile) -> Vec<ConstraintViolation>`
#[proc_macro_attribute]
pub fn entity_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_model::expand(attr, item)
}
