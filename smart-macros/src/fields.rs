use crate::attrs::serde_value;
use syn::{Field, FieldsNamed, Token, Type, punctuated::Punctuated};

fn is_named(f: &Field, name: &str) -> bool {
    f.ident.as_ref().map(|i| i == name).unwrap_or(false)
}

/// 确保存在指定字段并将其移至最前
/// - 已存在时复用原定义（保留其类型与属性）
/// - 缺失时以给定类型新增
///
/// 返回该字段最终的类型。
pub(crate) fn ensure_leading_field(fields_named: &mut FieldsNamed, name: &str, ty: &Type) -> Type {
    let old_named = fields_named.named.clone();
    let mut new_named: Punctuated<Field, Token![,]> = Punctuated::new();

    let leading = match old_named.iter().find(|f| is_named(f, name)) {
        Some(existing) => existing.clone(),
        None => {
            let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
            syn::parse_quote! { pub #ident: #ty }
        }
    };
    let leading_ty = leading.ty.clone();
    new_named.push(leading);

    for f in old_named.into_iter().filter(|f| !is_named(f, name)) {
        new_named.push(f);
    }

    fields_named.named = new_named;
    leading_ty
}

/// 计算字段序列化后的键名
/// - 字段级 `#[serde(rename = "...")]` 优先
/// - 其次应用容器级 `rename_all`（支持 `camelCase` 与 `snake_case`）
/// - 标记 `#[serde(skip)]` 的字段不计入
pub(crate) fn serialized_names(
    fields_named: &FieldsNamed,
    rename_all: Option<&str>,
) -> syn::Result<Vec<String>> {
    let mut names = Vec::with_capacity(fields_named.named.len());
    for f in fields_named.named.iter() {
        if serde_value(&f.attrs, "skip")?.is_some() {
            continue;
        }
        if let Some(Some(renamed)) = serde_value(&f.attrs, "rename")? {
            names.push(renamed);
            continue;
        }

        let Some(ident) = f.ident.as_ref() else {
            continue;
        };
        let raw = ident.to_string();
        let raw = raw.strip_prefix("r#").unwrap_or(&raw).to_string();
        let name = match rename_all {
            None | Some("snake_case") => raw,
            Some("camelCase") => to_camel_case(&raw),
            Some(other) => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("#[entity_model] does not support rename_all = \"{other}\""),
                ));
            }
        };
        names.push(name);
    }
    Ok(names)
}

fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
