use crate::attrs::{apply_derives, serde_value};
use crate::fields::{ensure_leading_field, serialized_names};
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Item, ItemStruct, LitStr, Result, Token, Type, parse::Parse, parse::ParseStream,
    parse_macro_input,
};

/// #[entity_model] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as EntityModelConfig);
    let input = parse_macro_input!(item as Item);

    let st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[entity_model] only on struct")
                .to_compile_error()
                .into();
        }
    };

    match expand_struct(cfg, st) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand_struct(cfg: EntityModelConfig, mut st: ItemStruct) -> Result<proc_macro2::TokenStream> {
    if !st.generics.params.is_empty() {
        return Err(syn::Error::new(
            st.generics.span(),
            "#[entity_model] does not support generic structs",
        ));
    }

    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return Err(syn::Error::new(
                st.span(),
                "only supports named-field struct",
            ));
        }
    };

    let default_id: Type = syn::parse_quote! { String };
    let id_type = ensure_leading_field(fields_named, "id", cfg.id_ty.as_ref().unwrap_or(&default_id));

    let rename_all = serde_value(&st.attrs, "rename_all")?.flatten();
    let field_names = serialized_names(fields_named, rename_all.as_deref())?;
    let id_field = field_names
        .first()
        .cloned()
        .unwrap_or_else(|| "id".to_string());

    apply_derives(
        &mut st.attrs,
        vec![
            syn::parse_quote!(Debug),
            syn::parse_quote!(Clone),
            syn::parse_quote!(Default),
            syn::parse_quote!(serde::Serialize),
            syn::parse_quote!(serde::Deserialize),
        ],
    );
    if serde_value(&st.attrs, "default")?.is_none() {
        st.attrs.push(syn::parse_quote!(#[serde(default)]));
    }

    let ident = &st.ident;
    let type_name = cfg
        .name
        .map(|n| n.value())
        .unwrap_or_else(|| ident.to_string());
    let table = cfg.table.map(|t| {
        let t = t.value();
        quote! { const TABLE: &'static str = #t; }
    });
    let validate = cfg.validate.map(|path| {
        quote! {
            fn validate(
                &self,
                profile: ::smart_entity::validation::ValidateProfile,
            ) -> ::std::vec::Vec<::smart_entity::validation::ConstraintViolation> {
                #path(self, profile)
            }
        }
    });

    Ok(quote! {
        #st

        impl ::smart_entity::entity::EntityModel for #ident {
            const TYPE: &'static str = #type_name;
            #table
            const ID_FIELD: &'static str = #id_field;
            const FIELDS: &'static [&'static str] = &[#(#field_names),*];
            type Id = #id_type;

            fn id(&self) -> &Self::Id {
                &self.id
            }

            #validate
        }
    })
}

// -------- parsing --------

#[derive(Default)]
struct EntityModelConfig {
    name: Option<LitStr>,
    table: Option<LitStr>,
    id_ty: Option<Type>,
    validate: Option<syn::Path>,
}

impl Parse for EntityModelConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self::default();
        if input.is_empty() {
            return Ok(cfg);
        }

        let elems = Punctuated::<ConfigElem, Token![,]>::parse_terminated(input)?;
        for elem in elems {
            let (key, span, duplicated) = match elem {
                ConfigElem::Name(v) => ("name", v.span(), cfg.name.replace(v).is_some()),
                ConfigElem::Table(v) => ("table", v.span(), cfg.table.replace(v).is_some()),
                ConfigElem::Id(v) => {
                    let span = v.span();
                    ("id", span, cfg.id_ty.replace(*v).is_some())
                }
                ConfigElem::Validate(v) => {
                    let span = v.span();
                    ("validate", span, cfg.validate.replace(v).is_some())
                }
            };
            if duplicated {
                return Err(syn::Error::new(
                    span,
                    format!("duplicate key '{key}' in attribute"),
                ));
            }
        }
        Ok(cfg)
    }
}

enum ConfigElem {
    Name(LitStr),
    Table(LitStr),
    Id(Box<Type>),
    Validate(syn::Path),
}

impl Parse for ConfigElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        if key == "name" {
            Ok(ConfigElem::Name(input.parse()?))
        } else if key == "table" {
            Ok(ConfigElem::Table(input.parse()?))
        } else if key == "id" {
            Ok(ConfigElem::Id(Box::new(input.parse()?)))
        } else if key == "validate" {
            Ok(ConfigElem::Validate(input.parse()?))
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name', 'table', 'id' or 'validate'",
            ))
        }
    }
}
