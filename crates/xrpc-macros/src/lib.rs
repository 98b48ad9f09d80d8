//! # xrpc-macros: `#[derive(Shape)]`
//!
//! Generates `xrpc_core::Shape` for structs with named fields. Aliases follow
//! the serde attributes on the type so descriptors always match the wire:
//!
//! - `#[serde(rename = "...")]` on a field sets its alias.
//! - `#[serde(rename_all = "...")]` on the struct transforms every alias that
//!   is not renamed explicitly.
//! - `#[serde(skip)]` / `#[serde(skip_serializing)]` drop the field.
//!
//! Generated code refers to `::xrpc_core`, so the deriving crate must depend
//! on `xrpc-core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, LitStr, Token};

#[proc_macro_derive(Shape, attributes(serde))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let container = SerdeAttrs::parse(&input.attrs)?;

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Shape can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Shape can only be derived for structs with named fields",
            ))
        }
    };

    let mut members = Vec::new();
    for field in &named.named {
        let attrs = SerdeAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let name = ident.unraw().to_string();
        let alias = match (&attrs.rename, &container.rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => apply_rename_rule(rule, &name)
                .ok_or_else(|| syn::Error::new_spanned(ident, unknown_rule(rule)))?,
            (None, None) => name.clone(),
        };
        let ty = &field.ty;
        members.push(quote! {
            .field(::xrpc_core::FieldDescriptor::of::<#ty>(#name, #alias))
        });
    }

    let type_params: Vec<_> = input.generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = input.generics.make_where_clause();
    for param in type_params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::xrpc_core::Shape));
    }

    let ident = &input.ident;
    let type_name = ident.unraw().to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::xrpc_core::Shape for #ident #ty_generics #where_clause {
            fn type_name() -> ::std::string::String {
                ::std::string::String::from(#type_name)
            }

            fn descriptor() -> ::xrpc_core::TypeDescriptor {
                ::xrpc_core::TypeDescriptor::record(#type_name)
                    #(#members)*
            }
        }
    })
}

/// The subset of serde attributes that affects descriptors.
#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    rename_all: Option<String>,
    skip: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                } else if meta.path.is_ident("rename_all") && meta.input.peek(Token![=]) {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename_all = Some(lit.value());
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    out.skip = true;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Consume `= value` or `(...)` after an attribute we do not interpret.
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let _: proc_macro2::TokenTree = meta.input.parse()?;
    }
    Ok(())
}

fn unknown_rule(rule: &str) -> String {
    format!("unsupported serde rename_all rule: {rule}")
}

/// Apply a serde `rename_all` rule to a snake_case field name.
fn apply_rename_rule(rule: &str, field: &str) -> Option<String> {
    let pascal = || {
        field
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<String>()
    };

    let renamed = match rule {
        "lowercase" | "snake_case" => field.to_string(),
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "PascalCase" => pascal(),
        "camelCase" => {
            let p = pascal();
            let mut chars = p.chars();
            match chars.next() {
                Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        }
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.to_ascii_uppercase().replace('_', "-"),
        _ => return None,
    };
    Some(renamed)
}
