use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro that describes the fields of a tax form section.
///
/// For each field, extracts:
/// - Field name (respects #[serde(rename = "...")])
/// - Value kind (decimal, date, flag, text, list, ...) from the field type
/// - Optional (true if Option<T>)
/// - Description (from doc comments)
///
/// Generates `field_schema() -> &'static [FormField]` and
/// `section_name() -> &'static str` methods. `FormField` must be in scope
/// where the derive is used.
#[proc_macro_derive(FieldSchema, attributes(serde))]
pub fn derive_field_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let section = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("FieldSchema only supports structs with named fields"),
        },
        _ => panic!("FieldSchema only supports structs"),
    };

    let field_info: Vec<_> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident.as_ref().unwrap().to_string();
            let json_name = get_serde_rename(&field.attrs).unwrap_or(field_name);
            let optional = is_option_type(&field.ty);
            let kind = value_kind(&field.ty);
            let doc = get_doc_comment(&field.attrs);

            (json_name, kind, optional, doc)
        })
        .collect();

    let field_entries = field_info.iter().map(|(name, kind, optional, desc)| {
        quote! {
            FormField {
                name: #name,
                kind: #kind,
                optional: #optional,
                description: #desc,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn section_name() -> &'static str {
                #section
            }

            pub fn field_schema() -> &'static [FormField] {
                static SCHEMA: &[FormField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

fn get_serde_rename(attrs: &[syn::Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        if let Meta::List(meta_list) = &attr.meta {
            let tokens = meta_list.tokens.to_string();
            // Simple parsing: look for rename = "..."
            if let Some(start) = tokens.find("rename") {
                let rest = &tokens[start..];
                if let Some(eq_pos) = rest.find('=') {
                    let after_eq = rest[eq_pos + 1..].trim();
                    if let Some(stripped) = after_eq.strip_prefix('"') {
                        if let Some(end_quote) = stripped.find('"') {
                            return Some(stripped[..end_quote].to_string());
                        }
                    }
                }
            }
        }
    }
    None
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    if let Type::Path(type_path) = ty {
        return type_path.path.segments.last();
    }
    None
}

fn is_option_type(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == "Option")
}

/// Human readable kind of value a field holds, unwrapping `Option<T>`.
fn value_kind(ty: &Type) -> String {
    let Some(segment) = last_segment(ty) else {
        return match ty {
            Type::Array(_) => "flags".to_string(),
            _ => "value".to_string(),
        };
    };

    if segment.ident == "Option" || segment.ident == "Vec" {
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                let inner_kind = value_kind(inner);
                return if segment.ident == "Vec" {
                    format!("list of {inner_kind}")
                } else {
                    inner_kind
                };
            }
        }
    }

    match segment.ident.to_string().as_str() {
        "Decimal" => "decimal".to_string(),
        "NaiveDate" => "date".to_string(),
        "bool" => "flag".to_string(),
        "String" => "text".to_string(),
        "u8" | "u16" | "u32" | "i32" => "integer".to_string(),
        other => other.to_string(),
    }
}
