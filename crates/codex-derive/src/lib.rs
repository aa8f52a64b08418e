//! Derive macro for codex record codecs.
//!
//! `#[derive(Record)]` on a struct with named fields generates a JSON object
//! codec for it and implements `codex::Reflect` so the registry's generated
//! resolver picks that codec up.
//!
//! # Example
//!
//! ```ignore
//! use codex::Record;
//!
//! #[derive(Record)]
//! #[record(rename_all = "PascalCase")]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let bytes = codex::to_vec(&User { id: 42, name: "ann".into() }).unwrap();
//! assert_eq!(bytes, br#"{"Id":42,"Name":"ann"}"#);
//! ```

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derive macro for record codecs.
///
/// Fields are written in declaration order. On decode, members may arrive in
/// any order, unknown members are skipped and a missing member is an error
/// unless the field is marked `default`.
///
/// # Attributes
///
/// - `#[record(rename_all = "PascalCase" | "camelCase" | "snake_case")]` on the struct
/// - `#[record(rename = "name")]` on a field
/// - `#[record(default)]` on a field: use `Default::default()` when missing
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

// ============================================================================
// Attributes
// ============================================================================

#[derive(Clone, Copy)]
enum RenameAll {
    Pascal,
    Camel,
    Snake,
}

impl RenameAll {
    fn apply(self, name: &str) -> String {
        match self {
            RenameAll::Pascal => name.to_upper_camel_case(),
            RenameAll::Camel => name.to_lower_camel_case(),
            RenameAll::Snake => name.to_snake_case(),
        }
    }
}

fn container_attrs(attrs: &[Attribute]) -> syn::Result<Option<RenameAll>> {
    let mut rename_all = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                rename_all = Some(match value.value().as_str() {
                    "PascalCase" => RenameAll::Pascal,
                    "camelCase" => RenameAll::Camel,
                    "snake_case" => RenameAll::Snake,
                    other => {
                        return Err(meta.error(format!(
                            "unsupported rename_all convention `{other}`"
                        )))
                    }
                });
                Ok(())
            } else {
                Err(meta.error("expected `rename_all`"))
            }
        })?;
    }
    Ok(rename_all)
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    default: bool,
}

fn field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                out.rename = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("default") {
                out.default = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename` or `default`"))
            }
        })?;
    }
    Ok(out)
}

// ============================================================================
// Expansion
// ============================================================================

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Record can only be derived for structs",
            ))
        }
    };

    let rename_all = container_attrs(&input.attrs)?;
    let codec = format_ident!("__{}RecordCodec", name);

    let mut idents = Vec::new();
    let mut types = Vec::new();
    let mut wire_names = Vec::new();
    let mut defaults = Vec::new();
    for field in fields {
        let attrs = field_attrs(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let plain = ident.unraw().to_string();
        let wire = attrs
            .rename
            .unwrap_or_else(|| rename_all.map_or_else(|| plain.clone(), |r| r.apply(&plain)));
        if wire_names.contains(&wire) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate member name `{wire}`"),
            ));
        }
        idents.push(ident);
        types.push(&field.ty);
        wire_names.push(wire);
        defaults.push(attrs.default);
    }

    let slots: Vec<_> = (0..idents.len()).collect();
    let locals: Vec<_> = (0..idents.len()).map(|i| format_ident!("__field{}", i)).collect();

    let encode_fields = idents.iter().zip(&types).zip(&wire_names).enumerate().map(
        |(i, ((ident, ty), wire))| {
            let separator = (i != 0).then(|| quote! { writer.write_value_separator(); });
            quote! {
                #separator
                writer.write_property_name(#wire);
                registry.codec::<#ty>()?.encode(&value.#ident, writer, registry)?;
            }
        },
    );

    let finish_fields = idents.iter().zip(&locals).zip(&wire_names).zip(&defaults).map(
        |(((ident, local), wire), default)| {
            if *default {
                quote! { #ident: #local.unwrap_or_default() }
            } else {
                quote! {
                    #ident: #local.ok_or(::codex::CodecError::MissingField {
                        type_name: __TYPE_NAME,
                        field: #wire,
                    })?
                }
            }
        },
    );

    Ok(quote! {
        const _: () = {
            const __TYPE_NAME: &str = ::core::stringify!(#name);

            #[doc(hidden)]
            pub struct #codec {
                matcher: ::codex::FieldMatcher,
            }

            impl ::core::default::Default for #codec {
                fn default() -> Self {
                    Self {
                        matcher: ::codex::FieldMatcher::new::<&str>(&[#(#wire_names),*]),
                    }
                }
            }

            #[allow(unused_variables)]
            impl ::codex::Codec<#name> for #codec {
                fn encode(
                    &self,
                    value: &#name,
                    writer: &mut ::codex::JsonWriter,
                    registry: &::codex::Registry,
                ) -> ::core::result::Result<(), ::codex::CodecError> {
                    writer.write_begin_object();
                    #(#encode_fields)*
                    writer.write_end_object();
                    ::core::result::Result::Ok(())
                }

                fn decode(
                    &self,
                    reader: &mut ::codex::JsonReader<'_>,
                    registry: &::codex::Registry,
                ) -> ::core::result::Result<#name, ::codex::CodecError> {
                    if reader.read_is_null()? {
                        return ::core::result::Result::Err(::codex::CodecError::UnexpectedNull {
                            type_name: __TYPE_NAME,
                        });
                    }
                    #(
                        let mut #locals: ::core::option::Option<#types> =
                            ::core::option::Option::None;
                    )*
                    reader.read_is_begin_object_with_verify()?;
                    let mut count = 0usize;
                    while !reader.read_is_end_object_with_skip_value_separator(&mut count)? {
                        let name = reader.read_property_name_raw()?;
                        match self.matcher.try_get(&name) {
                            #(::core::option::Option::Some(#slots) => {
                                #locals = ::core::option::Option::Some(
                                    registry.codec::<#types>()?.decode(reader, registry)?,
                                );
                            })*
                            _ => reader.read_next_block()?,
                        }
                    }
                    ::core::result::Result::Ok(#name {
                        #(#finish_fields),*
                    })
                }
            }

            impl ::codex::Reflect for #name {
                fn descriptor() -> ::codex::TypeDescriptor {
                    ::codex::TypeDescriptor::record::<Self>(::codex::fixed::<#name, #codec>)
                }
            }
        };
    })
}
