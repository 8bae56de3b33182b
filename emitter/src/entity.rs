//! Entity declarations.
//!
//! A non-virtual entity becomes a struct with one public field per property,
//! a `new()` that leaves every sequence field empty but present, a
//! `Default` delegating to it, a `Display` rendering and the `Node` capability.
//! A virtual entity becomes a marker trait over its virtual supers; concrete
//! entities opt into the transitive closure of their virtual supers with
//! empty impls and never inherit fields.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::LitStr;

use crate::model::{EntityId, Model, Property, ValueType};
use crate::naming::{field_ident, type_ident};

/// Declarations for entity `id`. The skip entity produces nothing.
pub fn entity_declaration(model: &Model, id: EntityId, runtime: &syn::Path, doc: Option<&str>) -> TokenStream {
    let entity = model.entity(id);
    if entity.is_skip() {
        return TokenStream::new();
    }
    let doc = doc.map(|text| quote! { #[doc = #text] });
    if entity.is_virtual {
        virtual_declaration(model, id, runtime, doc)
    } else {
        concrete_declaration(model, id, runtime, doc)
    }
}

fn virtual_declaration(model: &Model, id: EntityId, runtime: &syn::Path, doc: Option<TokenStream>) -> TokenStream {
    let entity = model.entity(id);
    let name = type_ident(&entity.name);
    let supers: Vec<_> = entity
        .supers
        .iter()
        .filter(|s| model.entity(**s).is_virtual)
        .map(|s| type_ident(&model.entity(*s).name))
        .collect();
    if supers.is_empty() {
        quote! {
            #doc
            pub trait #name: #runtime::Node {}
        }
    } else {
        quote! {
            #doc
            pub trait #name: #(#supers)+* {}
        }
    }
}

fn concrete_declaration(model: &Model, id: EntityId, runtime: &syn::Path, doc: Option<TokenStream>) -> TokenStream {
    let entity = model.entity(id);
    let name = type_ident(&entity.name);

    let fields: Vec<_> = entity
        .properties
        .iter()
        .map(|p| {
            let field = field_ident(&p.name);
            let ty = field_type(model, p);
            quote! { pub #field: #ty }
        })
        .collect();
    let inits: Vec<_> = entity
        .properties
        .iter()
        .map(|p| {
            let field = field_ident(&p.name);
            let init = field_init(model, p);
            quote! { #field: #init }
        })
        .collect();
    let display = display_impl(model, id, runtime);
    let capabilities = model.virtual_supers_closure(id).into_iter().map(|s| {
        let capability = type_ident(&model.entity(s).name);
        quote! { impl #capability for #name {} }
    });

    quote! {
        #doc
        #[derive(Debug)]
        pub struct #name {
            #(#fields),*
        }

        impl #name {
            pub fn new() -> Self {
                #name {
                    #(#inits),*
                }
            }
        }

        impl std::default::Default for #name {
            fn default() -> Self {
                Self::new()
            }
        }

        #display

        impl #runtime::Node for #name {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        #(#capabilities)*
    }
}

/// Element type: what one value of `value` is stored as.
fn element_type(model: &Model, value: ValueType) -> TokenStream {
    match value {
        ValueType::Text => quote! { std::string::String },
        ValueType::Boolean => quote! { bool },
        ValueType::Entity(id) if model.is_extractor(id) => quote! { std::string::String },
        ValueType::Entity(id) => {
            let target = model.entity(id);
            let name = type_ident(&target.name);
            if target.is_virtual {
                quote! { std::boxed::Box<dyn #name> }
            } else {
                quote! { #name }
            }
        }
    }
}

fn field_type(model: &Model, property: &Property) -> TokenStream {
    let element = element_type(model, property.value);
    if property.is_sequence() {
        return quote! { std::vec::Vec<#element> };
    }
    match property.value {
        ValueType::Entity(id) if model.is_extractor(id) => element,
        ValueType::Entity(id) if model.entity(id).is_virtual => {
            quote! { std::option::Option<#element> }
        }
        ValueType::Entity(_) => quote! { std::option::Option<std::boxed::Box<#element>> },
        ValueType::Text | ValueType::Boolean => element,
    }
}

fn field_init(model: &Model, property: &Property) -> TokenStream {
    if property.is_sequence() {
        return quote! { std::vec::Vec::new() };
    }
    match property.value {
        ValueType::Text => quote! { std::string::String::new() },
        ValueType::Entity(id) if model.is_extractor(id) => quote! { std::string::String::new() },
        ValueType::Boolean => quote! { false },
        ValueType::Entity(_) => quote! { std::option::Option::None },
    }
}

/// `Name { a = …,\nb = … }`: sequences as `[x,y]`, text quoted, flags bare,
/// entities rendered nested or as `null` when absent.
fn display_impl(model: &Model, id: EntityId, runtime: &syn::Path) -> TokenStream {
    let entity = model.entity(id);
    let name = type_ident(&entity.name);

    let mut parts = Vec::with_capacity(entity.properties.len());
    let mut args = Vec::with_capacity(entity.properties.len());
    for property in &entity.properties {
        let field = field_ident(&property.name);
        let label = field.to_string();
        let label = label.trim_start_matches("r#");
        if property.is_sequence() {
            parts.push(format!("{} = [{{}}]", label));
            args.push(quote! { #runtime::DisplaySlice(&self.#field) });
            continue;
        }
        parts.push(format!("{} = {{}}", label));
        args.push(match property.value {
            ValueType::Boolean => quote! { self.#field },
            ValueType::Text => quote! { #runtime::DisplayText(&self.#field) },
            ValueType::Entity(t) if model.is_extractor(t) => quote! { self.#field },
            ValueType::Entity(_) => quote! { #runtime::DisplayOption(&self.#field) },
        });
    }

    let opening = if parts.len() > 1 { "{{ \n" } else { "{{ " };
    let template = if parts.is_empty() {
        format!("{} {{{{ }}}}", name)
    } else {
        format!("{} {}{} }}}}", name, opening, parts.join(",\n"))
    };
    let template = LitStr::new(&template, Span::call_site());

    quote! {
        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, #template #(, #args)*)
            }
        }
    }
}
