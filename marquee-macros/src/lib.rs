//! Procedural macros for marquee

use darling::{FromDeriveInput, FromField, FromVariant};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Category used for log filtering
    #[darling(default)]
    category: Option<String>,
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method that returns the variant name as a static string.
///
/// If any variant carries `#[action(category = "...")]`, also implements
/// `ActionCategory`; variants without one report `None`.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// enum AppAction {
///     #[action(category = "auth")]
///     LogIn { username: String },
///     #[action(category = "browse")]
///     SetFilter(Filter),
/// }
///
/// let action = AppAction::SetFilter(Filter::Popular);
/// assert_eq!(action.name(), "SetFilter");
/// assert_eq!(action.category(), Some("browse"));
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = variant_name.to_string();

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let mut expanded = quote! {
        impl ::marquee::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    if variants.iter().any(|v| v.category.is_some()) {
        let category_arms = variants.iter().map(|v| {
            let variant_name = &v.ident;
            let cat_expr = match &v.category {
                Some(c) => quote! { ::core::option::Option::Some(#c) },
                None => quote! { ::core::option::Option::None },
            };
            // Wildcard pattern covers unit, tuple and struct variants
            quote! { #name::#variant_name { .. } => #cat_expr }
        });

        expanded = quote! {
            #expanded

            impl ::marquee::ActionCategory for #name {
                fn category(&self) -> ::core::option::Option<&'static str> {
                    match self {
                        #(#category_arms,)*
                    }
                }
            }
        };
    }

    TokenStream::from(expanded)
}

/// Container-level options shared by #[derive(Slice)] and #[derive(SliceState)]
#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named), forward_attrs(serde))]
struct StructOpts {
    ident: syn::Ident,
    vis: syn::Visibility,
    generics: syn::Generics,
    attrs: Vec<syn::Attribute>,
    data: darling::ast::Data<(), StructField>,
}

#[derive(Debug, FromField)]
#[darling(forward_attrs(serde))]
struct StructField {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    attrs: Vec<syn::Attribute>,
}

fn parse_struct(input: &DeriveInput, derive: &str) -> Result<StructOpts, TokenStream> {
    let opts =
        StructOpts::from_derive_input(input).map_err(|e| TokenStream::from(e.write_errors()))?;
    if !opts.generics.params.is_empty() {
        let msg = format!("{derive} cannot be derived for generic structs");
        return Err(syn::Error::new_spanned(&opts.generics, msg)
            .to_compile_error()
            .into());
    }
    Ok(opts)
}

fn named_fields(opts: &StructOpts) -> Vec<(&syn::Ident, &StructField)> {
    match &opts.data {
        darling::ast::Data::Struct(fields) => fields
            .iter()
            .filter_map(|f| f.ident.as_ref().map(|ident| (ident, f)))
            .collect(),
        darling::ast::Data::Enum(_) => Vec::new(),
    }
}

/// Derive macro for the Slice trait
///
/// Generates `{Name}Patch`, a struct with one `Option` per field, and a
/// `Slice` impl whose `merge` copies every present field. Container and field
/// `#[serde(...)]` attributes are forwarded to the patch, so a persisted
/// slice deserializes into its patch with the same field names.
///
/// The patch derives `Serialize` and `Deserialize`, so the deriving crate
/// must depend on `serde`.
///
/// # Example
/// ```ignore
/// #[derive(Slice, Clone, Debug, Default, PartialEq, Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Browse {
///     home_filter: Option<Filter>,
/// }
///
/// // Generated:
/// // struct BrowsePatch { home_filter: Option<Option<Filter>> }
/// let mut browse = Browse::default();
/// browse.merge(BrowsePatch { home_filter: Some(Some(Filter::Popular)) });
/// ```
#[proc_macro_derive(Slice)]
pub fn derive_slice(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match parse_struct(&input, "Slice") {
        Ok(opts) => opts,
        Err(e) => return e,
    };

    let name = &opts.ident;
    let vis = &opts.vis;
    let container_attrs = &opts.attrs;
    let patch_name = format_ident!("{}Patch", name);
    let fields = named_fields(&opts);

    let patch_fields = fields.iter().map(|(ident, field)| {
        let ty = &field.ty;
        let attrs = &field.attrs;
        quote! {
            #(#attrs)*
            #[serde(skip_serializing_if = "::core::option::Option::is_none")]
            pub #ident: ::core::option::Option<#ty>
        }
    });

    let merge_stmts = fields.iter().map(|(ident, _)| {
        quote! {
            if let ::core::option::Option::Some(value) = patch.#ident {
                self.#ident = value;
                touched = true;
            }
        }
    });

    let doc = format!("Partial update for [`{name}`]. `None` fields are left unchanged.");

    let expanded = quote! {
        #[doc = #doc]
        #[derive(Clone, Debug, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #(#container_attrs)*
        #[serde(default)]
        #vis struct #patch_name {
            #(#patch_fields,)*
        }

        impl ::marquee::Slice for #name {
            type Patch = #patch_name;

            fn merge(&mut self, patch: #patch_name) -> bool {
                let mut touched = false;
                #(#merge_stmts)*
                touched
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for the SliceState trait
///
/// Every field must implement `Slice`. Generates `{Name}Patch` holding an
/// `Option<FieldPatch>` per slice, and a `SliceState` impl that merges each
/// present slice patch while leaving the others untouched. Slice names are
/// the field names.
///
/// # Example
/// ```ignore
/// #[derive(SliceState, Clone, Debug, Default, PartialEq, Serialize)]
/// struct AppState {
///     auth: Auth,
///     browse: Browse,
/// }
///
/// let mut state = AppState::default();
/// let touched = state.merge(AppStatePatch {
///     auth: Some(AuthPatch { username: Some("alice".into()) }),
///     browse: None,
/// });
/// assert_eq!(touched, vec!["auth"]);
/// ```
#[proc_macro_derive(SliceState)]
pub fn derive_slice_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let opts = match parse_struct(&input, "SliceState") {
        Ok(opts) => opts,
        Err(e) => return e,
    };

    let name = &opts.ident;
    let vis = &opts.vis;
    let container_attrs = &opts.attrs;
    let patch_name = format_ident!("{}Patch", name);
    let fields = named_fields(&opts);

    let slice_names: Vec<String> = fields.iter().map(|(ident, _)| ident.to_string()).collect();

    let patch_fields = fields.iter().map(|(ident, field)| {
        let ty = &field.ty;
        let attrs = &field.attrs;
        quote! {
            #(#attrs)*
            #[serde(skip_serializing_if = "::core::option::Option::is_none")]
            pub #ident: ::core::option::Option<<#ty as ::marquee::Slice>::Patch>
        }
    });

    let touched_stmts = fields.iter().zip(&slice_names).map(|((ident, _), slice)| {
        quote! {
            if patch.#ident.is_some() {
                names.push(#slice);
            }
        }
    });

    let merge_stmts = fields.iter().map(|(ident, _)| {
        quote! {
            if let ::core::option::Option::Some(slice) = patch.#ident {
                ::marquee::Slice::merge(&mut self.#ident, slice);
            }
        }
    });

    let retain_stmts = fields.iter().map(|(ident, _)| {
        quote! {
            if self.#ident != baseline.#ident {
                patch.#ident = ::core::option::Option::None;
            }
        }
    });

    let doc = format!("Partial update for [`{name}`]. `None` slices are left unchanged.");

    let expanded = quote! {
        #[doc = #doc]
        #[derive(Clone, Debug, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #(#container_attrs)*
        #[serde(default)]
        #vis struct #patch_name {
            #(#patch_fields,)*
        }

        impl ::marquee::SliceState for #name {
            type Patch = #patch_name;

            fn slice_names() -> &'static [&'static str] {
                &[#(#slice_names),*]
            }

            fn touched(patch: &#patch_name) -> ::std::vec::Vec<&'static str> {
                let mut names = ::std::vec::Vec::new();
                #(#touched_stmts)*
                names
            }

            fn merge(&mut self, patch: #patch_name) -> ::std::vec::Vec<&'static str> {
                let names = <Self as ::marquee::SliceState>::touched(&patch);
                #(#merge_stmts)*
                names
            }

            fn retain_pristine(&self, baseline: &Self, mut patch: #patch_name) -> #patch_name {
                #(#retain_stmts)*
                patch
            }
        }
    };

    TokenStream::from(expanded)
}
