#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for `storemod`.
//! This crate turns per-method markers into the declarative operation tables the
//! `storemod-core` engine consumes, and provides the error-enum attribute used
//! across the workspace.
//!
//! ## Usage
//! Depend on `storemod` (the facade) or on `storemod-core` together with this crate:
//! ```toml
//! [dependencies]
//! storemod-core = { path = "../crates/core" }
//! storemod-derive = { path = "../infra/derive" }
//! ```
//!
//! The expansions refer to `::storemod_core`, so that crate must be a direct dependency
//! of the consumer. Examples below are `ignore`d; the facade crate's tests compile them.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

/// Attribute macro that assembles a store module from per-method markers.
///
/// Place it on an inherent `impl` block. Methods inside the block may carry one marker:
///
/// * `#[getter]` - a read operation. Without parameters it is accessor-style (the host's
///   read surface holds the value); with parameters it is callable-style (the host hands
///   back a function that receives the forwarded arguments).
/// * `#[mutation]` / `#[mutation(silent)]` - a synchronous state transition routed through
///   the host's `commit`. `silent` is passed along as fixed commit options.
/// * `#[action]` - a dispatched operation routed through the host's `dispatch`.
///
/// Every marker accepts `name = "..."` to register under a different operation name.
///
/// # Expansion
///
/// * The original body is kept as a hidden private method.
/// * A redirect with the original name and visibility replaces it. It encodes the arguments,
///   calls the host with the key `<module>/<operation>` and returns
///   `Result<T, ModuleError>`, where `T` is the body's return type (or its `Ok` type).
/// * `StoreModule` is implemented, with `operations()` returning the type's own table.
///
/// # Arguments
///
/// * `state = Type` - the state type of a root module.
/// * `base = field` - the `ModuleBase` field of a root module (default `base`).
/// * `extends = Parent` - declares a derived module that shares `Parent`'s base and state.
/// * `via = field` - the `Arc<Parent>` field of a derived module (default `parent`).
///
/// # Errors
///
/// Emits a compile-time error for duplicate operation names within one category, markers on
/// methods without `&self`, generic or `async` marked methods, borrowed parameter or return
/// types, and non-identifier parameter patterns.
///
/// # Example
///
/// ```rust,ignore
/// use storemod::prelude::*;
///
/// #[derive(Debug, Default)]
/// pub struct Session { token: String }
///
/// pub struct SessionModule { base: ModuleBase<Session> }
///
/// #[store_module(state = Session)]
/// impl SessionModule {
///     #[getter]
///     pub fn token(&self) -> String {
///         self.base.state().token.clone()
///     }
///
///     #[mutation]
///     pub fn set_token(&self, token: String) {
///         self.base.state_mut().token = token;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn store_module(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemImpl);
    macros::module::expand_module(attr.into(), input).into()
}

/// Marks a read operation. Only valid inside a `#[store_module]` impl block.
#[proc_macro_attribute]
pub fn getter(_attr: TokenStream, item: TokenStream) -> TokenStream {
    misplaced_marker("getter", item)
}

/// Marks a synchronous state transition. Only valid inside a `#[store_module]` impl block.
#[proc_macro_attribute]
pub fn mutation(_attr: TokenStream, item: TokenStream) -> TokenStream {
    misplaced_marker("mutation", item)
}

/// Marks a dispatched operation. Only valid inside a `#[store_module]` impl block.
#[proc_macro_attribute]
pub fn action(_attr: TokenStream, item: TokenStream) -> TokenStream {
    misplaced_marker("action", item)
}

fn misplaced_marker(marker: &str, item: TokenStream) -> TokenStream {
    let item = proc_macro2::TokenStream::from(item);
    let message = format!("`#[{marker}]` is only valid on a method inside a `#[store_module]` impl block");
    quote::quote! {
        ::core::compile_error!(#message);
        #item
    }
    .into()
}

/// A high-level attribute macro for defining error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` when missing.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to results of every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants holding a source,
///   so `?` works on upstream errors.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal` variant exists.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field must be typed `Option<Cow<'static, str>>`.
/// 3. A variant with a source (`source` field, `#[source]` or `#[from]`) must also carry a
///    `context` field.
///
/// A private `format_context` helper is emitted next to the enum for use in messages.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[storemod_derive::storemod_error]
/// pub enum LoadError {
///     #[error("Decode error{}: {source}", format_context(.context))]
///     Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn storemod_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
