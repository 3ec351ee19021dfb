//! Facade crate for `storemod`.
//! Re-exports the engine, the declaration macros and, behind features, the reference host
//! and the logger. Keep this crate thin: it composes the other crates.
//!
//! ## Usage
//! Depend on `storemod` and `storemod-core` (the macro expansions name `::storemod_core`),
//! then declare modules with [`store_module`]:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storemod::prelude::*;
//!
//! #[derive(Debug, Default)]
//! pub struct Auth { token: String }
//!
//! pub struct AuthModule { base: ModuleBase<Auth> }
//!
//! #[store_module(state = Auth)]
//! impl AuthModule {
//!     #[getter]
//!     pub fn token(&self) -> String {
//!         self.base.state().token.clone()
//!     }
//!
//!     #[mutation]
//!     pub fn set_token(&self, token: String) {
//!         self.base.state_mut().token = token;
//!     }
//! }
//!
//! let store = Arc::new(Store::default());
//! let auth = AuthModule { base: ModuleBase::new("auth", Auth::default(), store.clone()) }.install()?;
//! auth.set_token("x".to_owned())?;
//! assert_eq!(auth.token()?, "x");
//! ```

pub use storemod_core as engine;
pub use storemod_derive::{action, getter, mutation, store_module, storemod_error};
#[cfg(feature = "logger")]
pub use storemod_logger as logger;
#[cfg(feature = "store")]
pub use storemod_store as store;

pub mod prelude {
    pub use storemod_core::{
        Args, Category, CommitOptions, Host, MemorySink, ModuleBase, ModuleError, ModuleErrorExt,
        StoreModule, Tracer, Value,
    };
    pub use storemod_derive::{action, getter, mutation, store_module};
    #[cfg(feature = "store")]
    pub use storemod_store::{Store, StoreConfig};
}

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "store")]
    "store",
    #[cfg(feature = "logger")]
    "logger",
];

#[must_use]
pub fn is_enabled(feature: &str) -> bool {
    ENABLED.contains(&feature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_features() {
        assert_eq!(is_enabled("store"), cfg!(feature = "store"));
        assert!(!is_enabled("metrics"));
    }
}
