//! Reference host for `storemod` modules.
//!
//! [`Store`] implements [`storemod_core::Host`] in memory: it keeps the registered module
//! descriptors, routes `commit`, `dispatch` and read calls to their bound entries and notifies
//! subscribers. [`load_config`] reads a [`StoreConfig`] from a file and `STOREMOD__` variables.
//!
//! ```rust
//! use std::sync::Arc;
//! use storemod_store::{Store, StoreConfig};
//!
//! let store = Arc::new(Store::new(StoreConfig { strict: false, ..StoreConfig::default() }));
//! assert!(store.module_names().is_empty());
//! ```

mod config;
mod error;
mod store;

pub use crate::config::{ENV_PREFIX, StoreConfig, load_config};
pub use crate::error::{StoreError, StoreErrorExt};
pub use crate::store::{ActionRecord, MutationRecord, Store, SubscriptionId};
