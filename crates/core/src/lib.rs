//! Core engine of `storemod`: turns marked methods of a module type into a registered,
//! inheritance-aware store module.
//!
//! * [`OperationTable`] collects the getters, mutations and actions a type declares itself.
//! * [`Lineage`] chains those tables from the most-derived type to the root; [`merge`] folds
//!   them so derived definitions win.
//! * [`rebind`] fixes the module instance as receiver of every entry.
//! * [`install`] assembles the [`ModuleDescriptor`] and hands it to the [`Host`] once.
//!
//! The tables are normally generated by `#[store_module]` from the `storemod-derive` crate.

mod base;
mod category;
mod error;
mod host;
mod table;
mod trace;
mod value;
mod wrap;

pub use base::{ModuleBase, StateReadGuard, StateWriteGuard, StoreModule, install};
pub use category::Category;
pub use error::{ModuleError, ModuleErrorExt};
pub use host::{
    ActionContext, BoundAction, BoundGetter, BoundMutation, GetterValue, Host, ModuleDescriptor,
    ReadFn, SharedState,
};
pub use table::{Lineage, OperationTable, Registry, merge, rebind};
pub use trace::{MemorySink, TRACE_TARGET, TraceEvent, TraceRecord, TraceSink, Tracer, TracingSink};
pub use value::{ArgReader, Args, CommitOptions, Value, decode, describe, encode};
pub use wrap::{ActionEntry, Entry, GetterEntry, MutationEntry};
