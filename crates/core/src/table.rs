//! Operation tables, the inheritance merger and the rebinder.

use crate::base::StoreModule;
use crate::category::Category;
use crate::error::ModuleError;
use crate::wrap::{ActionEntry, Entry, GetterEntry, MutationEntry};
use fxhash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Operation name to function.
pub type Registry<F> = FxHashMap<&'static str, F>;

/// The operations one module type declares itself, per category.
///
/// A table never contains inherited entries; inheritance is resolved by [`Lineage`].
#[derive(Debug)]
pub struct OperationTable<M> {
    owner: &'static str,
    getters: Registry<GetterEntry<M>>,
    mutations: Registry<MutationEntry<M>>,
    actions: Registry<ActionEntry<M>>,
}

impl<M> Clone for OperationTable<M> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner,
            getters: self.getters.clone(),
            mutations: self.mutations.clone(),
            actions: self.actions.clone(),
        }
    }
}

impl<M: StoreModule> OperationTable<M> {
    /// Creates an empty table for the module type named `owner`.
    #[must_use]
    pub fn new(owner: &'static str) -> Self {
        Self {
            owner,
            getters: Registry::default(),
            mutations: Registry::default(),
            actions: Registry::default(),
        }
    }

    /// Name of the declaring module type.
    #[must_use]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }

    /// Declares a getter.
    ///
    /// # Errors
    /// Returns [`ModuleError::Configuration`] if a getter named `name` is already declared;
    /// the existing entry is kept.
    pub fn add_getter(&mut self, name: &'static str, entry: GetterEntry<M>) -> Result<(), ModuleError> {
        insert_unique(&mut self.getters, self.owner, Category::Getter, name, entry)
    }

    /// Declares a mutation.
    ///
    /// # Errors
    /// Returns [`ModuleError::Configuration`] if a mutation named `name` is already declared;
    /// the existing entry is kept.
    pub fn add_mutation(
        &mut self,
        name: &'static str,
        entry: MutationEntry<M>,
    ) -> Result<(), ModuleError> {
        insert_unique(&mut self.mutations, self.owner, Category::Mutation, name, entry)
    }

    /// Declares an action.
    ///
    /// # Errors
    /// Returns [`ModuleError::Configuration`] if an action named `name` is already declared;
    /// the existing entry is kept.
    pub fn add_action(&mut self, name: &'static str, entry: ActionEntry<M>) -> Result<(), ModuleError> {
        insert_unique(&mut self.actions, self.owner, Category::Action, name, entry)
    }

    #[must_use]
    pub const fn getters(&self) -> &Registry<GetterEntry<M>> {
        &self.getters
    }

    #[must_use]
    pub const fn mutations(&self) -> &Registry<MutationEntry<M>> {
        &self.mutations
    }

    #[must_use]
    pub const fn actions(&self) -> &Registry<ActionEntry<M>> {
        &self.actions
    }

    /// Sorted operation names of one category.
    #[must_use]
    pub fn names(&self, category: Category) -> Vec<&'static str> {
        let mut names: Vec<_> = match category {
            Category::Getter => self.getters.keys().copied().collect(),
            Category::Mutation => self.mutations.keys().copied().collect(),
            Category::Action => self.actions.keys().copied().collect(),
        };
        names.sort_unstable();
        names
    }

    /// Number of declared operations over all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.getters.len() + self.mutations.len() + self.actions.len()
    }

    /// Re-targets every entry at a module `C` holding this module as `Arc<M>`.
    #[must_use]
    pub fn lift<C: StoreModule>(&self, project: fn(&C) -> &Arc<M>) -> OperationTable<C> {
        OperationTable {
            owner: self.owner,
            getters: self.getters.iter().map(|(k, e)| (*k, e.lift(project))).collect(),
            mutations: self.mutations.iter().map(|(k, e)| (*k, e.lift(project))).collect(),
            actions: self.actions.iter().map(|(k, e)| (*k, e.lift(project))).collect(),
        }
    }
}

fn insert_unique<F>(
    registry: &mut Registry<F>,
    owner: &'static str,
    category: Category,
    name: &'static str,
    entry: F,
) -> Result<(), ModuleError> {
    if registry.contains_key(name) {
        return Err(ModuleError::Configuration {
            message: format!("`{name}` is declared twice as a {} on `{owner}`", category.noun()).into(),
            context: None,
        });
    }
    registry.insert(name, entry);
    Ok(())
}

/// The ownership chain of a module type: its own table first, then its ancestors' tables,
/// all lifted onto the most-derived type.
#[derive(Debug)]
pub struct Lineage<M> {
    tables: VecDeque<OperationTable<M>>,
}

impl<M: StoreModule> Lineage<M> {
    /// A chain with a single, root table.
    #[must_use]
    pub fn root(table: OperationTable<M>) -> Self {
        Self { tables: VecDeque::from([table]) }
    }

    /// Puts `table` in front of the chain, making it the most-derived one.
    #[must_use]
    pub fn derive(mut self, table: OperationTable<M>) -> Self {
        self.tables.push_front(table);
        self
    }

    /// Re-targets the whole chain at a module `C` holding the current most-derived type.
    #[must_use]
    pub fn lift<C: StoreModule>(&self, project: fn(&C) -> &Arc<M>) -> Lineage<C> {
        Lineage { tables: self.tables.iter().map(|t| t.lift(project)).collect() }
    }

    /// Tables from most- to least-derived.
    pub fn tables(&self) -> impl Iterator<Item = &OperationTable<M>> {
        self.tables.iter()
    }

    /// Owners from most- to least-derived.
    #[must_use]
    pub fn owners(&self) -> Vec<&'static str> {
        self.tables.iter().map(OperationTable::owner).collect()
    }

    #[must_use]
    pub fn getters(&self) -> Registry<GetterEntry<M>> {
        merge(self.tables.iter().map(OperationTable::getters))
    }

    #[must_use]
    pub fn mutations(&self) -> Registry<MutationEntry<M>> {
        merge(self.tables.iter().map(OperationTable::mutations))
    }

    #[must_use]
    pub fn actions(&self) -> Registry<ActionEntry<M>> {
        merge(self.tables.iter().map(OperationTable::actions))
    }
}

/// Folds registries ordered from most- to least-derived into one.
///
/// The first registry that declares a name wins; later registries only contribute names
/// not seen yet.
pub fn merge<'a, F, I>(chain: I) -> Registry<F>
where
    F: Clone + 'a,
    I: IntoIterator<Item = &'a Registry<F>>,
{
    chain.into_iter().fold(Registry::default(), |mut merged, own| {
        for (name, entry) in own {
            merged.entry(*name).or_insert_with(|| entry.clone());
        }
        merged
    })
}

/// Binds every entry of `merged` to `receiver`, keeping the keys.
pub fn rebind<M, E>(merged: &Registry<E>, receiver: &Arc<M>) -> Registry<E::Bound>
where
    E: Entry<M>,
{
    merged.iter().map(|(name, entry)| (*name, entry.bind(Arc::clone(receiver)))).collect()
}
