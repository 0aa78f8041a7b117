//! Activity identifiers backed by a per-graph string interner.
//!
//! Every activity name seen while building a [`Dfg`](crate::dfg::Dfg) is
//! registered exactly once in an [`ActivityRegistry`], which hands out dense
//! [`ActivityId`]s. Edges and start/end counts refer to activities by id only,
//! so the layout engine never deals with string keys.

use std::{cmp::Ordering, fmt};

use string_interner::{DefaultStringInterner, DefaultSymbol, Symbol};

/// Handle to an activity registered in an [`ActivityRegistry`].
///
/// Ids are ordered by registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityId(DefaultSymbol);

impl ActivityId {
    /// Position of this activity in registration order.
    pub fn index(self) -> usize {
        self.0.to_usize()
    }
}

impl PartialOrd for ActivityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActivityId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// Arena of activity names.
///
/// # Examples
///
/// ```
/// use timeflow_core::identifier::ActivityRegistry;
///
/// let mut registry = ActivityRegistry::new();
/// let a = registry.register("A");
/// let b = registry.register("B");
///
/// assert_eq!(registry.register("A"), a);
/// assert_eq!(registry.name(b), Some("B"));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActivityRegistry {
    interner: DefaultStringInterner,
    order: Vec<ActivityId>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, returning its existing id when already present.
    pub fn register(&mut self, name: &str) -> ActivityId {
        if let Some(symbol) = self.interner.get(name) {
            return ActivityId(symbol);
        }
        let id = ActivityId(self.interner.get_or_intern(name));
        self.order.push(id);
        id
    }

    /// Looks up the id of an already registered name.
    pub fn lookup(&self, name: &str) -> Option<ActivityId> {
        self.interner.get(name).map(ActivityId)
    }

    /// Resolves an id back to its name.
    ///
    /// Returns `None` for ids that were not issued by this registry.
    pub fn name(&self, id: ActivityId) -> Option<&str> {
        self.interner.resolve(id.0)
    }

    /// Returns true when `id` was issued by this registry.
    pub fn contains(&self, id: ActivityId) -> bool {
        self.name(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates over `(id, name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActivityId, &str)> {
        self.order.iter().filter_map(|id| Some((*id, self.name(*id)?)))
    }
}
