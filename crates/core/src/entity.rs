//! Keyed records.
//!
//! Customers and ledger entries are stored as ordered lists inside one
//! document; the key is what lookups and replacement match on.

pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Key that is unique within the owning collection.
    fn id(&self) -> &Self::Id;
}

/// Position of the entity with `id` inside an ordered collection.
pub fn position_of<E: Entity>(records: &[E], id: &E::Id) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}
