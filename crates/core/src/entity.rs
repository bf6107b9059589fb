//! Things the ledger tracks by id.

/// A record whose identity outlives changes to its fields.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// First entity in `entities` carrying `id`.
pub fn find_by_id<E: Entity>(entities: &[E], id: E::Id) -> Option<&E> {
    entities.iter().find(|e| e.id() == id)
}

/// Index of the entity carrying `id`.
pub fn position_of<E: Entity>(entities: &[E], id: E::Id) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}
