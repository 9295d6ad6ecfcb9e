//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// Entity marker + minimal interface.
///
/// Stores rely on `created_at` for the default listing order (newest first).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// When the entity was first persisted.
    fn created_at(&self) -> DateTime<Utc>;

    /// When the entity was last modified.
    fn updated_at(&self) -> DateTime<Utc>;
}

/// Orders entities newest first, breaking timestamp ties by id (descending).
pub fn newest_first<E: Entity>(a: &E, b: &E) -> core::cmp::Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}
