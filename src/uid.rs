// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Stable identifiers that survive reallocation, cloning, and sorting.
//! [EventList](crate::eventlist::EventList) uses [EventId] in place of the
//! iterator-as-key pattern the original source relied on for note linking.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// An identifier type that can mint successive, distinct values. Not
/// guaranteed globally unique beyond "never repeats within one factory's
/// lifetime".
pub trait IsUid: Eq + Hash + Clone + Copy {
    /// Advances to the next value. Does not guarantee uniqueness across
    /// factories.
    fn increment(&mut self) -> &Self;
}

/// A generic, project-scoped unique identifier.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Uid(pub usize);
impl IsUid for Uid {
    fn increment(&mut self) -> &Self {
        self.0 += 1;
        self
    }
}

/// Identifies one [Event](crate::event::Event) within an
/// [EventList](crate::eventlist::EventList)'s arena, independent of the
/// event's current sort position.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct EventId(pub usize);
impl IsUid for EventId {
    fn increment(&mut self) -> &Self {
        self.0 += 1;
        self
    }
}

/// Generates successive unique ids of type `U`. Not threadsafe.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UidFactory<U: IsUid + Clone> {
    previous_uid: U,
}
impl<U: IsUid + Clone> UidFactory<U> {
    /// Mints the next unique id.
    pub fn mint_next(&mut self) -> U {
        *self.previous_uid.increment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_distinct_and_increasing() {
        let mut factory = UidFactory::<EventId>::default();
        let a = factory.mint_next();
        let b = factory.mint_next();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }
}
