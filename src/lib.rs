// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

#![warn(missing_docs)]

//! A pattern/trigger/set engine for a live-performance MIDI sequencer: a
//! library of short looping MIDI patterns, a song arranger that schedules
//! patterns via timed triggers, a screenset layer that groups patterns into
//! mutable "pages", and the editing primitives (quantize, jitter, randomize,
//! scale-fit, split, copy/paste with undo/redo) that operate on them.

/// Staged, UI-facing editing of one pattern's event list.
pub mod editable_event;
/// A single MIDI event and its MIDI-byte encoding.
pub mod event;
/// A pattern's sortable, linkable collection of events.
pub mod eventlist;
/// The shared error alias for fallible constructors and parsers.
pub mod error;
/// MIDI-byte newtypes shared across the crate (`Channel`, `Buss`, `Pulse`, ...).
pub mod midibytes;
/// Mute groups: named bit-masks over a screenset's slots.
pub mod mutegroups;
/// A map of MIDI buss configuration, independent of any I/O driver.
pub mod ports;
/// Provides a random-number generator for jitter/randomize operations.
pub mod rng;
/// Scale, chord, and key-signature tables and lookups.
pub mod scales;
/// A page of patterns identified by set number.
pub mod screenset;
/// Chooses the play-screen and routes mute-group gestures to it.
pub mod setmapper;
/// Owns every screenset in a session.
pub mod setmaster;
/// Handles musical time: tempo, PPQN, snapping, and string conversions.
pub mod time;
/// A pattern's song-arrangement triggers.
pub mod trigger;
/// Unique identifiers, including the stable event-id arena index.
pub mod uid;

/// Recommended imports for easy onboarding.
pub mod prelude {
    pub use crate::editable_event::{EditableEvent, EditableEventSession};
    pub use crate::error::Result;
    pub use crate::event::Event;
    pub use crate::eventlist::EventList;
    pub use crate::midibytes::{
        Bpm, Buss, Channel, Data7, GroupNumber, PatternNumber, Pulse, SetNumber,
    };
    pub use crate::mutegroups::{MuteGroup, MuteGroups};
    pub use crate::ports::PortsList;
    pub use crate::rng::Rng;
    pub use crate::scales::{Key, Scale};
    pub use crate::screenset::Screenset;
    pub use crate::setmapper::SetMapper;
    pub use crate::setmaster::SetMaster;
    pub use crate::time::MidiTime;
    pub use crate::trigger::{Trigger, TriggerList};
    pub use crate::uid::{EventId, Uid};
}
