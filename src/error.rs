// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Shared error alias. Domain mutators (`EventList`, `TriggerList`,
//! `MuteGroups`, ...) return `bool` or a sentinel per their own contracts;
//! this alias is only for constructors and parsers where failure means
//! "caller passed a nonsensical value," in the style of the teacher's
//! `TimeSignature::new_with`.

/// Convenience alias for the crate's fallible constructors.
pub type Result<T> = anyhow::Result<T>;
