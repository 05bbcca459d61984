// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! A single MIDI, system, or meta event, with an optional sysex/meta payload
//! and a link to its note-on/note-off mate.

use crate::midibytes::{Channel, Data7, Pulse};
use crate::time::{MidiTime, SnapKind};
use crate::uid::EventId;
use serde::{Deserialize, Serialize};

/// Channel-voice and system status byte constants. A channel-voice status is
/// always stored with the channel nibble masked off; the channel lives in its
/// own field.
#[allow(missing_docs)]
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const AFTERTOUCH: u8 = 0xA0;
    pub const CONTROLLER: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const CHANNEL_PRESSURE: u8 = 0xD0;
    pub const PITCH_WHEEL: u8 = 0xE0;
    pub const SYSEX_START: u8 = 0xF0;
    pub const SYSEX_END: u8 = 0xF7;
    pub const META: u8 = 0xFF;
}

/// Meta event type bytes (used when `status == status::META`).
#[allow(missing_docs)]
pub mod meta {
    pub const SEQUENCE_NUMBER: u8 = 0x00;
    pub const TEXT: u8 = 0x01;
    pub const TRACK_NAME: u8 = 0x03;
    pub const END_OF_TRACK: u8 = 0x2F;
    pub const TEMPO: u8 = 0x51;
    pub const TIME_SIGNATURE: u8 = 0x58;
    pub const KEY_SIGNATURE: u8 = 0x59;
}

/// Independent boolean statuses an editor or the playback engine attaches to
/// an event. Kept as named fields rather than a bitmask, per the crate-wide
/// rule against enum/bit overloading for multi-valued state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EventFlags {
    pub selected: bool,
    pub marked: bool,
    pub painted: bool,
    pub linked: bool,
}

/// One MIDI channel-voice, system, sysex, or meta event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    timestamp: Pulse,
    raw_status: u8,
    /// For channel-voice events, the channel. For meta events, the meta
    /// type byte is stored here too (so this field's meaning depends on
    /// `raw_status`); see [Event::channel] vs [Event::meta_type].
    chan_or_meta: u8,
    d0: Data7,
    d1: Data7,
    sysex: Option<Vec<u8>>,
    flags: EventFlags,
    link: Option<EventId>,
}
impl Default for Event {
    fn default() -> Self {
        Self {
            timestamp: Pulse::ZERO,
            raw_status: status::NOTE_OFF,
            chan_or_meta: 0,
            d0: Data7::default(),
            d1: Data7::default(),
            sysex: None,
            flags: EventFlags::default(),
            link: None,
        }
    }
}
#[allow(missing_docs)]
impl Event {
    /// Builds a channel-voice event (note on/off, CC, program change, ...).
    pub fn new_channel_voice(
        timestamp: Pulse,
        raw_status: u8,
        channel: Channel,
        d0: Data7,
        d1: Data7,
    ) -> Self {
        Self {
            timestamp,
            raw_status: raw_status & 0xF0,
            chan_or_meta: channel.raw(),
            d0,
            d1,
            ..Default::default()
        }
    }

    /// Builds a system real-time/common event (no channel, no data bytes
    /// beyond what the caller supplies).
    pub fn new_system(timestamp: Pulse, raw_status: u8) -> Self {
        Self {
            timestamp,
            raw_status,
            chan_or_meta: Channel::NONE.raw(),
            ..Default::default()
        }
    }

    /// Builds a sysex event carrying an arbitrary payload.
    pub fn new_sysex(timestamp: Pulse, payload: Vec<u8>) -> Self {
        Self {
            timestamp,
            raw_status: status::SYSEX_START,
            chan_or_meta: Channel::NONE.raw(),
            sysex: Some(payload),
            ..Default::default()
        }
    }

    /// Builds a meta event of the given type with the given payload.
    pub fn new_meta(timestamp: Pulse, meta_type: u8, payload: Vec<u8>) -> Self {
        Self {
            timestamp,
            raw_status: status::META,
            chan_or_meta: meta_type,
            sysex: Some(payload),
            ..Default::default()
        }
    }

    pub fn timestamp(&self) -> Pulse {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, ts: Pulse) {
        self.timestamp = ts;
    }

    pub fn raw_status(&self) -> u8 {
        self.raw_status
    }

    /// The channel, if this is a channel-voice event.
    pub fn channel(&self) -> Channel {
        if self.is_channel_voice() {
            Channel::new(self.chan_or_meta)
        } else {
            Channel::NONE
        }
    }

    /// The meta type byte, if this is a meta event.
    pub fn meta_type(&self) -> Option<u8> {
        if self.raw_status == status::META {
            Some(self.chan_or_meta)
        } else {
            None
        }
    }

    pub fn d0(&self) -> Data7 {
        self.d0
    }

    pub fn d1(&self) -> Data7 {
        self.d1
    }

    pub fn set_d0(&mut self, value: Data7) {
        self.d0 = value;
    }

    pub fn set_d1(&mut self, value: Data7) {
        self.d1 = value;
    }

    pub fn sysex(&self) -> Option<&[u8]> {
        self.sysex.as_deref()
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut EventFlags {
        &mut self.flags
    }

    pub fn link(&self) -> Option<EventId> {
        self.link
    }

    /// Points this event at `other`. Callers (normally
    /// [crate::eventlist::EventList]) are responsible for setting the mate's
    /// link back, maintaining the bidirectional invariant.
    pub fn link_to(&mut self, other: EventId) {
        self.link = Some(other);
        self.flags.linked = true;
    }

    pub fn clear_link(&mut self) {
        self.link = None;
        self.flags.linked = false;
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    pub fn is_channel_voice(&self) -> bool {
        matches!(
            self.raw_status,
            status::NOTE_OFF
                | status::NOTE_ON
                | status::AFTERTOUCH
                | status::CONTROLLER
                | status::PROGRAM_CHANGE
                | status::CHANNEL_PRESSURE
                | status::PITCH_WHEEL
        )
    }

    /// True for a Note On with nonzero velocity. A Note On with velocity 0 is
    /// conventionally a Note Off in disguise, so it is excluded here and
    /// included by [Event::is_note_off].
    pub fn is_note_on(&self) -> bool {
        self.raw_status == status::NOTE_ON && self.d1.value() > 0
    }

    pub fn is_note_off(&self) -> bool {
        self.raw_status == status::NOTE_OFF
            || (self.raw_status == status::NOTE_ON && self.d1.value() == 0)
    }

    pub fn is_linkable_on(&self) -> bool {
        self.is_note_on() && !self.is_linked()
    }

    pub fn is_linkable_off(&self) -> bool {
        self.is_note_off() && !self.is_linked()
    }

    pub fn is_controller(&self) -> bool {
        self.raw_status == status::CONTROLLER
    }

    pub fn is_tempo(&self) -> bool {
        self.meta_type() == Some(meta::TEMPO)
    }

    pub fn is_time_signature(&self) -> bool {
        self.meta_type() == Some(meta::TIME_SIGNATURE)
    }

    pub fn is_key_signature(&self) -> bool {
        self.meta_type() == Some(meta::KEY_SIGNATURE)
    }

    pub fn match_status(&self, s: u8) -> bool {
        self.raw_status == s
    }

    /// Sets status and channel together, enforcing that only a channel-voice
    /// status can carry a channel. Returns `false` (no change) for a
    /// non-channel-voice status.
    pub fn set_channel_status(&mut self, raw_status: u8, channel: Channel) -> bool {
        let masked = raw_status & 0xF0;
        if !matches!(
            masked,
            status::NOTE_OFF
                | status::NOTE_ON
                | status::AFTERTOUCH
                | status::CONTROLLER
                | status::PROGRAM_CHANGE
                | status::CHANNEL_PRESSURE
                | status::PITCH_WHEEL
        ) {
            return false;
        }
        self.raw_status = masked;
        self.chan_or_meta = channel.raw();
        true
    }

    /// Turns this event into a Set Tempo meta event carrying the 3-byte
    /// microseconds-per-quarter-note encoding of `bpm`.
    pub fn set_tempo(&mut self, bpm: crate::midibytes::Bpm) {
        let bytes = MidiTime::bpm_to_tempo_bytes(bpm);
        self.raw_status = status::META;
        self.chan_or_meta = meta::TEMPO;
        self.sysex = Some(bytes.to_vec());
    }

    pub fn set_meta(&mut self, kind: u8, payload: Vec<u8>) {
        self.raw_status = status::META;
        self.chan_or_meta = kind;
        self.sysex = Some(payload);
    }

    /// Nudges `d1` (velocity, or a controller's value byte) by a uniform
    /// random amount in `[-range, range]`, clamped to 7 bits. Returns `true`
    /// if the value changed.
    pub fn randomize_velocity(&mut self, range: i64, rng: &mut crate::rng::Rng) -> bool {
        if range <= 0 {
            return false;
        }
        let delta = rng.rand_symmetric(range);
        let new_value = (self.d1.value() as i64 + delta).clamp(0, Data7::MAX as i64) as u8;
        if new_value == self.d1.value() {
            false
        } else {
            self.d1 = Data7::new(new_value);
            true
        }
    }

    /// Nudges `d0` (note number) by a uniform random amount, without regard
    /// to scale membership; scale-aware walking is layered on top by
    /// [crate::eventlist::EventList::randomize_selected_notes].
    pub fn randomize_pitch(&mut self, range: i64, rng: &mut crate::rng::Rng) -> bool {
        if range <= 0 {
            return false;
        }
        let delta = rng.rand_symmetric(range);
        let new_value = (self.d0.value() as i64 + delta).clamp(0, Data7::MAX as i64) as u8;
        if new_value == self.d0.value() {
            false
        } else {
            self.d0 = Data7::new(new_value);
            true
        }
    }

    /// Moves the timestamp fully to the nearest multiple of `snap`. Returns
    /// `true` if the timestamp changed.
    pub fn quantize(&mut self, snap: Pulse, length: Pulse) -> bool {
        let target = MidiTime::snap(SnapKind::Closest, snap, self.timestamp);
        self.set_timestamp_clamped(target, length)
    }

    /// Moves the timestamp halfway toward the nearest multiple of `snap`,
    /// rounding toward the original timestamp. Gentler than [Event::quantize].
    pub fn tighten(&mut self, snap: Pulse, length: Pulse) -> bool {
        let target = MidiTime::snap(SnapKind::Closest, snap, self.timestamp);
        let delta = target.value() - self.timestamp.value();
        let halved = self.timestamp.value() + delta / 2;
        self.set_timestamp_clamped(Pulse(halved), length)
    }

    fn set_timestamp_clamped(&mut self, new_ts: Pulse, length: Pulse) -> bool {
        let clamped = if length.value() > 0 {
            Pulse(new_ts.value().clamp(0, length.value() - 1))
        } else {
            new_ts
        };
        if clamped == self.timestamp {
            false
        } else {
            self.timestamp = clamped;
            true
        }
    }

    /// Sort rank at equal timestamp: Note Offs must sort before Note Ons so
    /// that `verify_and_link` never mis-links a same-tick off/on pair.
    pub fn rank(&self) -> u8 {
        if self.is_note_off() {
            0
        } else if self.is_note_on() {
            2
        } else {
            1
        }
    }

    /// The `(timestamp, rank)` sort key used by [crate::eventlist::EventList::sort].
    pub fn sort_key(&self) -> (Pulse, u8) {
        (self.timestamp, self.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn note_on_with_zero_velocity_is_a_note_off() {
        let e = Event::new_channel_voice(
            Pulse(0),
            status::NOTE_ON,
            Channel::new(0),
            Data7::new(60),
            Data7::new(0),
        );
        assert!(e.is_note_off());
        assert!(!e.is_note_on());
    }

    #[test]
    fn rank_orders_note_off_before_note_on() {
        let off = Event::new_channel_voice(
            Pulse(0),
            status::NOTE_OFF,
            Channel::new(0),
            Data7::new(60),
            Data7::new(0),
        );
        let on = Event::new_channel_voice(
            Pulse(0),
            status::NOTE_ON,
            Channel::new(0),
            Data7::new(60),
            Data7::new(100),
        );
        assert!(off.rank() < on.rank());
    }

    #[test]
    fn set_channel_status_rejects_non_channel_voice() {
        let mut e = Event::default();
        assert!(!e.set_channel_status(status::META, Channel::new(0)));
    }

    #[test]
    fn tempo_round_trips_through_sysex_payload() {
        let mut e = Event::default();
        e.set_tempo(crate::midibytes::Bpm(120.0));
        assert!(e.is_tempo());
        assert_eq!(e.sysex().unwrap().len(), 3);
    }

    #[test]
    fn quantize_tighten_scenario_from_spec() {
        // ppqn=192, t=5, snap=48: quantize moves fully to 0; tighten moves
        // halfway, landing at 2 or 3.
        let mut q = Event::default();
        q.set_timestamp(Pulse(5));
        assert!(q.quantize(Pulse(48), Pulse(0)));
        assert_eq!(q.timestamp(), Pulse(0));

        let mut t = Event::default();
        t.set_timestamp(Pulse(5));
        assert!(t.tighten(Pulse(48), Pulse(0)));
        assert!(t.timestamp() == Pulse(2) || t.timestamp() == Pulse(3));
    }

    #[test]
    fn link_sets_linked_flag() {
        let mut e = Event::default();
        e.link_to(EventId(3));
        assert!(e.is_linked());
        assert!(e.flags().linked);
        e.clear_link();
        assert!(!e.is_linked());
        assert!(!e.flags().linked);
    }

    #[test]
    fn randomize_velocity_stays_in_bounds() {
        let mut e = Event::new_channel_voice(
            Pulse(0),
            status::NOTE_ON,
            Channel::new(0),
            Data7::new(60),
            Data7::new(64),
        );
        let mut rng = Rng::default();
        for _ in 0..50 {
            e.randomize_velocity(10, &mut rng);
            assert!(e.d1().value() <= 127);
        }
    }
}
