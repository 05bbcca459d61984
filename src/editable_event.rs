// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Human-readable, editable views onto [Event]s: the category/status/data
//! name lookups an event editor needs, and a session object that stages
//! edits before they are committed back into an [EventList].

use crate::event::{meta, status, Event};
use crate::eventlist::EventList;
use crate::midibytes::{Channel, Data7, Pulse};
use crate::time::MidiTime;
use anyhow::{anyhow, Result};

/// The major kind of event an [EditableEvent] represents, which determines
/// which name table its status is looked up in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Category {
    ChannelMessage,
    SystemMessage,
    MetaEvent,
    SeqSpecEvent,
}

/// How an [EditableEvent]'s timestamp is rendered for display/editing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimestampFormat {
    Measures,
    Time,
    Pulses,
}

const CHANNEL_EVENT_NAMES: [&str; 7] = [
    "Note Off",
    "Note On",
    "Aftertouch",
    "Control Change",
    "Program Change",
    "Channel Pressure",
    "Pitch Wheel",
];

/// Looks up the channel-voice event name for a status nibble (`0x80..=0xE0`,
/// masked). Returns `None` outside that range.
pub fn channel_event_name(raw_status: u8) -> Option<&'static str> {
    let index = (raw_status >> 4).checked_sub(8)? as usize;
    CHANNEL_EVENT_NAMES.get(index).copied()
}

fn channel_event_value(name: &str) -> Option<u8> {
    CHANNEL_EVENT_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| ((i as u8) + 8) << 4)
}

fn system_event_name(raw_status: u8) -> &'static str {
    match raw_status {
        0xF0 => "SysEx Start",
        0xF1 => "MIDI Time Code",
        0xF2 => "Song Position",
        0xF3 => "Song Select",
        0xF6 => "Tune Request",
        0xF7 => "SysEx End",
        0xF8 => "Timing Clock",
        0xFA => "Start",
        0xFB => "Continue",
        0xFC => "Stop",
        0xFE => "Active Sensing",
        0xFF => "Reset",
        _ => "Undefined",
    }
}

fn meta_event_name(meta_type: u8) -> &'static str {
    match meta_type {
        meta::SEQUENCE_NUMBER => "Sequence Number",
        meta::TEXT => "Text Event",
        0x02 => "Copyright Notice",
        meta::TRACK_NAME => "Track Name",
        0x04 => "Instrument Name",
        0x05 => "Lyric",
        0x06 => "Marker",
        0x07 => "Cue Point",
        0x20 => "Channel Prefix",
        meta::END_OF_TRACK => "End of Track",
        meta::TEMPO => "Set Tempo",
        0x54 => "SMPTE Offset",
        meta::TIME_SIGNATURE => "Time Signature",
        meta::KEY_SIGNATURE => "Key Signature",
        0x7F => "Sequencer Specific",
        _ => "Undefined Meta Event",
    }
}

/// The required payload length for a standard meta event type, if fixed.
pub fn meta_event_length(meta_type: u8) -> Option<u16> {
    match meta_type {
        meta::SEQUENCE_NUMBER => Some(2),
        meta::END_OF_TRACK => Some(0),
        meta::TEMPO => Some(3),
        0x54 => Some(5),
        meta::TIME_SIGNATURE => Some(4),
        meta::KEY_SIGNATURE => Some(2),
        0x20 => Some(1),
        _ => None,
    }
}

/// Continuous-controller name lookup, per the MIDI CC assignment table.
/// Gaps in the assignment (reserved/undefined CC numbers) report
/// `"Undefined"` rather than panicking on an out-of-table index.
pub fn controller_name(cc: u8) -> &'static str {
    match cc {
        0 => "Bank Select",
        1 => "Modulation",
        2 => "Breath Controller",
        4 => "Foot Controller",
        5 => "Portamento Time",
        6 => "Data Entry",
        7 => "Channel Volume",
        8 => "Balance",
        10 => "Pan",
        11 => "Expression",
        12 => "Effect Control 1",
        13 => "Effect Control 2",
        16..=19 => "General Purpose",
        64 => "Damper Pedal",
        65 => "Portamento On/Off",
        66 => "Sostenuto",
        67 => "Soft Pedal",
        68 => "Legato",
        70 => "Sound Control 1 (Variation)",
        71 => "Sound Control 2 (Timbre)",
        72 => "Sound Control 3 (Release)",
        73 => "Sound Control 4 (Attack)",
        74 => "Sound Control 5 (Cutoff)",
        75..=79 => "Sound Control",
        80..=83 => "General Purpose On/Off",
        84 => "Portamento Control",
        91 => "Effect 1 Depth (Reverb)",
        92 => "Effect 2 Depth (Tremolo)",
        93 => "Effect 3 Depth (Chorus)",
        94 => "Effect 4 Depth (Detune)",
        95 => "Effect 5 Depth (Phaser)",
        96 => "Data Increment",
        97 => "Data Decrement",
        98 => "NRPN LSB",
        99 => "NRPN MSB",
        100 => "RPN LSB",
        101 => "RPN MSB",
        121 => "Reset All Controllers",
        122 => "Local Control",
        123 => "All Notes Off",
        124 => "Omni Off",
        125 => "Omni On",
        126 => "Mono On",
        127 => "Poly On",
        _ => "Undefined",
    }
}

/// A human-editable view onto one [Event].
#[derive(Clone, Debug)]
pub struct EditableEvent {
    event: Event,
    link_time: Pulse,
    category: Category,
    format_timestamp: TimestampFormat,
}
impl EditableEvent {
    pub fn new(event: Event) -> Self {
        let mut e = Self {
            event,
            link_time: Pulse::NULL,
            category: Category::ChannelMessage,
            format_timestamp: TimestampFormat::Measures,
        };
        e.analyze();
        e
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn event_mut(&mut self) -> &mut Event {
        &mut self.event
    }

    pub fn into_event(self) -> Event {
        self.event
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn link_time(&self) -> Pulse {
        self.link_time
    }

    pub fn set_link_time(&mut self, t: Pulse) {
        self.link_time = t;
    }

    pub fn format(&self) -> TimestampFormat {
        self.format_timestamp
    }

    pub fn set_format(&mut self, format: TimestampFormat) {
        self.format_timestamp = format;
    }

    /// Recomputes [EditableEvent::category] from the wrapped event's raw
    /// status. Call after directly mutating the event through
    /// [EditableEvent::event_mut].
    pub fn analyze(&mut self) {
        self.category = if self.event.is_channel_voice() {
            Category::ChannelMessage
        } else if self.event.raw_status() == status::META {
            if self.event.meta_type() == Some(0x7F) {
                Category::SeqSpecEvent
            } else {
                Category::MetaEvent
            }
        } else {
            Category::SystemMessage
        };
    }

    /// The event's category-appropriate status name: a channel-voice name,
    /// a system message name, or a meta event name.
    pub fn status_string(&self) -> String {
        match self.category {
            Category::ChannelMessage => channel_event_name(self.event.raw_status())
                .unwrap_or("Undefined")
                .to_string(),
            Category::SystemMessage => system_event_name(self.event.raw_status()).to_string(),
            Category::MetaEvent | Category::SeqSpecEvent => self
                .event
                .meta_type()
                .map(meta_event_name)
                .unwrap_or("Undefined Meta Event")
                .to_string(),
        }
    }

    /// The controller name, if this is a Control Change event.
    pub fn controller_string(&self) -> Option<&'static str> {
        if self.event.is_controller() {
            Some(controller_name(self.event.d0().value()))
        } else {
            None
        }
    }

    pub fn channel_string(&self) -> String {
        match self.event.channel().value() {
            Some(c) => format!("{}", c + 1),
            None => "--".to_string(),
        }
    }

    pub fn data_string(&self) -> String {
        format!("{} {}", self.event.d0().value(), self.event.d1().value())
    }

    /// Renders the timestamp per [EditableEvent::format].
    pub fn format_timestamp(&self, time: &MidiTime) -> String {
        match self.format_timestamp {
            TimestampFormat::Measures => time.pulses_to_string_bbt(self.event.timestamp()),
            TimestampFormat::Time => time.pulses_to_string_hms(self.event.timestamp()),
            TimestampFormat::Pulses => format!("{}", self.event.timestamp().value()),
        }
    }

    /// Sets the timestamp from a string in the currently selected format.
    pub fn set_timestamp_from_string(&mut self, s: &str, time: &MidiTime) -> Result<()> {
        let is_time = matches!(self.format_timestamp, TimestampFormat::Time);
        let parsed = if matches!(self.format_timestamp, TimestampFormat::Pulses) {
            s.trim()
                .parse::<i64>()
                .map(Pulse)
                .map_err(|_| anyhow!("not a pulse count: {s}"))?
        } else {
            time.string_to_pulses(s, is_time)
        };
        if parsed.is_null() {
            return Err(anyhow!("could not parse timestamp: {s}"));
        }
        self.event.set_timestamp(parsed);
        Ok(())
    }

    /// Rewrites the event's timestamp, status, data bytes, and channel from
    /// editor strings, re-deriving [EditableEvent::category] afterward.
    /// Only applies to channel-voice events; meta and system events reject
    /// a status-name change here, matching seq66's rule that the editor
    /// cannot turn a meta event into a channel event in place.
    pub fn set_status_from_string(
        &mut self,
        timestamp: &str,
        status_name: &str,
        d0: &str,
        d1: &str,
        channel: &str,
        time: &MidiTime,
    ) -> Result<()> {
        let raw_status =
            channel_event_value(status_name).ok_or_else(|| anyhow!("unknown event name: {status_name}"))?;
        let channel_number: u8 = channel
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow!("bad channel: {channel}"))?
            .saturating_sub(1);
        let channel = Channel::new(channel_number);
        if !self.event.set_channel_status(raw_status, channel) {
            return Err(anyhow!("{status_name} is not a channel-voice status"));
        }
        self.modify_channel_status_from_string(d0, d1, &format!("{}", channel_number + 1))?;
        self.set_timestamp_from_string(timestamp, time)?;
        self.analyze();
        Ok(())
    }

    /// Rewrites just the data bytes and channel, leaving status untouched.
    pub fn modify_channel_status_from_string(
        &mut self,
        d0: &str,
        d1: &str,
        channel: &str,
    ) -> Result<()> {
        let d0: u8 = d0.trim().parse().map_err(|_| anyhow!("bad data byte: {d0}"))?;
        let d1: u8 = d1.trim().parse().map_err(|_| anyhow!("bad data byte: {d1}"))?;
        let channel_number: u8 = channel
            .trim()
            .parse::<u8>()
            .map_err(|_| anyhow!("bad channel: {channel}"))?
            .saturating_sub(1);
        self.event.set_d0(Data7::new(d0));
        self.event.set_d1(Data7::new(d1));
        let raw_status = self.event.raw_status();
        self.event
            .set_channel_status(raw_status, Channel::new(channel_number));
        Ok(())
    }
}

/// A staging area for an event editor: a table of [EditableEvent]s checked
/// out of an [EventList], plus a dirty flag. Edits only reach the real
/// event list when [EditableEventSession::save] is called; dropping the
/// session (or calling [EditableEventSession::cancel]) discards them.
#[derive(Debug, Default)]
pub struct EditableEventSession {
    table: Vec<EditableEvent>,
    dirty: bool,
}
impl EditableEventSession {
    /// Builds a session from the events currently in `events`.
    pub fn initialize_table(events: &EventList) -> Self {
        let mut table: Vec<EditableEvent> = events
            .iter()
            .map(|(_, e)| EditableEvent::new(e.clone()))
            .collect();
        table.sort_by_key(|e| e.event().sort_key());
        Self {
            table,
            dirty: false,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, index: usize) -> Option<&EditableEvent> {
        self.table.get(index)
    }

    pub fn insert(&mut self, event: EditableEvent) {
        self.table.push(event);
        self.dirty = true;
    }

    /// Applies `f` to the event at `index`, marking the session dirty if
    /// present.
    pub fn modify(&mut self, index: usize, f: impl FnOnce(&mut EditableEvent)) -> bool {
        if let Some(e) = self.table.get_mut(index) {
            f(e);
            self.dirty = true;
            true
        } else {
            false
        }
    }

    pub fn delete(&mut self, index: usize) -> Option<EditableEvent> {
        if index >= self.table.len() {
            return None;
        }
        self.dirty = true;
        Some(self.table.remove(index))
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.dirty = true;
    }

    /// Commits the staged table into a fresh [EventList], re-linking
    /// note on/off pairs.
    pub fn save(&mut self, length: Pulse) -> EventList {
        let mut list = EventList::new();
        for e in &self.table {
            list.insert(e.event().clone());
        }
        list.verify_and_link(length, true);
        self.dirty = false;
        list
    }

    /// Discards all staged edits.
    pub fn cancel(mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::status;
    use crate::midibytes::Channel;

    fn sample_note_on() -> Event {
        Event::new_channel_voice(
            Pulse(0),
            status::NOTE_ON,
            Channel::new(0),
            Data7::new(60),
            Data7::new(100),
        )
    }

    #[test]
    fn analyze_categorizes_channel_voice() {
        let e = EditableEvent::new(sample_note_on());
        assert_eq!(e.category(), Category::ChannelMessage);
        assert_eq!(e.status_string(), "Note On");
    }

    #[test]
    fn analyze_categorizes_meta_and_seqspec() {
        let mut tempo_event = Event::default();
        tempo_event.set_tempo(crate::midibytes::Bpm(120.0));
        let e = EditableEvent::new(tempo_event);
        assert_eq!(e.category(), Category::MetaEvent);
        assert_eq!(e.status_string(), "Set Tempo");

        let mut seqspec = Event::default();
        seqspec.set_meta(0x7F, vec![1, 2, 3]);
        let e2 = EditableEvent::new(seqspec);
        assert_eq!(e2.category(), Category::SeqSpecEvent);
    }

    #[test]
    fn controller_string_only_for_controllers() {
        let e = EditableEvent::new(sample_note_on());
        assert!(e.controller_string().is_none());

        let cc = Event::new_channel_voice(
            Pulse(0),
            status::CONTROLLER,
            Channel::new(0),
            Data7::new(7),
            Data7::new(100),
        );
        let e2 = EditableEvent::new(cc);
        assert_eq!(e2.controller_string(), Some("Channel Volume"));
    }

    #[test]
    fn set_status_from_string_round_trips_channel_voice() {
        let mut e = EditableEvent::new(sample_note_on());
        let time = MidiTime::default();
        e.set_status_from_string("1:1:0", "Note Off", "64", "0", "2", &time)
            .unwrap();
        assert!(e.event().is_note_off());
        assert_eq!(e.event().channel().value(), Some(1));
        assert_eq!(e.event().d0().value(), 64);
    }

    #[test]
    fn session_save_rebuilds_and_links() {
        let mut events = EventList::new();
        events.insert(sample_note_on());
        let mut session = EditableEventSession::initialize_table(&events);
        assert_eq!(session.len(), 1);
        let list = session.save(Pulse(192));
        assert_eq!(list.len(), 2); // the synthesized note off joins it
    }
}
