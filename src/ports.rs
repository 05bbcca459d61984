// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Data-model-only port list: a map from buss number to enabled/clock/name
//! state, plus the nickname heuristics used to reconcile configured port
//! names against system-assigned ones. No ALSA/JACK/portmidi calls are made
//! here; I/O drivers are a collaborator's concern.

use crate::midibytes::Buss;
use std::collections::BTreeMap;

/// Clock-sync behavior for an output port; also how a missing input port is
/// represented (`Disabled`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClockMode {
    Disabled,
    Off,
    Pos,
    Mod,
}

/// One buss's configuration: whether it's in use, its clock behavior, and
/// its display names.
#[derive(Clone, Debug, Default)]
pub struct PortEntry {
    pub enabled: bool,
    pub clock_mode: Option<ClockMode>,
    pub name: String,
    pub nick_name: String,
    pub alias: String,
}

const SHORT_NAMES: [&str; 8] = [
    "input",
    "output",
    "in",
    "out",
    "midi input",
    "midi output",
    "midi in",
    "midi out",
];

fn detect_short_name(portname: &str) -> bool {
    if portname.is_empty() {
        return true;
    }
    let lower = portname.to_ascii_lowercase();
    SHORT_NAMES.iter().any(|&s| lower.starts_with(s))
}

fn count_colons(name: &str) -> usize {
    name.matches(':').count()
}

/// Derives a short `Client:Port`-style nickname from a full ALSA/JACK
/// display name, falling back to the original name when no clean split is
/// found.
pub fn extract_nickname(name: &str) -> String {
    let mut result = String::new();
    if count_colons(name) > 2 {
        if let Some(first_colon) = name.find(':') {
            if let Some(space_rel) = name[first_colon..].find(' ') {
                let space_pos = first_colon + space_rel + 1;
                if let Some(second_colon_rel) = name[space_pos..].find(':') {
                    let end = space_pos + second_colon_rel;
                    result = name[space_pos..end].to_string();
                } else {
                    result = name[space_pos..].to_string();
                }
            }
        }
    } else if let Some(last_colon) = name.rfind(':') {
        let mut start = last_colon + 1;
        if let Some(ch) = name[start..].chars().next() {
            if ch.is_ascii_digit() {
                if let Some(space_rel) = name[start..].find(' ') {
                    start += space_rel + 1;
                }
            } else if ch.is_whitespace() {
                start += 1;
            }
        }
        result = name.get(start..).unwrap_or("").to_string();
    }

    if detect_short_name(&result) {
        result = name.trim().to_string();
    }
    if result.is_empty() {
        result = name.to_string();
    }
    result
}

/// A map of buss number to its enabled/clock/name configuration, with the
/// nickname translation helpers used to overlay live port state onto a
/// configured port map.
#[derive(Clone, Debug, Default)]
pub struct PortsList {
    entries: BTreeMap<u8, PortEntry>,
    is_active: bool,
    is_port_map: bool,
}

impl PortsList {
    pub fn new(is_port_map: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            is_active: false,
            is_port_map,
        }
    }

    pub fn is_port_map(&self) -> bool {
        self.is_port_map
    }

    pub fn active(&self) -> bool {
        self.is_active && !self.entries.is_empty()
    }

    pub fn set_active(&mut self, flag: bool) {
        self.is_active = flag;
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn add(&mut self, buss: Buss, name: impl Into<String>) -> &mut PortEntry {
        let name = name.into();
        let nick_name = extract_nickname(&name);
        self.entries.entry(buss.raw()).or_insert(PortEntry {
            enabled: true,
            clock_mode: Some(ClockMode::Off),
            name,
            nick_name,
            alias: String::new(),
        })
    }

    pub fn get(&self, buss: Buss) -> Option<&PortEntry> {
        self.entries.get(&buss.raw())
    }

    pub fn get_mut(&mut self, buss: Buss) -> Option<&mut PortEntry> {
        self.entries.get_mut(&buss.raw())
    }

    pub fn is_disabled(&self, buss: Buss) -> bool {
        self.get(buss).map(|e| !e.enabled).unwrap_or(true)
    }

    /// Linear scan by nickname; [Buss::NULL] if not found.
    pub fn bus_from_nick_name(&self, nick: &str) -> Buss {
        self.entries
            .iter()
            .find(|(_, e)| e.nick_name == nick)
            .map(|(&b, _)| Buss::new(b))
            .unwrap_or(Buss::NULL)
    }

    /// For each entry in `self`, looks up the same `name` in `source` and
    /// copies its `enabled`/`clock_mode`, overlaying live port status onto a
    /// configured port map.
    pub fn match_up(&mut self, source: &PortsList) {
        for entry in self.entries.values_mut() {
            if let Some(src) = source.entries.values().find(|e| e.name == entry.name) {
                entry.enabled = src.enabled;
                entry.clock_mode = src.clock_mode;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_nickname_handles_a2j_shape() {
        // "a2j:Midi Through [14] (capture): Midi Through Port-0"
        let name = "a2j:Midi Through [14] (capture): Midi Through Port-0";
        assert_eq!(extract_nickname(name), "Midi Through Port-0");
    }

    #[test]
    fn extract_nickname_handles_client_port_shape() {
        let name = "14:0 Midi Through:Midi Through Port-0";
        assert_eq!(extract_nickname(name), "Midi Through Port-0");
    }

    #[test]
    fn extract_nickname_falls_back_on_plain_name() {
        assert_eq!(extract_nickname("USB MIDI Device"), "USB MIDI Device");
    }

    #[test]
    fn bus_from_nick_name_returns_null_when_missing() {
        let ports = PortsList::new(false);
        assert_eq!(ports.bus_from_nick_name("nope"), Buss::NULL);
    }

    #[test]
    fn match_up_copies_enabled_and_clock_from_source() {
        let mut configured = PortsList::new(true);
        configured.add(Buss::new(0), "USB MIDI Device");
        configured.get_mut(Buss::new(0)).unwrap().enabled = false;

        let mut live = PortsList::new(false);
        live.add(Buss::new(0), "USB MIDI Device");
        live.get_mut(Buss::new(0)).unwrap().enabled = true;
        live.get_mut(Buss::new(0)).unwrap().clock_mode = Some(ClockMode::Pos);

        configured.match_up(&live);
        assert!(configured.get(Buss::new(0)).unwrap().enabled);
        assert_eq!(configured.get(Buss::new(0)).unwrap().clock_mode, Some(ClockMode::Pos));
    }
}
