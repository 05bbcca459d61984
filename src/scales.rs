// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Scale membership tests, chord note-offset tables, key-signature name
//! lookups, and histogram-based key/scale analysis of a pattern's notes.

use crate::eventlist::EventList;
use strum_macros::{EnumCount, FromRepr, IntoStaticStr};

/// Semitones per octave; used throughout as the modulus for pitch-class math.
pub const OCTAVE_SIZE: usize = 12;

/// Minimum number of Note On events [analyze_notes] needs before it will
/// report a result.
pub const ANALYSIS_MINIMUM: usize = 8;

/// The twelve pitch classes, `C` through `B`.
#[derive(Clone, Copy, Debug, Eq, FromRepr, IntoStaticStr, PartialEq, EnumCount)]
#[repr(usize)]
pub enum Key {
    C,
    #[strum(serialize = "C#")]
    CSharp,
    D,
    #[strum(serialize = "D#")]
    DSharp,
    E,
    F,
    #[strum(serialize = "F#")]
    FSharp,
    G,
    #[strum(serialize = "G#")]
    GSharp,
    A,
    #[strum(serialize = "A#")]
    ASharp,
    B,
}

/// A scale's note-membership pattern, named per seq66's scale table.
#[derive(Clone, Copy, Debug, Eq, FromRepr, IntoStaticStr, PartialEq, EnumCount)]
#[repr(usize)]
pub enum Scale {
    Chromatic,
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    WholeTone,
    MinorBlues,
    MajorPentatonic,
    MinorPentatonic,
    Phrygian,
    Enigmatic,
    Diminished,
    Dorian,
    Mixolydian,
}

const SCALES_POLICY: [[bool; OCTAVE_SIZE]; 14] = [
    [
        true, true, true, true, true, true, true, true, true, true, true, true,
    ], // chromatic
    [
        true, false, true, false, true, true, false, true, false, true, false, true,
    ], // major
    [
        true, false, true, true, false, true, false, true, true, false, true, false,
    ], // minor
    [
        true, false, true, true, false, true, false, true, true, false, false, true,
    ], // harmonic minor
    [
        true, false, true, true, false, true, false, true, false, true, false, true,
    ], // melodic minor
    [
        true, false, true, false, true, false, true, false, true, false, true, false,
    ], // whole tone
    [
        true, false, false, true, false, true, true, true, false, false, true, false,
    ], // minor blues
    [
        true, false, true, false, true, false, false, true, false, true, false, false,
    ], // major pentatonic
    [
        true, false, false, true, false, true, false, true, false, false, true, false,
    ], // minor pentatonic
    [
        true, true, false, true, false, true, false, true, true, false, true, false,
    ], // phrygian
    [
        true, true, false, false, true, false, true, false, true, false, true, true,
    ], // enigmatic
    [
        true, false, true, true, false, true, true, false, true, true, false, true,
    ], // diminished
    [
        true, false, true, true, false, true, false, true, false, true, true, false,
    ], // dorian
    [
        true, false, true, false, true, true, false, true, false, true, true, false,
    ], // mixolydian
];

const SCALES_TRANSPOSE_UP: [[i32; OCTAVE_SIZE]; 14] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [2, 0, 2, 0, 1, 2, 0, 2, 0, 2, 0, 1],
    [2, 0, 1, 2, 0, 2, 0, 1, 2, 0, 2, 0],
    [2, 0, 1, 2, 0, 2, 0, 1, 3, 0, 0, 1],
    [2, 0, 1, 2, 0, 2, 0, 2, 0, 2, 0, 1],
    [2, 0, 2, 0, 2, 0, 2, 0, 2, 0, 2, 0],
    [3, 0, 0, 2, 0, 1, 1, 3, 0, 0, 2, 0],
    [2, 0, 2, 0, 3, 0, 0, 2, 0, 3, 0, 0],
    [3, 0, 0, 2, 0, 2, 0, 3, 0, 0, 2, 0],
    [1, 2, 0, 2, 0, 2, 0, 1, 2, 0, 2, 0],
    [1, 3, 0, 0, 2, 0, 2, 0, 2, 0, 1, 1],
    [2, 0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1],
    [2, 0, 1, 2, 0, 2, 0, 2, 0, 1, 2, 0],
    [2, 0, 2, 0, 1, 2, 0, 2, 0, 1, 2, 0],
];

const SCALES_TRANSPOSE_DOWN: [[i32; OCTAVE_SIZE]; 14] = [
    [-1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1],
    [-1, 0, -2, 0, -2, -1, 0, -2, 0, -2, 0, -2],
    [-2, 0, -2, -1, 0, -2, 0, -2, -1, 0, -2, 0],
    [-1, 0, -2, -1, 0, -2, 0, -2, -1, 0, 0, -3],
    [-1, 0, -2, -1, 0, -2, 0, -2, 0, -2, 0, -2],
    [-2, 0, -2, 0, -2, 0, -2, 0, -2, 0, -2, 0],
    [-2, 0, 0, -3, 0, -2, -1, -1, 0, 0, -3, 0],
    [-3, 0, -2, 0, 2, 0, 0, -3, 0, -2, 0, 0],
    [-2, 0, 0, -3, 0, -2, 0, -2, 0, 0, -3, 0],
    [-1, -1, 0, -1, 0, -1, 0, -1, -1, 0, -1, 0],
    [-1, -1, 0, 0, -3, 0, -2, 0, -2, 0, -2, -1],
    [-1, 0, -2, -1, 0, -2, -1, 0, -2, -1, 0, -2],
    [-2, 0, -2, -1, 0, -2, 0, -2, 0, -2, -1, 0],
    [-2, 0, -2, 0, -2, 1, 0, -2, 0, -2, -1, 0],
];

fn rotate_right(values: &mut [i32; OCTAVE_SIZE]) {
    let last = values[OCTAVE_SIZE - 1];
    for i in (1..OCTAVE_SIZE).rev() {
        values[i] = values[i - 1];
    }
    values[0] = last;
}

/// Whether `note`'s pitch class belongs to `scale` rooted at `key`.
pub fn is_in_scale(scale: Scale, key: Key, note: u8) -> bool {
    let semitone = (note as i32 - key as i32).rem_euclid(OCTAVE_SIZE as i32) as usize;
    SCALES_POLICY[scale as usize][semitone]
}

/// Per-semitone upward step needed to transpose a note and land on the next
/// note in `scale` rooted at `key`, preserving the scale/key.
pub fn scale_step_up(scale: Scale, key: Key) -> [i32; OCTAVE_SIZE] {
    let mut table = SCALES_TRANSPOSE_UP[scale as usize];
    for _ in 0..(key as usize) {
        rotate_right(&mut table);
    }
    table
}

/// Per-semitone downward step needed to transpose a note and land on the
/// previous note in `scale` rooted at `key`, preserving the scale/key.
pub fn scale_step_down(scale: Scale, key: Key) -> [i32; OCTAVE_SIZE] {
    let mut table = SCALES_TRANSPOSE_DOWN[scale as usize];
    for _ in 0..(key as usize) {
        rotate_right(&mut table);
    }
    table
}

/// Moves `note` to the nearest note at or above it that belongs to `scale`
/// rooted at `key`, by repeatedly applying [scale_step_up].
pub fn nearest_in_scale_up(scale: Scale, key: Key, note: u8) -> u8 {
    if scale as usize == Scale::Chromatic as usize {
        return note;
    }
    let mut n = note as i32;
    let steps = scale_step_up(scale, key);
    for _ in 0..OCTAVE_SIZE {
        let semitone = (n - key as i32).rem_euclid(OCTAVE_SIZE as i32) as usize;
        if SCALES_POLICY[scale as usize][semitone] {
            break;
        }
        n += steps[semitone].max(1);
    }
    n.clamp(0, 127) as u8
}

const KEY_TEXT: [&str; OCTAVE_SIZE] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Renders a note number as `"<key><octave>"`, matching seq66's
/// `musical_note_name`; middle C (60) is `C4`.
pub fn musical_note_name(note: u8) -> String {
    let key = note as usize % OCTAVE_SIZE;
    let octave = note as i32 / OCTAVE_SIZE as i32 - 1;
    format!("{}{}", KEY_TEXT[key], octave)
}

/// One row of the chord-offset table: a displayable name and the semitone
/// offsets from the root that make up the chord.
#[derive(Clone, Copy, Debug)]
pub struct ChordEntry {
    pub name: &'static str,
    pub offsets: &'static [i8],
}

pub const CHORDS: [ChordEntry; 40] = [
    ChordEntry { name: "Chords off", offsets: &[] },
    ChordEntry { name: "Major", offsets: &[0, 4, 7] },
    ChordEntry { name: "Majb5", offsets: &[0, 4, 6] },
    ChordEntry { name: "minor", offsets: &[0, 3, 7] },
    ChordEntry { name: "minb5", offsets: &[0, 3, 6] },
    ChordEntry { name: "sus2", offsets: &[0, 2, 7] },
    ChordEntry { name: "sus4", offsets: &[0, 5, 7] },
    ChordEntry { name: "aug", offsets: &[0, 4, 8] },
    ChordEntry { name: "augsus4", offsets: &[0, 5, 8] },
    ChordEntry { name: "tri", offsets: &[0, 3, 6, 9] },
    ChordEntry { name: "6", offsets: &[0, 4, 7, 9] },
    ChordEntry { name: "6sus4", offsets: &[0, 5, 7, 9] },
    ChordEntry { name: "6add9", offsets: &[0, 4, 7, 9, 14] },
    ChordEntry { name: "m6", offsets: &[0, 3, 7, 9] },
    ChordEntry { name: "m6add9", offsets: &[0, 3, 7, 9, 14] },
    ChordEntry { name: "7", offsets: &[0, 4, 7, 10] },
    ChordEntry { name: "7sus4", offsets: &[0, 5, 7, 10] },
    ChordEntry { name: "7#5", offsets: &[0, 4, 8, 10] },
    ChordEntry { name: "7b5", offsets: &[0, 4, 6, 10] },
    ChordEntry { name: "7#9", offsets: &[0, 4, 7, 10, 15] },
    ChordEntry { name: "7b9", offsets: &[0, 4, 7, 10, 13] },
    ChordEntry { name: "7#5#9", offsets: &[0, 4, 8, 10, 15] },
    ChordEntry { name: "7#5b9", offsets: &[0, 4, 8, 10, 13] },
    ChordEntry { name: "7b5b9", offsets: &[0, 4, 6, 10, 13] },
    ChordEntry { name: "7add11", offsets: &[0, 4, 7, 10, 17] },
    ChordEntry { name: "7add13", offsets: &[0, 4, 7, 10, 21] },
    ChordEntry { name: "7#11", offsets: &[0, 4, 7, 10, 18] },
    ChordEntry { name: "Maj7", offsets: &[0, 4, 7, 11] },
    ChordEntry { name: "Maj7b5", offsets: &[0, 4, 6, 11] },
    ChordEntry { name: "Maj7#5", offsets: &[0, 4, 8, 11] },
    ChordEntry { name: "Maj7#11", offsets: &[0, 4, 7, 11, 18] },
    ChordEntry { name: "Maj7add13", offsets: &[0, 4, 7, 11, 21] },
    ChordEntry { name: "m7", offsets: &[0, 3, 7, 10] },
    ChordEntry { name: "m7b5", offsets: &[0, 3, 6, 10] },
    ChordEntry { name: "m7b9", offsets: &[0, 3, 7, 10, 13] },
    ChordEntry { name: "m7add11", offsets: &[0, 3, 7, 10, 17] },
    ChordEntry { name: "m7add13", offsets: &[0, 3, 7, 10, 21] },
    ChordEntry { name: "m-Maj7", offsets: &[0, 3, 7, 11] },
    ChordEntry { name: "m-Maj7add11", offsets: &[0, 3, 7, 11, 17] },
    ChordEntry { name: "m-Maj7add13", offsets: &[0, 3, 7, 11, 21] },
];

/// Looks up a chord by name (case-sensitive, as displayed).
pub fn chord_by_name(name: &str) -> Option<&'static ChordEntry> {
    CHORDS.iter().find(|c| c.name == name)
}

/// One row of the key-signature name table: the sharp/flat count (negative
/// for flats) and its major/minor root-note names.
#[derive(Clone, Copy, Debug)]
pub struct KeySignatureEntry {
    pub sharps_flats: i8,
    pub major_name: &'static str,
    pub minor_name: &'static str,
}

pub const KEY_SIGNATURES: [KeySignatureEntry; 15] = [
    KeySignatureEntry { sharps_flats: -7, major_name: "Cbmaj", minor_name: "Abmin" },
    KeySignatureEntry { sharps_flats: -6, major_name: "Gbmaj", minor_name: "Ebmin" },
    KeySignatureEntry { sharps_flats: -5, major_name: "Dbmaj", minor_name: "Bbmin" },
    KeySignatureEntry { sharps_flats: -4, major_name: "Abmaj", minor_name: "Fmin" },
    KeySignatureEntry { sharps_flats: -3, major_name: "Ebmaj", minor_name: "Cmin" },
    KeySignatureEntry { sharps_flats: -2, major_name: "Bbmaj", minor_name: "Gmin" },
    KeySignatureEntry { sharps_flats: -1, major_name: "Fmaj", minor_name: "Dmin" },
    KeySignatureEntry { sharps_flats: 0, major_name: "Cmaj", minor_name: "Amin" },
    KeySignatureEntry { sharps_flats: 1, major_name: "Gmaj", minor_name: "Emin" },
    KeySignatureEntry { sharps_flats: 2, major_name: "Dmaj", minor_name: "Bmin" },
    KeySignatureEntry { sharps_flats: 3, major_name: "Amaj", minor_name: "F#min" },
    KeySignatureEntry { sharps_flats: 4, major_name: "Emaj", minor_name: "C#min" },
    KeySignatureEntry { sharps_flats: 5, major_name: "Bmaj", minor_name: "G#min" },
    KeySignatureEntry { sharps_flats: 6, major_name: "F#maj", minor_name: "D#min" },
    KeySignatureEntry { sharps_flats: 7, major_name: "C#maj", minor_name: "A#min" },
];

/// The root-note name for a sharp/flat count (`-7..=7`) and mode.
pub fn key_signature_string(sharps_flats: i8, is_minor: bool) -> Option<&'static str> {
    if !(-7..=7).contains(&sharps_flats) {
        return None;
    }
    let entry = &KEY_SIGNATURES[(sharps_flats + 7) as usize];
    Some(if is_minor { entry.minor_name } else { entry.major_name })
}

/// The inverse of [key_signature_string]: given a root-note name, returns
/// its sharp/flat count and whether it names a minor key.
pub fn key_signature_bytes(name: &str) -> Option<(i8, bool)> {
    let lower = name.to_ascii_lowercase();
    let is_minor = lower.contains("min");
    let is_major = lower.contains("maj");
    if !is_minor && !is_major {
        return None;
    }
    KEY_SIGNATURES.iter().find_map(|e| {
        let candidate = if is_minor { e.minor_name } else { e.major_name };
        (candidate == name).then_some((e.sharps_flats, is_minor))
    })
}

/// Builds a 12-bin histogram of Note On pitch classes, then reports every
/// `(key, scale)` combination whose scale membership accounts for the most
/// histogram weight. Empty if there were fewer than [ANALYSIS_MINIMUM] Note
/// Ons, matching seq66's `analyze_notes`.
pub fn analyze_notes(events: &EventList) -> Vec<(Key, Scale)> {
    let mut histogram = [0i32; OCTAVE_SIZE];
    let mut note_count = 0usize;
    for (_, e) in events.iter() {
        if e.is_note_on() {
            note_count += 1;
            histogram[e.d0().value() as usize % OCTAVE_SIZE] += 1;
        }
    }
    if note_count < ANALYSIS_MINIMUM {
        return Vec::new();
    }

    let scale_count = SCALES_POLICY.len() - 1; // excludes chromatic
    let mut counts = vec![0i32; scale_count * OCTAVE_SIZE];
    let mut high = 0;
    for s in 0..scale_count {
        let mut policy = SCALES_POLICY[s + 1];
        for k in 0..OCTAVE_SIZE {
            let count_in: i32 = (0..OCTAVE_SIZE)
                .filter(|&bin| policy[bin])
                .map(|bin| histogram[bin])
                .sum();
            counts[s * OCTAVE_SIZE + k] = count_in;
            high = high.max(count_in);
            rotate_bool_right(&mut policy);
        }
    }

    let mut result = Vec::new();
    for s in 0..scale_count {
        for k in 0..OCTAVE_SIZE {
            if counts[s * OCTAVE_SIZE + k] == high {
                if let (Some(scale), Some(key)) = (Scale::from_repr(s + 1), Key::from_repr(k)) {
                    result.push((key, scale));
                }
            }
        }
    }
    result
}

fn rotate_bool_right(values: &mut [bool; OCTAVE_SIZE]) {
    let last = values[OCTAVE_SIZE - 1];
    for i in (1..OCTAVE_SIZE).rev() {
        values[i] = values[i - 1];
    }
    values[0] = last;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{status, Event};
    use crate::midibytes::{Channel, Data7, Pulse};

    #[test]
    fn is_in_scale_matches_c_major() {
        // C major: C D E F G A B
        assert!(is_in_scale(Scale::Major, Key::C, 60)); // C4
        assert!(!is_in_scale(Scale::Major, Key::C, 61)); // C#4
        assert!(is_in_scale(Scale::Major, Key::C, 62)); // D4
    }

    #[test]
    fn musical_note_name_identifies_middle_c() {
        assert_eq!(musical_note_name(60), "C4");
    }

    #[test]
    fn chord_lookup_returns_known_offsets() {
        let major = chord_by_name("Major").unwrap();
        assert_eq!(major.offsets, &[0, 4, 7]);
    }

    #[test]
    fn key_signature_round_trips() {
        assert_eq!(key_signature_string(0, false), Some("Cmaj"));
        assert_eq!(key_signature_bytes("Cmaj"), Some((0, false)));
        assert_eq!(key_signature_bytes("F#min"), Some((3, true)));
    }

    #[test]
    fn analyze_notes_requires_minimum_count() {
        let mut events = EventList::new();
        for i in 0..4 {
            events.insert(Event::new_channel_voice(
                Pulse(i * 10),
                status::NOTE_ON,
                Channel::new(0),
                Data7::new(60),
                Data7::new(100),
            ));
        }
        assert!(analyze_notes(&events).is_empty());
    }

    #[test]
    fn analyze_notes_finds_c_major_from_scale_run() {
        let mut events = EventList::new();
        for (i, note) in [60, 62, 64, 65, 67, 69, 71, 72].iter().enumerate() {
            events.insert(Event::new_channel_voice(
                Pulse(i as i64 * 10),
                status::NOTE_ON,
                Channel::new(0),
                Data7::new(*note),
                Data7::new(100),
            ));
        }
        let found = analyze_notes(&events);
        assert!(found.iter().any(|(k, s)| matches!(k, Key::C) && matches!(s, Scale::Major)));
    }
}
