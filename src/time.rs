// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Pulse/beat/measure/tempo math, and the `BBT`/`HMS` string forms a UI uses
//! to display and edit a timestamp.

use crate::midibytes::{Bpm, Pulse};
use serde::{Deserialize, Serialize};

/// Which direction a pulse snaps to the nearest multiple of a snap unit.
/// Kept as three plain variants rather than a bitfield, per the "no
/// enum-as-bitfield" rule that also governs [crate::eventlist::SelectAction].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SnapKind {
    /// Snaps to the grid line at or before the value.
    Down,
    /// Snaps to whichever neighboring grid line is closer; ties go [SnapKind::Down].
    Closest,
    /// Snaps to the grid line at or after the value.
    Up,
}

/// Musical-time parameters for one pattern: tempo, meter, and resolution.
/// This is the only object in the crate that knows how to convert among
/// pulses, beats, measures, and wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MidiTime {
    bpm: Bpm,
    beats_per_bar: u32,
    beat_width: u32,
    ppqn: u32,
}
impl Default for MidiTime {
    fn default() -> Self {
        Self {
            bpm: Bpm::default(),
            beats_per_bar: 4,
            beat_width: 4,
            ppqn: 192,
        }
    }
}
#[allow(missing_docs)]
impl MidiTime {
    /// Number of MIDI clock messages per quarter note; a MIDI-protocol
    /// constant, not something derived from `ppqn`.
    pub const CLOCK_BEATS_PER_QN: u32 = 24;

    pub fn new(bpm: Bpm, beats_per_bar: u32, beat_width: u32, ppqn: u32) -> Self {
        Self {
            bpm,
            beats_per_bar: beats_per_bar.max(1),
            beat_width: beat_width.max(1),
            ppqn: ppqn.max(1),
        }
    }

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: Bpm) {
        self.bpm = bpm;
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn beat_width(&self) -> u32 {
        self.beat_width
    }

    pub fn ppqn(&self) -> u32 {
        self.ppqn
    }

    /// Microseconds per pulse.
    pub fn pulse_length_us(bpm: Bpm, ppqn: u32) -> f64 {
        if bpm.value() > 0.0 && ppqn > 0 {
            60_000_000.0 / (bpm.value() * ppqn as f64)
        } else {
            0.0
        }
    }

    /// Converts an elapsed microsecond duration into a tick delta.
    pub fn ticks_from_us(us: f64, bpm: Bpm, ppqn: u32) -> f64 {
        bpm.value() * ppqn as f64 * (us / 60_000_000.0)
    }

    /// Converts a tick delta into an elapsed microsecond duration.
    pub fn ticks_to_us(delta_ticks: f64, bpm: Bpm, ppqn: u32) -> f64 {
        delta_ticks * Self::pulse_length_us(bpm, ppqn)
    }

    /// Pulses in one measure, independent of the time signature's
    /// denominator: always `4 * ppqn`. See the spec glossary for why this
    /// constraint is deliberate rather than an oversight.
    pub fn pulses_per_measure(ppqn: u32) -> Pulse {
        Pulse(4 * ppqn as i64)
    }

    pub fn pulses_per_beat(ppqn: u32, beats_per_bar: u32, beat_width: u32) -> Pulse {
        if beat_width == 0 {
            Pulse::ZERO
        } else {
            Pulse((beats_per_bar as i64 * ppqn as i64) / beat_width as i64)
        }
    }

    pub fn measures_to_ticks(beats_per_bar: u32, ppqn: u32, beat_width: u32, measures: i64) -> Pulse {
        if beat_width == 0 {
            Pulse::ZERO
        } else {
            Pulse((4 * ppqn as i64 * measures * beats_per_bar as i64) / beat_width as i64)
        }
    }

    pub fn ticks_to_measures(pulses: Pulse, ppqn: u32, beats_per_bar: u32, beat_width: u32) -> f64 {
        if ppqn > 0 && beats_per_bar > 0 {
            (pulses.value() as f64 * beat_width as f64) / (4.0 * ppqn as f64 * beats_per_bar as f64)
        } else {
            0.0
        }
    }

    pub fn ticks_to_beats(pulses: Pulse, ppqn: u32, beats_per_bar: u32, beat_width: u32) -> i64 {
        if ppqn > 0 && beats_per_bar > 0 {
            (pulses.value() * beat_width as i64 / ppqn as i64 / 4) % beats_per_bar as i64
        } else {
            0
        }
    }

    /// `tempo_us_from_bpm(b) = 60_000_000 / b`, with the same dead zone
    /// below ~0.01 BPM that seq66 uses to avoid a division blowup.
    pub fn tempo_us_from_bpm(bpm: Bpm) -> f64 {
        if bpm.value() > 0.009_999_999 {
            60_000_000.0 / bpm.value()
        } else {
            0.0
        }
    }

    pub fn bpm_from_tempo_us(tempo_us: f64) -> Bpm {
        if tempo_us >= 1.0 {
            Bpm(60_000_000.0 / tempo_us)
        } else {
            Bpm(0.0)
        }
    }

    /// Packs a tempo into the 3-byte big-endian microseconds-per-quarter-note
    /// form used by a MIDI Set Tempo meta event.
    pub fn bpm_to_tempo_bytes(bpm: Bpm) -> [u8; 3] {
        let us = Self::tempo_us_from_bpm(bpm).round() as u32;
        [(us >> 16) as u8, (us >> 8) as u8, us as u8]
    }

    pub fn tempo_bytes_to_bpm(bytes: [u8; 3]) -> Bpm {
        let us = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
        Self::bpm_from_tempo_us(us as f64)
    }

    /// Rescales a pulse value when a pattern's PPQN changes, preserving
    /// musical position.
    pub fn rescale_tick(tick: Pulse, new_ppqn: u32, old_ppqn: u32) -> Pulse {
        if old_ppqn == 0 {
            tick
        } else {
            Pulse((tick.value() as i128 * new_ppqn as i128 / old_ppqn as i128) as i64)
        }
    }

    /// Snaps `value` to the nearest multiple of `snap`, per `kind`. Ties
    /// break to [SnapKind::Down], matching seq66's `snapped<>` template.
    pub fn snap(kind: SnapKind, snap_unit: Pulse, value: Pulse) -> Pulse {
        if value.value() <= 0 || snap_unit.value() <= 0 {
            return Pulse::ZERO;
        }
        let snap = snap_unit.value();
        let p = value.value();
        let down = Pulse(p - (p % snap));
        match kind {
            SnapKind::Down => down,
            SnapKind::Up => Pulse(down.value() + snap),
            SnapKind::Closest => {
                let up = Pulse(down.value() + snap);
                let delta_lo = p - down.value();
                let delta_hi = up.value() - p;
                if delta_lo <= delta_hi {
                    down
                } else {
                    up
                }
            }
        }
    }

    /// Renders `p` as `"measure:beat:tick"`, 1-based measure and beat.
    pub fn pulses_to_string_bbt(&self, p: Pulse) -> String {
        let ppqn = self.ppqn as i64;
        let per_measure = 4 * ppqn * self.beats_per_bar as i64 / self.beat_width.max(1) as i64;
        let per_beat = ppqn * 4 / self.beat_width.max(1) as i64;
        let ticks = p.value().max(0);
        let measure = ticks / per_measure.max(1) + 1;
        let within_measure = ticks % per_measure.max(1);
        let beat = within_measure / per_beat.max(1) + 1;
        let tick = within_measure % per_beat.max(1);
        format!("{}:{}:{}", measure, beat, tick)
    }

    /// Renders `p` as `"hh:mm:ss.fraction"` wall-clock time at the current
    /// tempo.
    pub fn pulses_to_string_hms(&self, p: Pulse) -> String {
        let us = Self::ticks_to_us(p.value() as f64, self.bpm, self.ppqn);
        let total_seconds = us / 1_000_000.0;
        let hours = (total_seconds / 3600.0) as u64;
        let minutes = ((total_seconds - hours as f64 * 3600.0) / 60.0) as u64;
        let seconds = total_seconds - hours as f64 * 3600.0 - minutes as f64 * 60.0;
        format!("{:02}:{:02}:{:06.3}", hours, minutes, seconds)
    }

    /// Parses either a `"M:B:T"` or a `"H:M:S.frac"` string, per
    /// `is_time_format`. Returns [Pulse::NULL] on a malformed string,
    /// matching `string_to_pulses`'s failure contract.
    pub fn string_to_pulses(&self, s: &str, is_time_format: bool) -> Pulse {
        if is_time_format {
            self.hms_to_pulses(s)
        } else {
            self.bbt_to_pulses(s)
        }
    }

    fn bbt_to_pulses(&self, s: &str) -> Pulse {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Pulse::NULL;
        }
        let (Ok(measure), Ok(beat), Ok(tick)) = (
            parts[0].trim().parse::<i64>(),
            parts[1].trim().parse::<i64>(),
            parts[2].trim().parse::<i64>(),
        ) else {
            return Pulse::NULL;
        };
        if measure < 1 || beat < 1 {
            return Pulse::NULL;
        }
        let ppqn = self.ppqn as i64;
        let per_measure = 4 * ppqn * self.beats_per_bar as i64 / self.beat_width.max(1) as i64;
        let per_beat = ppqn * 4 / self.beat_width.max(1) as i64;
        Pulse((measure - 1) * per_measure + (beat - 1) * per_beat + tick)
    }

    fn hms_to_pulses(&self, s: &str) -> Pulse {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Pulse::NULL;
        }
        let (Ok(hours), Ok(minutes), Ok(seconds)) = (
            parts[0].trim().parse::<f64>(),
            parts[1].trim().parse::<f64>(),
            parts[2].trim().parse::<f64>(),
        ) else {
            return Pulse::NULL;
        };
        let total_seconds = hours * 3600.0 + minutes * 60.0 + seconds;
        let us = total_seconds * 1_000_000.0;
        Pulse(Self::ticks_from_us(us, self.bpm, self.ppqn).round() as i64)
    }
}
