// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Semantic MIDI byte and addressing types shared by every module in the
//! crate. These are the load-bearing sentinels: every other module's
//! "not found" / "not yet assigned" behavior is expressed in terms of one of
//! these.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A tick count at a pattern's configured PPQN. Signed so that deltas and the
/// [Pulse::NULL] sentinel share the same representation as ordinary
/// timestamps.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
    Deserialize,
)]
pub struct Pulse(pub i64);
#[allow(missing_docs)]
impl Pulse {
    pub const NULL: Pulse = Pulse(-1);
    pub const MAX: Pulse = Pulse(i64::MAX);
    pub const ZERO: Pulse = Pulse(0);

    pub const fn is_null(&self) -> bool {
        self.0 == Self::NULL.0
    }

    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Non-negative remainder, matching the "offset modulo pattern length"
    /// normalization used throughout trigger placement.
    pub fn rem_euclid(&self, modulus: Pulse) -> Pulse {
        if modulus.0 <= 0 {
            Pulse::ZERO
        } else {
            Pulse(self.0.rem_euclid(modulus.0))
        }
    }
}
impl From<i64> for Pulse {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
impl From<Pulse> for i64 {
    fn from(value: Pulse) -> Self {
        value.0
    }
}
impl Add for Pulse {
    type Output = Pulse;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Pulse {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl Sub for Pulse {
    type Output = Pulse;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl SubAssign for Pulse {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A 7-bit MIDI data value (note number, velocity, controller value, ...).
/// Out-of-range constructions clamp rather than panic, matching the rest of
/// the crate's "reject silently" error policy.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
    Deserialize,
)]
pub struct Data7(u8);
impl Data7 {
    /// The largest representable value.
    pub const MAX: u8 = 127;

    /// Clamps `value` into 7-bit range.
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    /// The raw byte.
    pub const fn value(&self) -> u8 {
        self.0
    }
}
impl From<u8> for Data7 {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}
impl From<Data7> for u8 {
    fn from(value: Data7) -> Self {
        value.0
    }
}

/// A MIDI channel, 0-15, with the sentinel [Channel::NONE] used by meta and
/// system events that have no channel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Channel(u8);
impl Channel {
    /// The largest valid channel number.
    pub const MAX: u8 = 15;

    /// Sentinel for "no channel", matching seq66's `c_midichannel_null`.
    pub const NONE: Channel = Channel(0x80);

    /// Builds a channel, falling back to [Channel::NONE] if out of range.
    pub fn new(value: u8) -> Self {
        if value <= Self::MAX {
            Self(value)
        } else {
            Self::NONE
        }
    }

    /// True if this is the "no channel" sentinel.
    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }

    /// The channel number, or `None` if this is the sentinel.
    pub fn value(&self) -> Option<u8> {
        if self.is_none() {
            None
        } else {
            Some(self.0)
        }
    }

    /// The raw byte, including the sentinel encoding.
    pub const fn raw(&self) -> u8 {
        self.0
    }
}
impl Default for Channel {
    fn default() -> Self {
        Self::NONE
    }
}
impl From<u8> for Channel {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// A MIDI buss (port) number, 0-47, with [Buss::NULL] for "no buss".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Buss(u8);
impl Buss {
    /// The largest valid buss number.
    pub const MAX: u8 = 47;

    /// Sentinel for "no buss", matching seq66's `c_bussbyte_max`.
    pub const NULL: Buss = Buss(0xFF);

    /// Builds a buss number, falling back to [Buss::NULL] if out of range.
    pub fn new(value: u8) -> Self {
        if value <= Self::MAX {
            Self(value)
        } else {
            Self::NULL
        }
    }

    /// True if this is the "no buss" sentinel.
    pub const fn is_null(&self) -> bool {
        self.0 == Self::NULL.0
    }

    /// The raw byte.
    pub const fn raw(&self) -> u8 {
        self.0
    }
}
impl Default for Buss {
    fn default() -> Self {
        Self::NULL
    }
}

/// Tempo, in beats per minute. Always positive when meaningful; `0.0` is used
/// as a "not yet known" value by the conversions in [crate::time].
#[derive(Clone, Copy, Debug, Display, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Bpm(pub f64);
impl Bpm {
    /// The raw value.
    pub const fn value(&self) -> f64 {
        self.0
    }
}
impl Default for Bpm {
    fn default() -> Self {
        Self(120.0)
    }
}
impl From<f64> for Bpm {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// An opaque MIDI I/O port identifier, with [PortId::NONE] for "unassigned".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct PortId(pub u16);
impl PortId {
    /// Sentinel matching seq66's `null_system_port_id()`.
    pub const NONE: PortId = PortId(0xFFFE);

    /// True if this is the "no port" sentinel.
    pub const fn is_none(&self) -> bool {
        self.0 == Self::NONE.0
    }
}
impl Default for PortId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Identifies a pattern (sequence) across the whole session, independent of
/// which screenset it lives in.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct PatternNumber(pub i32);
impl PatternNumber {
    /// No pattern selected.
    pub const UNASSIGNED: PatternNumber = PatternNumber(-1);

    /// A wildcard meaning "every pattern", used by set-wide operations.
    pub const ALL: PatternNumber = PatternNumber(-2);

    /// True if this is [PatternNumber::UNASSIGNED].
    pub const fn is_unassigned(&self) -> bool {
        self.0 == Self::UNASSIGNED.0
    }

    /// True if this is the [PatternNumber::ALL] wildcard.
    pub const fn is_all(&self) -> bool {
        self.0 == Self::ALL.0
    }
}
impl Default for PatternNumber {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}
impl From<i32> for PatternNumber {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Identifies a screenset (set of patterns).
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct SetNumber(pub i32);
impl SetNumber {
    /// No set selected.
    pub const UNASSIGNED: SetNumber = SetNumber(-1);

    /// The key of the dummy sentinel screenset `SetMaster` always keeps
    /// around so lookups of a missing set have somewhere safe to land.
    pub const SCREENSET_LIMIT: SetNumber = SetNumber(2048);

    /// True if this is [SetNumber::UNASSIGNED].
    pub const fn is_unassigned(&self) -> bool {
        self.0 == Self::UNASSIGNED.0
    }
}
impl Default for SetNumber {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}
impl From<i32> for SetNumber {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Identifies a mute-group.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct GroupNumber(pub i32);
impl GroupNumber {
    /// No mute-group selected.
    pub const NULL: GroupNumber = GroupNumber(-1);

    /// True if this is [GroupNumber::NULL].
    pub const fn is_null(&self) -> bool {
        self.0 == Self::NULL.0
    }
}
impl Default for GroupNumber {
    fn default() -> Self {
        Self::NULL
    }
}
impl From<i32> for GroupNumber {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_sentinels() {
        assert!(Pulse::NULL.is_null());
        assert!(!Pulse::ZERO.is_null());
        assert_eq!((Pulse(5) - Pulse(5)).value(), 0);
    }

    #[test]
    fn pulse_rem_euclid_normalizes_negative_offsets() {
        assert_eq!(Pulse(-10).rem_euclid(Pulse(96)).value(), 86);
        assert_eq!(Pulse(200).rem_euclid(Pulse(96)).value(), 8);
    }

    #[test]
    fn data7_clamps() {
        assert_eq!(Data7::new(200).value(), 127);
        assert_eq!(Data7::new(10).value(), 10);
    }

    #[test]
    fn channel_out_of_range_becomes_none() {
        assert!(Channel::new(16).is_none());
        assert_eq!(Channel::new(3).value(), Some(3));
    }

    #[test]
    fn buss_out_of_range_becomes_null() {
        assert!(Buss::new(48).is_null());
        assert!(!Buss::new(47).is_null());
    }

    #[test]
    fn pattern_number_sentinels() {
        assert!(PatternNumber::default().is_unassigned());
        assert!(PatternNumber::ALL.is_all());
    }
}
