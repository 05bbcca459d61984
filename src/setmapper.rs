// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Chooses the play-screen and routes mute-group gestures to it. Borrows a
//! [SetMaster] and [MuteGroups] rather than owning them.

use crate::midibytes::{GroupNumber, PatternNumber, SetNumber};
use crate::mutegroups::{GridOrientation, MuteGroups};
use crate::setmaster::SetMaster;
use delegate::delegate;

/// Tracks the play-screen and the per-pattern armed-state vector snapshot
/// taken for it.
pub struct SetMapper<'a> {
    master: &'a mut SetMaster,
    mutes: &'a mut MuteGroups,
    playscreen: SetNumber,
    playscreen_bits: Vec<bool>,
    sequence_count: i32,
    sequence_high: i32,
    edit_sequence: PatternNumber,
}

impl<'a> SetMapper<'a> {
    pub fn new(master: &'a mut SetMaster, mutes: &'a mut MuteGroups) -> Self {
        let slots = (master.rows() * master.columns()) as usize;
        Self {
            master,
            mutes,
            playscreen: SetNumber(0),
            playscreen_bits: vec![false; slots],
            sequence_count: 0,
            sequence_high: 0,
            edit_sequence: PatternNumber::UNASSIGNED,
        }
    }

    delegate! {
        to self.master {
            pub fn screenset_count(&self) -> i32;
            pub fn highest_set(&self) -> i32;
            pub fn is_screenset_active(&self, set_no: SetNumber) -> bool;
            pub fn is_screenset_valid(&self, set_no: SetNumber) -> bool;
        }
    }

    pub fn playscreen(&self) -> SetNumber {
        self.playscreen
    }

    pub fn sequence_count(&self) -> i32 {
        self.sequence_count
    }

    pub fn sequence_high(&self) -> i32 {
        self.sequence_high
    }

    pub fn edit_sequence(&self) -> PatternNumber {
        self.edit_sequence
    }

    pub fn set_edit_sequence(&mut self, pattern: PatternNumber) {
        self.edit_sequence = pattern;
    }

    fn set_size(&self) -> i32 {
        self.master.rows() * self.master.columns()
    }

    /// `pattern_no / set_size`; the containing set.
    pub fn seq_set(&self, pattern_no: PatternNumber) -> SetNumber {
        SetNumber(pattern_no.0.div_euclid(self.set_size().max(1)))
    }

    /// `pattern_no mod set_size`; the slot within its set.
    pub fn seq_offset(&self, pattern_no: PatternNumber) -> i32 {
        pattern_no.0.rem_euclid(self.set_size().max(1))
    }

    /// Finds the set containing `pattern_no` (creating it lazily if inside
    /// range), then inserts into the first free slot at or after the
    /// pattern's natural slot. If no slot is free, `pattern_no` is
    /// incremented until one is found or the set ceiling is reached.
    pub fn install_sequence(&mut self, pattern_no: PatternNumber) -> Option<PatternNumber> {
        let max_sets = self.master.screenset_max();
        let mut candidate = pattern_no;
        loop {
            let set_no = self.seq_set(candidate);
            if set_no.0 >= max_sets {
                return None;
            }
            let slot = self.seq_offset(candidate);
            let screenset = self.master.add_set(set_no);
            if let Some(used_slot) = screenset.insert_at_or_after(slot, candidate) {
                self.sequence_count += 1;
                self.sequence_high = self.sequence_high.max(set_no.0 * self.set_size() + used_slot + 1);
                return Some(PatternNumber(set_no.0 * self.set_size() + used_slot));
            }
            candidate = PatternNumber(candidate.0 + 1);
        }
    }

    /// Unmarks the previous play-screen, marks `set_no`. Falls back to set 0
    /// if `set_no` is invalid.
    pub fn set_playscreen(&mut self, set_no: SetNumber) {
        let set_no = if self.master.is_screenset_valid(set_no) {
            set_no
        } else {
            SetNumber(0)
        };
        if let Some(prev) = self.master.screen_mut(self.playscreen) {
            prev.set_is_playscreen(false);
        }
        self.master.add_set(set_no).set_is_playscreen(true);
        self.playscreen = set_no;
        self.playscreen_bits = vec![false; self.set_size() as usize];
    }

    pub fn apply_mutes(&mut self, group: GroupNumber) -> bool {
        self.mutes.apply(group, &mut self.playscreen_bits)
    }

    pub fn unapply_mutes(&mut self) {
        self.mutes.unapply(&mut self.playscreen_bits);
    }

    pub fn toggle_mutes(&mut self, group: GroupNumber) -> bool {
        self.mutes.toggle(group, &mut self.playscreen_bits)
    }

    pub fn toggle_active_mutes(&mut self, group: GroupNumber) -> bool {
        self.mutes.toggle_active(group, &mut self.playscreen_bits)
    }

    /// When `learn_mode`, snapshots the play-screen's armed mask into
    /// `group` and selects it.
    pub fn learn_mutes(&mut self, learn_mode: bool, group: GroupNumber) {
        if learn_mode {
            let bits = self.playscreen_bits.clone();
            self.mutes.learn_mutes(group, &bits, "");
        }
    }

    pub fn playscreen_bits(&self) -> &[bool] {
        &self.playscreen_bits
    }

    pub fn grid_to_group(&self, row: i32, col: i32, orientation: GridOrientation) -> GroupNumber {
        self.mutes.grid_to_group(row, col, orientation)
    }

    /// Applies the saved mute-state vector to every pattern in the
    /// play-screen, and forces mute on every other set's patterns.
    pub fn mute_group_tracks(&self) -> Vec<(PatternNumber, bool)> {
        let mut result = Vec::new();
        for set_no in 0..self.master.screenset_max() {
            let Some(screen) = self.master.screen(SetNumber(set_no)) else {
                continue;
            };
            if set_no == self.playscreen.0 {
                screen.for_each_pattern(|slot, pattern| {
                    let armed = self.playscreen_bits.get(slot as usize).copied().unwrap_or(false);
                    result.push((pattern, armed));
                });
            } else {
                screen.for_each_pattern(|_, pattern| result.push((pattern, false)));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_set_and_offset_split_pattern_number() {
        let mut master = SetMaster::default();
        let mut mutes = MuteGroups::default();
        let mapper = SetMapper::new(&mut master, &mut mutes);
        assert_eq!(mapper.seq_set(PatternNumber(35)), SetNumber(1));
        assert_eq!(mapper.seq_offset(PatternNumber(35)), 3);
    }

    #[test]
    fn install_sequence_finds_free_slot() {
        let mut master = SetMaster::default();
        let mut mutes = MuteGroups::default();
        let mut mapper = SetMapper::new(&mut master, &mut mutes);
        let p1 = mapper.install_sequence(PatternNumber(0)).unwrap();
        let p2 = mapper.install_sequence(PatternNumber(0)).unwrap();
        assert_ne!(p1, p2);
        assert_eq!(mapper.sequence_count(), 2);
    }

    #[test]
    fn set_playscreen_falls_back_to_zero_when_invalid() {
        let mut master = SetMaster::default();
        let mut mutes = MuteGroups::default();
        let mut mapper = SetMapper::new(&mut master, &mut mutes);
        mapper.set_playscreen(SetNumber(9999));
        assert_eq!(mapper.playscreen(), SetNumber(0));
    }

    #[test]
    fn apply_mutes_arms_playscreen_bits() {
        let mut master = SetMaster::default();
        let mut mutes = MuteGroups::default();
        mutes.get_or_create(GroupNumber(0)).set_bits(&[true, false]);
        let mut mapper = SetMapper::new(&mut master, &mut mutes);
        mapper.set_playscreen(SetNumber(0));
        assert!(mapper.apply_mutes(GroupNumber(0)));
        assert!(mapper.playscreen_bits()[0]);
    }
}
