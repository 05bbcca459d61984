// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Owns every [Screenset] in a session, keyed by set number, plus one dummy
//! sentinel at [SetNumber::SCREENSET_LIMIT] returned for invalid lookups.

use crate::midibytes::SetNumber;
use crate::screenset::Screenset;
use std::collections::BTreeMap;

pub const ROWS: i32 = 4;
pub const COLUMNS: i32 = 8;

/// Manager for the set of [Screenset]s, independent of pattern playback.
pub struct SetMaster {
    screenset_rows: i32,
    screenset_columns: i32,
    rows: i32,
    columns: i32,
    set_count: i32,
    highest_set: i32,
    container: BTreeMap<i32, Screenset>,
}

impl Default for SetMaster {
    fn default() -> Self {
        Self::new(ROWS, COLUMNS)
    }
}

impl SetMaster {
    pub fn new(set_rows: i32, set_columns: i32) -> Self {
        let rows = ROWS;
        let columns = COLUMNS;
        let mut container = BTreeMap::new();
        container.insert(
            SetNumber::SCREENSET_LIMIT.0,
            Screenset::new(SetNumber::SCREENSET_LIMIT, set_rows, set_columns),
        );
        Self {
            screenset_rows: set_rows,
            screenset_columns: set_columns,
            rows,
            columns,
            set_count: rows * columns,
            highest_set: 0,
            container,
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn screenset_max(&self) -> i32 {
        self.set_count
    }

    pub fn highest_set(&self) -> i32 {
        self.highest_set
    }

    /// Excludes the dummy sentinel at `SCREENSET_LIMIT`.
    pub fn screenset_count(&self) -> i32 {
        self.container.len() as i32 - 1
    }

    pub fn is_screenset_available(&self, set_no: SetNumber) -> bool {
        self.container.contains_key(&set_no.0)
    }

    pub fn is_screenset_active(&self, set_no: SetNumber) -> bool {
        self.container
            .get(&set_no.0)
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }

    pub fn is_screenset_valid(&self, set_no: SetNumber) -> bool {
        set_no.0 >= 0 && set_no.0 < self.set_count
    }

    pub fn grid_to_set(&self, row: i32, col: i32) -> SetNumber {
        if row < 0 || row >= self.rows || col < 0 || col >= self.columns {
            return SetNumber(0);
        }
        SetNumber(row + self.rows * col)
    }

    /// Clamps `offset` into `[0, screenset_max())`.
    pub fn clamp(&self, offset: SetNumber) -> SetNumber {
        if offset.0 < 0 {
            SetNumber(0)
        } else if offset.0 >= self.set_count {
            SetNumber(self.set_count - 1)
        } else {
            offset
        }
    }

    /// Creates an empty screenset at `set_no`, updating `highest_set` unless
    /// `set_no` is the dummy sentinel.
    pub fn add_set(&mut self, set_no: SetNumber) -> &mut Screenset {
        if set_no != SetNumber::SCREENSET_LIMIT && set_no.0 > self.highest_set {
            self.highest_set = set_no.0;
        }
        self.container
            .entry(set_no.0)
            .or_insert_with(|| Screenset::new(set_no, self.screenset_rows, self.screenset_columns))
    }

    pub fn screen(&self, set_no: SetNumber) -> Option<&Screenset> {
        self.container.get(&set_no.0)
    }

    pub fn screen_mut(&mut self, set_no: SetNumber) -> Option<&mut Screenset> {
        self.container.get_mut(&set_no.0)
    }

    pub fn remove_set(&mut self, set_no: SetNumber) -> bool {
        self.container.remove(&set_no.0).is_some()
    }

    /// Copies both screensets, renumbers each copy to the other's key (which
    /// renumbers every pattern they contain), then re-inserts the copies in
    /// place of the originals.
    pub fn swap_sets(&mut self, set0: SetNumber, set1: SetNumber) -> bool {
        let (Some(a), Some(b)) = (
            self.container.get(&set0.0).cloned(),
            self.container.get(&set1.0).cloned(),
        ) else {
            return false;
        };
        let set_size = self.screenset_rows * self.screenset_columns;
        let mut a = a;
        let mut b = b;
        a.renumber(set1, set_size);
        b.renumber(set0, set_size);
        self.container.insert(set1.0, a);
        self.container.insert(set0.0, b);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midibytes::PatternNumber;

    #[test]
    fn add_set_tracks_highest_set() {
        let mut sm = SetMaster::default();
        sm.add_set(SetNumber(0));
        sm.add_set(SetNumber(3));
        assert_eq!(sm.highest_set(), 3);
    }

    #[test]
    fn screenset_count_excludes_dummy() {
        let mut sm = SetMaster::default();
        sm.add_set(SetNumber(0));
        sm.add_set(SetNumber(1));
        assert_eq!(sm.screenset_count(), 2);
    }

    #[test]
    fn swap_sets_renumbers_contained_patterns() {
        let mut sm = SetMaster::default();
        sm.add_set(SetNumber(0))
            .insert_at_or_after(0, PatternNumber(5));
        sm.add_set(SetNumber(1))
            .insert_at_or_after(0, PatternNumber(37));
        assert!(sm.swap_sets(SetNumber(0), SetNumber(1)));
        assert_eq!(sm.screen(SetNumber(0)).unwrap().set_number(), SetNumber(0));
        assert_eq!(sm.screen(SetNumber(1)).unwrap().set_number(), SetNumber(1));
        // what was set 1's pattern (37) now lives under key 0, shifted down by one set
        assert_eq!(
            sm.screen(SetNumber(0)).unwrap().pattern_at(0),
            Some(PatternNumber(37 - 32))
        );
    }

    #[test]
    fn grid_to_set_out_of_range_returns_zero() {
        let sm = SetMaster::default();
        assert_eq!(sm.grid_to_set(-1, 0), SetNumber(0));
        assert_eq!(sm.grid_to_set(0, 0), SetNumber(0));
    }
}
