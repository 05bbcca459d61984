// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! Song-arrangement triggers: placements of a pattern's loop onto the
//! timeline, with per-placement offset and transpose.

use crate::midibytes::Pulse;
use crate::time::MidiTime;

/// Where a trigger split lands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SplitPoint {
    /// The midpoint between start and end.
    Middle,
    /// The nearest snap-grid line to the split tick.
    Snap,
    /// The exact tick requested.
    Exact,
}

/// Which edge (or the whole block) a move/grow operation affects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Which {
    GrowStart,
    GrowEnd,
    Move,
}

/// Which direction [TriggerList::move_triggers] shifts triggers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Left,
    Right,
}

/// One placement of a pattern's loop onto the song timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trigger {
    tick_start: Pulse,
    tick_end: Pulse,
    offset: Pulse,
    /// Semitones, `-63..=63`. `0` means no transposition.
    transpose: i8,
    selected: bool,
}
impl Trigger {
    pub fn new(tick_start: Pulse, tick_end: Pulse, offset: Pulse, transpose: i8) -> Self {
        Self {
            tick_start,
            tick_end,
            offset,
            transpose: transpose.clamp(-63, 63),
            selected: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.tick_end > self.tick_start
    }

    /// Trigger length in pulses. Computed as `end - start + 1`: both
    /// endpoints are inclusive, so a naive subtraction undercounts by one.
    pub fn length(&self) -> Pulse {
        Pulse(self.tick_end.value() - self.tick_start.value() + 1)
    }

    pub fn tick_start(&self) -> Pulse {
        self.tick_start
    }

    pub fn set_tick_start(&mut self, tick: Pulse) {
        self.tick_start = tick;
    }

    pub fn tick_end(&self) -> Pulse {
        self.tick_end
    }

    pub fn set_tick_end(&mut self, tick: Pulse) {
        self.tick_end = tick;
    }

    pub fn offset(&self) -> Pulse {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Pulse) {
        self.offset = offset;
    }

    pub fn transpose(&self) -> i8 {
        self.transpose
    }

    pub fn set_transpose(&mut self, t: i8) {
        self.transpose = t.clamp(-63, 63);
    }

    pub fn is_transposed(&self) -> bool {
        self.transpose != 0
    }

    /// The `0x00..=0x80` seqspec encoding: `0x00` is "no transpose", `0x40`
    /// is "transpose by zero but recorded as present", and the rest map
    /// linearly around `0x40`.
    pub fn transpose_byte(&self) -> u8 {
        if self.transpose == 0 {
            0
        } else {
            (self.transpose as i16 + 0x40) as u8
        }
    }

    pub fn set_transpose_byte(&mut self, byte: u8) {
        self.transpose = if byte > 0x00 && byte < 0x80 {
            (byte as i16 - 0x40) as i8
        } else {
            0
        };
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn covers(&self, tick: Pulse) -> bool {
        tick.value() >= self.tick_start.value() && tick.value() <= self.tick_end.value()
    }

    pub fn at_transition(&self, start: Pulse, end: Pulse) -> bool {
        start == self.tick_start
            || end == self.tick_start
            || start == self.tick_end
            || end == self.tick_end
    }

    /// Perf-roll marker tick for a trigger drawn `len` pulses wide.
    pub fn trigger_marker(&self, len: Pulse) -> Pulse {
        if len.value() <= 0 {
            return self.tick_start;
        }
        Pulse(
            self.tick_start.value() - (self.tick_start.value() % len.value())
                + (self.offset.value() % len.value())
                - len.value(),
        )
    }

    fn rescale(&mut self, old_ppqn: u32, new_ppqn: u32) {
        self.tick_start = MidiTime::rescale_tick(self.tick_start, new_ppqn, old_ppqn);
        self.tick_end = MidiTime::rescale_tick(self.tick_end, new_ppqn, old_ppqn);
        self.offset = MidiTime::rescale_tick(self.offset, new_ppqn, old_ppqn);
    }
}

/// Returned by [TriggerList::play] when transport crosses a trigger
/// boundary: the active span and the transpose in effect across it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackEdge {
    pub start: Pulse,
    pub end: Pulse,
    pub transpose: i8,
}

/// The triggers belonging to one pattern.
#[derive(Clone, Debug, Default)]
pub struct TriggerList {
    triggers: Vec<Trigger>,
    clipboard: Option<Trigger>,
    undo_stack: Vec<Vec<Trigger>>,
    redo_stack: Vec<Vec<Trigger>>,
    paste_tick: Option<Pulse>,
    ppqn: u32,
    length: Pulse,
}
impl TriggerList {
    pub fn new(ppqn: u32, length: Pulse) -> Self {
        Self {
            ppqn: ppqn.max(1),
            length,
            ..Default::default()
        }
    }

    pub fn count(&self) -> usize {
        self.triggers.len()
    }

    pub fn number_selected(&self) -> usize {
        self.triggers.iter().filter(|t| t.selected()).count()
    }

    pub fn list(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn set_length(&mut self, len: Pulse) {
        if len.value() > 0 {
            self.length = len;
        }
    }

    pub fn set_ppqn(&mut self, ppqn: u32) {
        if ppqn > 0 {
            self.ppqn = ppqn;
        }
    }

    fn sort(&mut self) {
        self.triggers
            .sort_by_key(|t| t.tick_start());
    }

    /// Adds a new trigger. When `adjust_offset` is set, `offset` is
    /// normalized to `tick % len` rather than used verbatim, matching
    /// seq66's convention for drag-created triggers.
    ///
    /// Resolves overlaps with existing triggers before inserting: a trigger
    /// entirely covered by the new one is deleted, one whose tail is
    /// covered has its end pulled back, and one whose head is covered has
    /// its start pushed forward. The `TriggerList` invariant is that no two
    /// triggers ever overlap.
    pub fn add(&mut self, tick: Pulse, len: Pulse, offset: Pulse, transpose: i8, adjust_offset: bool) {
        let offset = if adjust_offset && len.value() > 0 {
            tick.rem_euclid(len)
        } else {
            offset
        };
        let end = Pulse(tick.value() + len.value() - 1);

        self.triggers.retain_mut(|existing| {
            if tick <= existing.tick_start() && end >= existing.tick_end() {
                false
            } else if tick <= existing.tick_end() && end >= existing.tick_end() {
                existing.set_tick_end(Pulse(tick.value() - 1));
                true
            } else if tick <= existing.tick_start() && end >= existing.tick_start() {
                existing.set_tick_start(Pulse(end.value() + 1));
                true
            } else {
                true
            }
        });

        self.triggers.push(Trigger::new(tick, end, offset, transpose));
        self.sort();
    }

    /// Rewrites every offset so triggers keep their musical content aligned
    /// after the parent pattern's length changes.
    pub fn adjust_offsets_to_length(&mut self, new_len: Pulse) {
        if new_len.value() <= 0 {
            return;
        }
        for t in &mut self.triggers {
            let adjusted = t.tick_start().rem_euclid(new_len);
            t.set_offset(adjusted);
        }
    }

    fn index_covering(&self, tick: Pulse) -> Option<usize> {
        self.triggers.iter().position(|t| t.covers(tick))
    }

    pub fn get_state(&self, tick: Pulse) -> bool {
        self.index_covering(tick).is_some()
    }

    /// Splits the trigger covering `tick` into two adjacent triggers.
    pub fn split(&mut self, tick: Pulse, split: SplitPoint) -> bool {
        let Some(i) = self.index_covering(tick) else {
            return false;
        };
        let t = self.triggers[i];
        let split_tick = match split {
            SplitPoint::Exact => tick,
            SplitPoint::Middle => {
                let half = (t.tick_end().value() - t.tick_start().value() + 1) / 2;
                Pulse(t.tick_start().value() + half)
            }
            SplitPoint::Snap => {
                let snap = Pulse((self.ppqn as i64) / 4).value().max(1);
                MidiTime::snap(
                    crate::time::SnapKind::Closest,
                    Pulse(snap),
                    tick,
                )
            }
        };
        if split_tick <= t.tick_start() || split_tick >= t.tick_end() {
            return false;
        }
        let first_end = Pulse(split_tick.value() - 1);
        let second_offset = Pulse(
            (t.offset().value() + (split_tick.value() - t.tick_start().value()))
                .rem_euclid(self.length.value().max(1)),
        );
        let second = Trigger::new(split_tick, t.tick_end(), second_offset, t.transpose());
        self.triggers[i].set_tick_end(first_end);
        self.triggers.push(second);
        self.sort();
        true
    }

    /// Extends the trigger active at `tick_from` so its span covers
    /// `[min(start, tick_to), max(end, tick_to + length - 1)]`.
    pub fn grow_trigger(&mut self, tick_from: Pulse, tick_to: Pulse, length: Pulse) {
        let Some(i) = self.index_covering(tick_from) else {
            return;
        };
        let t = &mut self.triggers[i];
        let new_start = t.tick_start().value().min(tick_to.value());
        let new_end = t.tick_end().value().max(tick_to.value() + length.value() - 1);
        t.set_tick_start(Pulse(new_start));
        t.set_tick_end(Pulse(new_end));
    }

    pub fn remove(&mut self, tick: Pulse) {
        self.triggers.retain(|t| !t.covers(tick));
    }

    /// Transposes the trigger covering `tick` by `delta` semitones. Returns
    /// `false` if there is no trigger there.
    pub fn transpose_at(&mut self, tick: Pulse, delta: i8) -> bool {
        let Some(i) = self.index_covering(tick) else {
            return false;
        };
        let current = self.triggers[i].transpose();
        self.triggers[i].set_transpose(current.saturating_add(delta));
        true
    }

    pub fn select(&mut self, tick: Pulse) -> bool {
        let Some(i) = self.index_covering(tick) else {
            return false;
        };
        self.triggers[i].set_selected(true);
        true
    }

    pub fn unselect_at(&mut self, tick: Pulse) -> bool {
        let Some(i) = self.index_covering(tick) else {
            return false;
        };
        self.triggers[i].set_selected(false);
        true
    }

    pub fn unselect_all(&mut self) {
        for t in &mut self.triggers {
            t.set_selected(false);
        }
    }

    /// Returns the `(start, end)` of the trigger covering `position`, if
    /// any.
    pub fn intersect(&self, position: Pulse) -> Option<(Pulse, Pulse)> {
        self.index_covering(position)
            .map(|i| (self.triggers[i].tick_start(), self.triggers[i].tick_end()))
    }

    pub fn remove_selected(&mut self) -> bool {
        let before = self.triggers.len();
        self.triggers.retain(|t| !t.selected());
        self.triggers.len() != before
    }

    /// Copies the first selected trigger to the clipboard.
    pub fn copy_selected(&mut self) {
        self.clipboard = self.triggers.iter().find(|t| t.selected()).copied();
    }

    /// Pastes the clipboard trigger at `paste_tick`, or, if `paste_tick` is
    /// `None`, immediately after wherever the previous paste landed (or
    /// after the clipboard's own original position, on the first paste).
    /// Each paste advances the paste-tick register so a run of
    /// `paste(None)` calls lays down adjacent copies.
    pub fn paste(&mut self, paste_tick: Option<Pulse>) {
        let Some(source) = self.clipboard else {
            return;
        };
        let at = paste_tick
            .unwrap_or_else(|| self.paste_tick.unwrap_or(Pulse(source.tick_end().value() + 1)));
        let len = source.length();
        let end = Pulse(at.value() + len.value() - 1);
        let mut pasted = Trigger::new(at, end, source.offset(), source.transpose());
        pasted.set_selected(true);
        self.triggers.push(pasted);
        self.paste_tick = Some(Pulse(end.value() + 1));
        self.sort();
    }

    pub fn set_paste_tick(&mut self, tick: Option<Pulse>) {
        self.paste_tick = tick;
    }

    pub fn paste_tick(&self) -> Option<Pulse> {
        self.paste_tick
    }

    /// Moves or grows the selected trigger's edge(s) to `tick`.
    pub fn move_selected(&mut self, tick: Pulse, adjust_offset: bool, which: Which) -> bool {
        let Some(i) = self.triggers.iter().position(|t| t.selected()) else {
            return false;
        };
        let pattern_length = self.length;
        let t = &mut self.triggers[i];
        match which {
            Which::GrowStart => {
                if tick < t.tick_end() {
                    t.set_tick_start(tick);
                }
            }
            Which::GrowEnd => {
                if tick > t.tick_start() {
                    t.set_tick_end(tick);
                }
            }
            Which::Move => {
                let len = t.length();
                t.set_tick_start(tick);
                t.set_tick_end(Pulse(tick.value() + len.value() - 1));
                if adjust_offset && pattern_length.value() > 0 {
                    t.set_offset(tick.rem_euclid(pattern_length));
                }
            }
        }
        true
    }

    pub fn get_selected_start(&self) -> Option<Pulse> {
        self.triggers.iter().filter(|t| t.selected()).map(|t| t.tick_start()).min()
    }

    pub fn get_selected_end(&self) -> Option<Pulse> {
        self.triggers.iter().filter(|t| t.selected()).map(|t| t.tick_end()).max()
    }

    pub fn get_maximum(&self) -> Pulse {
        self.triggers
            .iter()
            .map(|t| t.tick_end())
            .max()
            .unwrap_or(Pulse::ZERO)
    }

    /// Opens or closes a gap of `distance` pulses at `start`. `Right` opens
    /// a gap, splitting any trigger that straddles `start` and shifting
    /// everything from `start` onward forward. `Left` closes the
    /// `[start, start + distance)` gap, splitting any trigger straddling
    /// either edge, deleting whatever now lies fully inside the evacuated
    /// range, and shifting everything beyond it back.
    pub fn move_triggers(&mut self, start: Pulse, distance: Pulse, direction: Direction) {
        if distance.value() <= 0 {
            return;
        }
        match direction {
            Direction::Right => {
                self.split(start, SplitPoint::Exact);
                for t in &mut self.triggers {
                    if t.tick_start() >= start {
                        t.set_tick_start(Pulse(t.tick_start().value() + distance.value()));
                        t.set_tick_end(Pulse(t.tick_end().value() + distance.value()));
                    }
                }
            }
            Direction::Left => {
                let end = Pulse(start.value() + distance.value());
                self.split(start, SplitPoint::Exact);
                self.split(end, SplitPoint::Exact);
                self.triggers
                    .retain(|t| !(t.tick_start() >= start && t.tick_end() < end));
                for t in &mut self.triggers {
                    if t.tick_start() >= end {
                        t.set_tick_start(Pulse(t.tick_start().value() - distance.value()));
                        t.set_tick_end(Pulse(t.tick_end().value() - distance.value()));
                    }
                }
            }
        }
        self.sort();
    }

    /// Duplicates the triggers within `[start, start + distance)` into
    /// `[start + distance, start + 2 * distance)`.
    pub fn copy_triggers(&mut self, start: Pulse, distance: Pulse) {
        if distance.value() <= 0 {
            return;
        }
        let end = Pulse(start.value() + distance.value());
        let copies: Vec<Trigger> = self
            .triggers
            .iter()
            .filter(|t| t.tick_start() >= start && t.tick_start() < end)
            .map(|t| {
                Trigger::new(
                    Pulse(t.tick_start().value() + distance.value()),
                    Pulse(t.tick_end().value() + distance.value()),
                    t.offset(),
                    t.transpose(),
                )
            })
            .collect();
        self.triggers.extend(copies);
        self.sort();
    }

    pub fn clear(&mut self) {
        self.triggers.clear();
    }

    pub fn push_undo(&mut self) {
        self.undo_stack.push(self.triggers.clone());
        self.redo_stack.clear();
    }

    pub fn pop_undo(&mut self) -> bool {
        if let Some(prev) = self.undo_stack.pop() {
            self.redo_stack.push(self.triggers.clone());
            self.triggers = prev;
            true
        } else {
            false
        }
    }

    pub fn pop_redo(&mut self) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.triggers.clone());
            self.triggers = next;
            true
        } else {
            false
        }
    }

    /// Advances playback across `tick`, returning the edge crossed (if any)
    /// with the transpose in effect for the following span. `resume`
    /// suppresses the edge report when the transport was just repositioned
    /// rather than playing continuously through it.
    pub fn play(&self, tick: Pulse, resume: bool) -> Option<PlaybackEdge> {
        if resume {
            return None;
        }
        self.triggers
            .iter()
            .find(|t| t.at_transition(tick, tick))
            .map(|t| PlaybackEdge {
                start: t.tick_start(),
                end: t.tick_end(),
                transpose: t.transpose(),
            })
    }

    /// Rescales every trigger's ticks for a PPQN change.
    pub fn rescale(&mut self, new_ppqn: u32) {
        let old = self.ppqn;
        for t in &mut self.triggers {
            t.rescale(old, new_ppqn);
        }
        self.ppqn = new_ppqn.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_length_is_inclusive() {
        let t = Trigger::new(Pulse(0), Pulse(95), Pulse(0), 0);
        assert_eq!(t.length(), Pulse(96));
    }

    #[test]
    fn transpose_byte_round_trips() {
        let mut t = Trigger::new(Pulse(0), Pulse(95), Pulse(0), 0);
        t.set_transpose(5);
        let byte = t.transpose_byte();
        let mut t2 = Trigger::new(Pulse(0), Pulse(95), Pulse(0), 0);
        t2.set_transpose_byte(byte);
        assert_eq!(t2.transpose(), 5);
    }

    #[test]
    fn transpose_byte_zero_means_no_transpose() {
        let t = Trigger::new(Pulse(0), Pulse(95), Pulse(0), 0);
        assert_eq!(t.transpose_byte(), 0);
    }

    #[test]
    fn split_creates_two_adjacent_triggers() {
        let mut list = TriggerList::new(192, Pulse(768));
        list.add(Pulse(0), Pulse(768), Pulse(0), 0, false);
        assert!(list.split(Pulse(384), SplitPoint::Exact));
        assert_eq!(list.count(), 2);
        assert_eq!(list.list()[0].tick_end(), Pulse(383));
        assert_eq!(list.list()[1].tick_start(), Pulse(384));
    }

    #[test]
    fn copy_paste_chain_duplicates_selection() {
        let mut list = TriggerList::new(192, Pulse(768));
        list.add(Pulse(0), Pulse(768), Pulse(0), 0, false);
        list.select(Pulse(0));
        list.copy_selected();
        list.paste(Some(Pulse(768)));
        assert_eq!(list.count(), 2);
        assert_eq!(list.list()[1].tick_start(), Pulse(768));
    }

    #[test]
    fn undo_redo_restores_snapshots() {
        let mut list = TriggerList::new(192, Pulse(768));
        list.push_undo();
        list.add(Pulse(0), Pulse(768), Pulse(0), 0, false);
        assert_eq!(list.count(), 1);
        assert!(list.pop_undo());
        assert_eq!(list.count(), 0);
        assert!(list.pop_redo());
        assert_eq!(list.count(), 1);
    }

    #[test]
    fn move_triggers_shifts_everything_after_start() {
        let mut list = TriggerList::new(192, Pulse(768));
        list.add(Pulse(0), Pulse(768), Pulse(0), 0, false);
        list.move_triggers(Pulse(0), Pulse(100), Direction::Right);
        assert_eq!(list.list()[0].tick_start(), Pulse(100));
    }

    #[test]
    fn grow_trigger_extends_span_without_touching_other_triggers() {
        let mut list = TriggerList::new(192, Pulse(2000));
        list.add(Pulse(0), Pulse(100), Pulse(0), 0, false);
        list.add(Pulse(500), Pulse(100), Pulse(0), 0, false);
        list.grow_trigger(Pulse(10), Pulse(250), Pulse(50));
        assert_eq!(list.count(), 2);
        assert_eq!(list.list()[0].tick_start(), Pulse(0));
        assert_eq!(list.list()[0].tick_end(), Pulse(299));
        assert_eq!(list.list()[1].tick_start(), Pulse(500));
        assert_eq!(list.list()[1].tick_end(), Pulse(599));
    }

    #[test]
    fn move_triggers_right_splits_the_straddling_trigger() {
        let mut list = TriggerList::new(192, Pulse(2000));
        list.add(Pulse(0), Pulse(200), Pulse(0), 0, false);
        list.move_triggers(Pulse(100), Pulse(50), Direction::Right);
        assert_eq!(list.count(), 2);
        assert_eq!(list.list()[0].tick_start(), Pulse(0));
        assert_eq!(list.list()[0].tick_end(), Pulse(99));
        assert_eq!(list.list()[1].tick_start(), Pulse(150));
        assert_eq!(list.list()[1].tick_end(), Pulse(249));
    }

    #[test]
    fn move_triggers_left_deletes_evacuated_and_shifts_remainder() {
        let mut list = TriggerList::new(192, Pulse(2000));
        list.add(Pulse(0), Pulse(100), Pulse(0), 0, false);
        list.add(Pulse(100), Pulse(100), Pulse(0), 0, false);
        list.add(Pulse(300), Pulse(100), Pulse(0), 0, false);
        list.move_triggers(Pulse(100), Pulse(100), Direction::Left);
        assert_eq!(list.count(), 2);
        assert_eq!(list.list()[0].tick_start(), Pulse(0));
        assert_eq!(list.list()[0].tick_end(), Pulse(99));
        assert_eq!(list.list()[1].tick_start(), Pulse(200));
        assert_eq!(list.list()[1].tick_end(), Pulse(299));
    }

    #[test]
    fn copy_triggers_duplicates_only_the_window() {
        let mut list = TriggerList::new(192, Pulse(2000));
        list.add(Pulse(0), Pulse(100), Pulse(0), 0, false);
        list.add(Pulse(100), Pulse(100), Pulse(0), 0, false);
        list.copy_triggers(Pulse(100), Pulse(100));
        assert_eq!(list.count(), 3);
        assert_eq!(list.list()[0].tick_start(), Pulse(0));
        assert_eq!(list.list()[1].tick_start(), Pulse(100));
        assert_eq!(list.list()[2].tick_start(), Pulse(200));
        assert_eq!(list.list()[2].tick_end(), Pulse(299));
    }
}
