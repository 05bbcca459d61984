// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

//! The event container for one pattern: an arena of [Event]s addressed by
//! stable [EventId]s, plus the bulk operations (link, quantize, tighten,
//! jitter, randomize, reverse, align, rescale, select, clip) that edit them.

use crate::event::{status, Event};
use crate::midibytes::{Channel, Data7, Pulse};
use crate::rng::Rng;
use crate::time::MidiTime;
use crate::uid::{EventId, UidFactory};
use std::collections::{HashMap, HashSet};

/// What a range-based selection call should do to the events it visits.
/// Plain variants, not a bitmask: a selection pass does exactly one of
/// these things per call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectAction {
    /// Marks every visited event selected.
    Selecting,
    /// Selects only the first unselected event visited, then stops.
    SelectOne,
    /// Counts currently-selected events in range without changing anything.
    Selected,
    /// Counts events that a [SelectAction::Selecting] pass would select,
    /// ignoring the status filter, without changing anything.
    WouldSelect,
    /// Clears the selected flag on every visited event.
    Deselect,
    /// Flips the selected flag on every visited event.
    Toggle,
    /// Removes every visited, currently-selected event from the list.
    Remove,
    /// Marks only note-on "onset" events selected.
    Onset,
    /// Counts note-on "onset" events in range without changing anything.
    IsOnset,
}

/// An event container for one pattern.
#[derive(Debug, Default)]
pub struct EventList {
    factory: UidFactory<EventId>,
    arena: HashMap<EventId, Event>,
    order: Vec<EventId>,
    dirty: bool,
    /// How far past an unmatched Note On to place a synthesized Note Off
    /// when [EventList::verify_and_link] runs out of list to search. Seq66
    /// calls this the zero-length correction; exposed as a field rather than
    /// a hardcoded constant so a caller can tune it per pattern resolution.
    pub zero_len_correction: Pulse,
}
impl EventList {
    pub fn new() -> Self {
        Self {
            zero_len_correction: Pulse(16),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Adds an event and returns the stable id by which it can be looked up
    /// even after a later [EventList::sort].
    pub fn insert(&mut self, event: Event) -> EventId {
        let id = self.factory.mint_next();
        self.arena.insert(id, event);
        self.order.push(id);
        self.dirty = true;
        id
    }

    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        self.order.retain(|&x| x != id);
        let removed = self.arena.remove(&id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn get(&self, id: EventId) -> Option<&Event> {
        self.arena.get(&id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.dirty = true;
        self.arena.get_mut(&id)
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.dirty = true;
    }

    /// Iterates events in ascending `(timestamp, rank)` order. Call
    /// [EventList::sort] first if events were mutated since the last sort.
    pub fn iter(&self) -> impl Iterator<Item = (EventId, &Event)> {
        self.order.iter().filter_map(|id| self.arena.get(id).map(|e| (*id, e)))
    }

    /// Re-sorts the iteration order by `(timestamp, rank)`. Note Offs sort
    /// before Note Ons at the same tick.
    pub fn sort(&mut self) {
        let arena = &self.arena;
        self.order.sort_by_key(|id| arena[id].sort_key());
    }

    fn link_pair(&mut self, a: EventId, b: EventId) {
        if let Some(ea) = self.arena.get_mut(&a) {
            ea.link_to(b);
        }
        if let Some(eb) = self.arena.get_mut(&b) {
            eb.link_to(a);
        }
    }

    /// For each unlinked Note On, scans forward to the first matching
    /// (same channel, same note) unlinked Note Off and links the pair. If
    /// the forward scan reaches the end of the list without a match, it
    /// continues from the beginning up to the Note On's own position: a
    /// Note Off found there is a wrapped pair. When `wrap` is true that
    /// wrapped pair is linked as-is; when `wrap` is false, the Note Off's
    /// timestamp is rewritten to `length - 1` before linking. A Note On
    /// that finds no match anywhere gets a synthesized Note Off at
    /// `on.timestamp + zero_len_correction`, clamped to stay inside
    /// `length`. Whenever a linked pair ends up sharing one timestamp, the
    /// Note Off is nudged forward by `zero_len_correction` so the note is
    /// audible.
    fn link_new(&mut self, wrap: bool, length: Pulse) {
        let order = self.order.clone();
        let n = order.len();
        let mut synthesized: Vec<(EventId, Event)> = Vec::new();

        for i in 0..n {
            let on_id = order[i];
            let (needs_link, on_channel, on_note, on_ts) = match self.arena.get(&on_id) {
                Some(e) => (e.is_linkable_on(), e.channel(), e.d0(), e.timestamp()),
                None => continue,
            };
            if !needs_link {
                continue;
            }

            let matches = |this: &Self, off_id: EventId| {
                this.arena.get(&off_id).is_some_and(|off| {
                    off.is_linkable_off() && off.channel() == on_channel && off.d0() == on_note
                })
            };

            let forward = (i + 1..n).map(|j| order[j]).find(|&off_id| matches(self, off_id));
            if let Some(off_id) = forward {
                self.link_pair(on_id, off_id);
                self.fix_zero_length_pair(on_id, off_id);
                continue;
            }

            let wrapped = (0..i).map(|j| order[j]).find(|&off_id| matches(self, off_id));
            if let Some(off_id) = wrapped {
                if !wrap {
                    if let Some(off) = self.arena.get_mut(&off_id) {
                        off.set_timestamp(Pulse(length.value() - 1));
                    }
                }
                self.link_pair(on_id, off_id);
                self.fix_zero_length_pair(on_id, off_id);
                continue;
            }

            let bound = if length.value() > 0 {
                length.value() - 1
            } else {
                on_ts.value() + self.zero_len_correction.value()
            };
            let corrected = Pulse(
                (on_ts.value() + self.zero_len_correction.value())
                    .min(bound)
                    .max(on_ts.value()),
            );
            let off = Event::new_channel_voice(
                corrected,
                status::NOTE_OFF,
                on_channel,
                on_note,
                Data7::new(0),
            );
            synthesized.push((on_id, off));
        }

        for (on_id, off) in synthesized {
            let off_id = self.insert(off);
            self.link_pair(on_id, off_id);
        }
    }

    fn fix_zero_length_pair(&mut self, on_id: EventId, off_id: EventId) {
        let same_tick = match (self.arena.get(&on_id), self.arena.get(&off_id)) {
            (Some(on), Some(off)) => on.timestamp() == off.timestamp(),
            _ => false,
        };
        if same_tick {
            if let Some(off) = self.arena.get_mut(&off_id) {
                let ts = off.timestamp();
                off.set_timestamp(Pulse(ts.value() + self.zero_len_correction.value()));
            }
        }
    }

    /// Removes every event whose timestamp is `> length` or `< 0`, along
    /// with its linked mate if it has one.
    fn prune_out_of_range(&mut self, length: Pulse) {
        let mut doomed: Vec<EventId> = Vec::new();
        for (&id, e) in self.arena.iter() {
            let ts = e.timestamp().value();
            if ts > length.value() || ts < 0 {
                doomed.push(id);
                if let Some(mate) = e.link() {
                    doomed.push(mate);
                }
            }
        }
        doomed.sort_unstable();
        doomed.dedup();
        for id in doomed {
            self.remove(id);
        }
    }

    /// Clears every existing link, sorts, runs [EventList::link_new], then
    /// (if `length > 0`) removes every event left outside `[0, length]`
    /// along with its linked mate.
    pub fn verify_and_link(&mut self, length: Pulse, wrap: bool) {
        for id in self.order.clone() {
            if let Some(e) = self.arena.get_mut(&id) {
                e.clear_link();
            }
        }
        self.sort();
        self.link_new(wrap, length);
        if length.value() > 0 {
            self.prune_out_of_range(length);
        }
        self.sort();
    }

    /// Shortens a linked Note On to end at `limit - 1` if its Note Off is
    /// past `limit`. Returns the number of Note Offs moved.
    pub fn remove_trailing_events(&mut self, limit: Pulse) -> usize {
        let ids: Vec<EventId> = self.order.clone();
        let mut changed = 0;
        for id in ids {
            let Some(on) = self.arena.get(&id) else { continue };
            if !on.is_note_on() {
                continue;
            }
            let Some(off_id) = on.link() else { continue };
            let past = self
                .arena
                .get(&off_id)
                .map(|off| off.timestamp().value() > limit.value())
                .unwrap_or(false);
            if past {
                if let Some(off) = self.arena.get_mut(&off_id) {
                    off.set_timestamp(Pulse(limit.value() - 1));
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.dirty = true;
            self.sort();
        }
        changed
    }

    fn for_each_event_mut(
        &mut self,
        selected_only: bool,
        mut f: impl FnMut(&mut Event) -> bool,
    ) -> usize {
        let mut changed = 0;
        for e in self.arena.values_mut() {
            if selected_only && !e.flags().selected {
                continue;
            }
            if f(e) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.dirty = true;
        }
        changed
    }

    /// Quantizes or tightens every (or every selected, optionally
    /// status-filtered) event's timestamp. A linked Note On/Note Off pair
    /// moves in lock-step, carried by the Note On's own delta, unless that
    /// would collapse or invert the pair; in that case the Note Off instead
    /// lands at `snap / 2` past the Note On's new timestamp. Returns the
    /// number of events moved.
    fn quantize_or_tighten(
        &mut self,
        snap: Pulse,
        length: Pulse,
        selected_only: bool,
        status_filter: Option<u8>,
        tighten: bool,
    ) -> usize {
        let ids = self.order.clone();
        let mut handled_offs: HashSet<EventId> = HashSet::new();
        let mut changed = 0;

        for id in ids {
            if handled_offs.contains(&id) {
                continue;
            }
            let passes = match self.arena.get(&id) {
                Some(e) => {
                    (!selected_only || e.flags().selected)
                        && status_filter.map(|s| e.match_status(s)).unwrap_or(true)
                }
                None => continue,
            };
            if !passes {
                continue;
            }

            let (is_note_on, off_id, old_ts) = {
                let e = &self.arena[&id];
                (e.is_note_on(), e.link(), e.timestamp())
            };

            let moved = match self.arena.get_mut(&id) {
                Some(e) => {
                    if tighten {
                        e.tighten(snap, length)
                    } else {
                        e.quantize(snap, length)
                    }
                }
                None => false,
            };
            if moved {
                changed += 1;
            }

            if is_note_on {
                if let Some(off_id) = off_id {
                    let new_on_ts = self.arena[&id].timestamp();
                    let delta = new_on_ts.value() - old_ts.value();
                    if let Some(off_old_ts) = self.arena.get(&off_id).map(|o| o.timestamp()) {
                        let mut new_off_ts = off_old_ts.value() + delta;
                        if new_off_ts <= new_on_ts.value() {
                            new_off_ts = new_on_ts.value() + (snap.value() / 2).max(1);
                        }
                        let clamped = if length.value() > 0 {
                            new_off_ts.clamp(0, length.value() - 1)
                        } else {
                            new_off_ts
                        };
                        if let Some(off) = self.arena.get_mut(&off_id) {
                            if off.timestamp().value() != clamped {
                                off.set_timestamp(Pulse(clamped));
                                changed += 1;
                            }
                        }
                    }
                    handled_offs.insert(off_id);
                }
            }
        }

        if changed > 0 {
            self.dirty = true;
        }
        self.sort();
        changed
    }

    /// Fully snaps every (or every selected, optionally status-filtered)
    /// event's timestamp to the nearest multiple of `snap`. Returns the
    /// number of events moved.
    pub fn quantize_events(
        &mut self,
        snap: Pulse,
        length: Pulse,
        selected_only: bool,
        status_filter: Option<u8>,
    ) -> usize {
        self.quantize_or_tighten(snap, length, selected_only, status_filter, false)
    }

    /// Moves every (or every selected, optionally status-filtered) event's
    /// timestamp halfway toward the nearest multiple of `snap`. Returns the
    /// number of events moved.
    pub fn tighten_events(
        &mut self,
        snap: Pulse,
        length: Pulse,
        selected_only: bool,
        status_filter: Option<u8>,
    ) -> usize {
        self.quantize_or_tighten(snap, length, selected_only, status_filter, true)
    }

    /// Nudges every (or every selected) event's timestamp by a uniform
    /// random offset in `[-range, range]`, clamped into `[0, length - 1]`.
    pub fn jitter_events(
        &mut self,
        range: i64,
        length: Pulse,
        selected_only: bool,
        rng: &mut Rng,
    ) -> usize {
        let changed = self.for_each_event_mut(selected_only, |e| {
            if range <= 0 {
                return false;
            }
            let delta = rng.rand_symmetric(range);
            let new_ts = e.timestamp().value() + delta;
            let clamped = if length.value() > 0 {
                new_ts.clamp(0, length.value() - 1)
            } else {
                new_ts.max(0)
            };
            if clamped == e.timestamp().value() {
                false
            } else {
                e.set_timestamp(Pulse(clamped));
                true
            }
        });
        self.sort();
        changed
    }

    /// Nudges the velocity of every selected event by a uniform random
    /// offset in `[-range, range]`, clamped to 7 bits.
    pub fn randomize_selected_velocity(&mut self, range: i64, rng: &mut Rng) -> usize {
        self.for_each_event_mut(true, |e| e.randomize_velocity(range, rng))
    }

    /// Nudges the pitch of every selected note by a uniform random offset in
    /// `[-range, range]`. If `fit` is supplied, the resulting pitch is
    /// snapped through it (normally a scale membership lookup) after the
    /// random walk.
    pub fn randomize_selected_notes(
        &mut self,
        range: i64,
        rng: &mut Rng,
        fit: Option<&dyn Fn(u8) -> u8>,
    ) -> usize {
        self.for_each_event_mut(true, |e| {
            let moved = e.randomize_pitch(range, rng);
            if moved {
                if let Some(fit) = fit {
                    let fitted = fit(e.d0().value());
                    e.set_d0(Data7::new(fitted));
                }
            }
            moved
        })
    }

    /// Reverses a pattern in time. Note On/Note Off roles swap so the
    /// reversed pattern still plays as note spans rather than silence, and
    /// the list is re-linked afterward.
    ///
    /// When `in_place` is `true`, every timestamp mirrors around the
    /// list's own `[min_ts, max_ts]` span, so the events stay within the
    /// range they already occupied: calling `reverse_events(true)` twice in
    /// a row restores the original list. When `false`, timestamps mirror
    /// around the full `[0, length - 1]` pattern span instead.
    pub fn reverse_events(&mut self, length: Pulse, in_place: bool) {
        let (lo, hi) = if in_place {
            let min_ts = self.arena.values().map(|e| e.timestamp().value()).min();
            let max_ts = self.arena.values().map(|e| e.timestamp().value()).max();
            match (min_ts, max_ts) {
                (Some(min_ts), Some(max_ts)) => (min_ts, max_ts),
                _ => return,
            }
        } else {
            if length.value() <= 0 {
                return;
            }
            (0, length.value() - 1)
        };

        for e in self.arena.values_mut() {
            let new_ts = Pulse(lo + hi - e.timestamp().value());
            e.set_timestamp(new_ts);
            if e.is_note_on() {
                let channel = e.channel();
                let note = e.d0();
                e.set_channel_status(status::NOTE_OFF, channel);
                e.set_d0(note);
                e.set_d1(Data7::new(0));
            } else if e.is_note_off() {
                let channel = e.channel();
                let note = e.d0();
                e.set_channel_status(status::NOTE_ON, channel);
                e.set_d0(note);
                e.set_d1(Data7::new(100));
            }
        }
        let relink_length = if in_place { Pulse(0) } else { length };
        self.verify_and_link(relink_length, true);
    }

    /// Shifts every event so the earliest timestamp becomes `0`, preserving
    /// relative spacing.
    pub fn align_left(&mut self) {
        let Some(min_ts) = self.arena.values().map(|e| e.timestamp().value()).min() else {
            return;
        };
        if min_ts == 0 {
            return;
        }
        for e in self.arena.values_mut() {
            e.set_timestamp(Pulse(e.timestamp().value() - min_ts));
        }
        self.dirty = true;
        self.sort();
    }

    /// Shifts every event so the latest timestamp becomes `length - 1`,
    /// preserving relative spacing.
    pub fn align_right(&mut self, length: Pulse) {
        let Some(max_ts) = self.arena.values().map(|e| e.timestamp().value()).max() else {
            return;
        };
        let target = length.value() - 1;
        let offset = target - max_ts;
        if offset == 0 {
            return;
        }
        for e in self.arena.values_mut() {
            e.set_timestamp(Pulse(e.timestamp().value() + offset));
        }
        self.dirty = true;
        self.sort();
    }

    /// Rescales every timestamp for a PPQN change, preserving musical
    /// position.
    pub fn rescale(&mut self, new_ppqn: u32, old_ppqn: u32) {
        for e in self.arena.values_mut() {
            let rescaled = MidiTime::rescale_tick(e.timestamp(), new_ppqn, old_ppqn);
            e.set_timestamp(rescaled);
        }
        self.dirty = true;
        self.sort();
    }

    /// Proportionally stretches every selected event's timestamp from the
    /// `old_length` timeline onto the `new_length` one.
    pub fn stretch_selected(&mut self, old_length: Pulse, new_length: Pulse) -> usize {
        if old_length.value() <= 0 {
            return 0;
        }
        let changed = self.for_each_event_mut(true, |e| {
            let scaled = (e.timestamp().value() as i128 * new_length.value() as i128
                / old_length.value() as i128) as i64;
            if scaled == e.timestamp().value() {
                false
            } else {
                e.set_timestamp(Pulse(scaled));
                true
            }
        });
        self.sort();
        changed
    }

    /// Nudges a zero-length linked note (on and off at the same tick)
    /// forward by `correction` so it is audible. Returns the number of
    /// pairs fixed.
    pub fn fix_zero_length_notes(&mut self, correction: Pulse) -> usize {
        let ids: Vec<EventId> = self.order.clone();
        let mut fixed = 0;
        for id in ids {
            let Some(on) = self.arena.get(&id) else { continue };
            if !on.is_note_on() {
                continue;
            }
            let Some(off_id) = on.link() else { continue };
            let on_ts = on.timestamp();
            let same_tick = self
                .arena
                .get(&off_id)
                .map(|off| off.timestamp() == on_ts)
                .unwrap_or(false);
            if same_tick {
                if let Some(off) = self.arena.get_mut(&off_id) {
                    off.set_timestamp(Pulse(on_ts.value() + correction.value()));
                    fixed += 1;
                }
            }
        }
        if fixed > 0 {
            self.sort();
        }
        fixed
    }

    /// Visits every event with a timestamp in `[start, end)`, optionally
    /// filtered to a specific raw status, and applies `action`. Returns the
    /// number of events the action counted or touched.
    pub fn select_events(
        &mut self,
        start: Pulse,
        end: Pulse,
        status_filter: Option<u8>,
        action: SelectAction,
    ) -> usize {
        let in_range = |ts: Pulse| ts.value() >= start.value() && ts.value() < end.value();
        let passes_filter = |e: &Event| {
            status_filter.map(|s| e.match_status(s)).unwrap_or(true)
        };

        let mut ids: Vec<EventId> = self
            .order
            .iter()
            .copied()
            .filter(|id| self.arena.get(id).map(|e| in_range(e.timestamp())).unwrap_or(false))
            .collect();

        let mut count = 0;
        let mut to_remove = Vec::new();
        match action {
            SelectAction::Selecting => {
                for id in ids.drain(..) {
                    if passes_filter(&self.arena[&id]) {
                        self.arena.get_mut(&id).unwrap().flags_mut().selected = true;
                        count += 1;
                    }
                }
            }
            SelectAction::SelectOne => {
                for id in ids {
                    let e = &self.arena[&id];
                    if passes_filter(e) && !e.flags().selected {
                        self.arena.get_mut(&id).unwrap().flags_mut().selected = true;
                        count = 1;
                        break;
                    }
                }
            }
            SelectAction::Selected => {
                for id in ids {
                    let e = &self.arena[&id];
                    if passes_filter(e) && e.flags().selected {
                        count += 1;
                    }
                }
            }
            SelectAction::WouldSelect => {
                count = ids.len();
            }
            SelectAction::Deselect => {
                for id in ids {
                    if passes_filter(&self.arena[&id]) {
                        self.arena.get_mut(&id).unwrap().flags_mut().selected = false;
                        count += 1;
                    }
                }
            }
            SelectAction::Toggle => {
                for id in ids {
                    if passes_filter(&self.arena[&id]) {
                        let e = self.arena.get_mut(&id).unwrap();
                        e.flags_mut().selected = !e.flags().selected;
                        count += 1;
                    }
                }
            }
            SelectAction::Remove => {
                for id in ids {
                    let e = &self.arena[&id];
                    if passes_filter(e) && e.flags().selected {
                        to_remove.push(id);
                        count += 1;
                    }
                }
            }
            SelectAction::Onset => {
                for id in ids {
                    let e = &self.arena[&id];
                    if e.is_note_on() && passes_filter(e) {
                        self.arena.get_mut(&id).unwrap().flags_mut().selected = true;
                        count += 1;
                    }
                }
            }
            SelectAction::IsOnset => {
                for id in ids {
                    let e = &self.arena[&id];
                    if e.is_note_on() && passes_filter(e) {
                        count += 1;
                    }
                }
            }
        }
        for id in to_remove {
            self.remove(id);
        }
        if count > 0 {
            self.dirty = true;
        }
        count
    }

    /// Clones every selected event, with timestamps normalized so the
    /// earliest selected event lands at `0`. Used as clipboard contents.
    pub fn copy_selected(&self) -> Vec<Event> {
        let mut selected: Vec<&Event> =
            self.arena.values().filter(|e| e.flags().selected).collect();
        selected.sort_by_key(|e| e.sort_key());
        let Some(base) = selected.first().map(|e| e.timestamp().value()) else {
            return Vec::new();
        };
        selected
            .into_iter()
            .map(|e| {
                let mut clone = e.clone();
                clone.set_timestamp(Pulse(e.timestamp().value() - base));
                clone.clear_link();
                clone.flags_mut().selected = true;
                clone
            })
            .collect()
    }

    /// Inserts clipboard contents at `at`, offsetting every clipboard event's
    /// (clipboard-relative) timestamp by `at`. Returns the inserted ids.
    pub fn paste(&mut self, clipboard: &[Event], at: Pulse) -> Vec<EventId> {
        let mut ids = Vec::with_capacity(clipboard.len());
        for e in clipboard {
            let mut clone = e.clone();
            clone.set_timestamp(Pulse(e.timestamp().value() + at.value()));
            ids.push(self.insert(clone));
        }
        self.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(ts: i64, note: u8) -> Event {
        Event::new_channel_voice(
            Pulse(ts),
            status::NOTE_ON,
            Channel::new(0),
            Data7::new(note),
            Data7::new(100),
        )
    }

    fn note_off(ts: i64, note: u8) -> Event {
        Event::new_channel_voice(
            Pulse(ts),
            status::NOTE_OFF,
            Channel::new(0),
            Data7::new(note),
            Data7::new(0),
        )
    }

    #[test]
    fn verify_and_link_pairs_matching_notes() {
        let mut list = EventList::new();
        let on = list.insert(note_on(10, 60));
        let off = list.insert(note_off(50, 60));
        list.verify_and_link(Pulse(192), true);
        assert_eq!(list.get(on).unwrap().link(), Some(off));
        assert_eq!(list.get(off).unwrap().link(), Some(on));
    }

    #[test]
    fn verify_and_link_synthesizes_missing_note_off() {
        let mut list = EventList::new();
        let on = list.insert(note_on(10, 60));
        list.verify_and_link(Pulse(192), true);
        let linked_off = list.get(on).unwrap().link().unwrap();
        let off = list.get(linked_off).unwrap();
        assert!(off.is_note_off());
        assert_eq!(off.timestamp(), Pulse(26));
    }

    #[test]
    fn verify_and_link_wraps_around_the_list() {
        let mut list = EventList::new();
        // Off appears earlier in the list than its matching on, so linking
        // must wrap around past the end to find it.
        let off = list.insert(note_off(5, 60));
        let on = list.insert(note_on(100, 60));
        list.verify_and_link(Pulse(192), true);
        assert_eq!(list.get(on).unwrap().link(), Some(off));
    }

    #[test]
    fn verify_and_link_wrap_false_rewrites_wrapped_note_off() {
        let mut list = EventList::new();
        let on = list.insert(note_on(180, 60));
        let off = list.insert(note_off(10, 60));
        list.verify_and_link(Pulse(192), false);
        assert_eq!(list.get(on).unwrap().link(), Some(off));
        assert_eq!(list.get(off).unwrap().timestamp(), Pulse(191));
    }

    #[test]
    fn verify_and_link_prunes_events_out_of_range() {
        let mut list = EventList::new();
        list.insert(note_on(10, 60));
        list.insert(note_off(300, 60));
        list.verify_and_link(Pulse(192), true);
        // The out-of-range Note Off is pruned along with its linked Note On.
        assert!(list.is_empty());
    }

    #[test]
    fn remove_trailing_events_shortens_note_off_past_limit() {
        let mut list = EventList::new();
        let on = list.insert(note_on(10, 60));
        list.insert(note_off(300, 60));
        list.verify_and_link(Pulse(0), true);
        let changed = list.remove_trailing_events(Pulse(192));
        assert_eq!(changed, 1);
        let off_id = list.get(on).unwrap().link().unwrap();
        assert_eq!(list.get(off_id).unwrap().timestamp(), Pulse(191));
    }

    #[test]
    fn quantize_events_moves_everything_when_not_restricted_to_selection() {
        let mut list = EventList::new();
        list.insert(note_on(5, 60));
        let moved = list.quantize_events(Pulse(48), Pulse(0), false, None);
        assert_eq!(moved, 1);
    }

    #[test]
    fn quantize_events_moves_a_linked_pair_in_lock_step() {
        let mut list = EventList::new();
        let on = list.insert(note_on(5, 60));
        let off = list.insert(note_off(53, 60));
        list.verify_and_link(Pulse(192), true);
        list.quantize_events(Pulse(48), Pulse(192), false, None);
        // The on snaps from 5 to 0, a delta of -5; the off carries the same
        // delta rather than snapping to its own nearest grid line.
        assert_eq!(list.get(on).unwrap().timestamp(), Pulse(0));
        assert_eq!(list.get(off).unwrap().timestamp(), Pulse(48));
    }

    #[test]
    fn quantize_events_pushes_a_collapsing_wrapped_note_off_forward() {
        let mut list = EventList::new();
        // A note that wraps the loop seam: its off sits numerically behind
        // its on. Shifting it by the on's own delta would leave it behind
        // (or on top of) the on, so the guard pushes it to on + snap/2.
        let off = list.insert(note_off(5, 60));
        let on = list.insert(note_on(15, 60));
        list.verify_and_link(Pulse(1000), true);
        list.quantize_events(Pulse(16), Pulse(1000), false, None);
        assert_eq!(list.get(on).unwrap().timestamp(), Pulse(16));
        assert_eq!(list.get(off).unwrap().timestamp(), Pulse(24));
    }

    #[test]
    fn quantize_events_respects_status_filter() {
        let mut list = EventList::new();
        let on = list.insert(note_on(5, 60));
        list.quantize_events(Pulse(48), Pulse(0), false, Some(status::NOTE_OFF));
        // Only Note Off events match the filter, so this Note On is untouched.
        assert_eq!(list.get(on).unwrap().timestamp(), Pulse(5));
    }

    #[test]
    fn select_events_in_range_then_remove() {
        let mut list = EventList::new();
        list.insert(note_on(10, 60));
        list.insert(note_on(500, 61));
        let selected = list.select_events(Pulse(0), Pulse(100), None, SelectAction::Selecting);
        assert_eq!(selected, 1);
        let removed = list.select_events(Pulse(0), Pulse(100), None, SelectAction::Remove);
        assert_eq!(removed, 1);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn copy_paste_round_trip_normalizes_and_offsets() {
        let mut list = EventList::new();
        let id = list.insert(note_on(200, 64));
        list.get_mut(id).unwrap().flags_mut().selected = true;
        let clip = list.copy_selected();
        assert_eq!(clip[0].timestamp(), Pulse(0));
        let pasted = list.paste(&clip, Pulse(50));
        assert_eq!(list.get(pasted[0]).unwrap().timestamp(), Pulse(50));
    }

    #[test]
    fn align_left_shifts_earliest_event_to_zero() {
        let mut list = EventList::new();
        list.insert(note_on(30, 60));
        list.insert(note_on(60, 61));
        list.align_left();
        let min = list.iter().map(|(_, e)| e.timestamp().value()).min().unwrap();
        assert_eq!(min, 0);
    }
}
