// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

use vampseq::prelude::*;
use vampseq::event::status;

fn note_on(ts: i64, note: u8) -> Event {
    Event::new_channel_voice(Pulse(ts), status::NOTE_ON, Channel::new(0), Data7::new(note), Data7::new(100))
}

fn note_off(ts: i64, note: u8) -> Event {
    Event::new_channel_voice(Pulse(ts), status::NOTE_OFF, Channel::new(0), Data7::new(note), Data7::new(0))
}

#[test]
fn verify_and_link_pairs_a_simple_note() {
    let mut list = EventList::new();
    let on = list.insert(note_on(0, 60));
    let off = list.insert(note_off(96, 60));
    list.verify_and_link(Pulse(192), false);
    assert_eq!(list.get(on).unwrap().link(), Some(off));
    assert_eq!(list.get(off).unwrap().link(), Some(on));
    assert_eq!(list.len(), 2);
}

#[test]
fn wrapped_note_links_directly_when_wrap_is_true() {
    let mut list = EventList::new();
    let on = list.insert(note_on(180, 60));
    let off = list.insert(note_off(10, 60));
    list.verify_and_link(Pulse(192), true);
    assert_eq!(list.get(on).unwrap().link(), Some(off));
    // wrap=true keeps the Note Off's timestamp as authored.
    assert_eq!(list.get(off).unwrap().timestamp(), Pulse(10));
}

#[test]
fn wrapped_note_off_is_rewritten_to_length_minus_one_when_wrap_is_false() {
    let mut list = EventList::new();
    let on = list.insert(note_on(180, 60));
    let off = list.insert(note_off(10, 60));
    list.verify_and_link(Pulse(192), false);
    assert_eq!(list.get(on).unwrap().link(), Some(off));
    assert_eq!(list.get(off).unwrap().timestamp(), Pulse(191));
}
