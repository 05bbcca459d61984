// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

use vampseq::event::status;
use vampseq::prelude::*;

#[test]
fn reverse_events_full_mode_mirrors_around_the_whole_pattern() {
    let mut list = EventList::new();
    let on = list.insert(Event::new_channel_voice(
        Pulse(10),
        status::NOTE_ON,
        Channel::new(0),
        Data7::new(60),
        Data7::new(100),
    ));
    list.insert(Event::new_channel_voice(
        Pulse(40),
        status::NOTE_OFF,
        Channel::new(0),
        Data7::new(60),
        Data7::new(0),
    ));
    list.verify_and_link(Pulse(100), true);
    list.reverse_events(Pulse(100), false);
    // The event that was a Note On at 10 is now a Note Off at 99 - 10 = 89.
    assert!(list.get(on).unwrap().is_note_off());
    assert_eq!(list.get(on).unwrap().timestamp(), Pulse(89));
}

#[test]
fn reverse_events_in_place_is_its_own_inverse() {
    let mut list = EventList::new();
    list.insert(Event::new_channel_voice(
        Pulse(10),
        status::NOTE_ON,
        Channel::new(0),
        Data7::new(60),
        Data7::new(100),
    ));
    list.insert(Event::new_channel_voice(
        Pulse(40),
        status::NOTE_OFF,
        Channel::new(0),
        Data7::new(60),
        Data7::new(0),
    ));
    list.verify_and_link(Pulse(0), true);

    let before: Vec<(i64, u8)> = list
        .iter()
        .map(|(_, e)| (e.timestamp().value(), e.raw_status()))
        .collect();

    list.reverse_events(Pulse(0), true);
    list.reverse_events(Pulse(0), true);

    let after: Vec<(i64, u8)> = list
        .iter()
        .map(|(_, e)| (e.timestamp().value(), e.raw_status()))
        .collect();
    assert_eq!(before, after);
}
