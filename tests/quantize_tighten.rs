// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

use vampseq::event::status;
use vampseq::prelude::*;

#[test]
fn tighten_moves_halfway_toward_the_snap_grid() {
    // ppqn=192, snap=48, a note authored 5 ticks after 0.
    let mut list = EventList::new();
    let on = list.insert(Event::new_channel_voice(
        Pulse(5),
        status::NOTE_ON,
        Channel::new(0),
        Data7::new(60),
        Data7::new(100),
    ));
    list.tighten_events(Pulse(48), Pulse(768), false, None);
    assert_eq!(list.get(on).unwrap().timestamp(), Pulse(3));
}

#[test]
fn quantize_snaps_fully_to_the_grid() {
    let mut list = EventList::new();
    let on = list.insert(Event::new_channel_voice(
        Pulse(5),
        status::NOTE_ON,
        Channel::new(0),
        Data7::new(60),
        Data7::new(100),
    ));
    list.quantize_events(Pulse(48), Pulse(768), false, None);
    assert_eq!(list.get(on).unwrap().timestamp(), Pulse(0));
}

#[test]
fn quantize_carries_a_linked_note_off_by_the_same_delta() {
    let mut list = EventList::new();
    let on = list.insert(Event::new_channel_voice(
        Pulse(5),
        status::NOTE_ON,
        Channel::new(0),
        Data7::new(60),
        Data7::new(100),
    ));
    let off = list.insert(Event::new_channel_voice(
        Pulse(53),
        status::NOTE_OFF,
        Channel::new(0),
        Data7::new(60),
        Data7::new(0),
    ));
    list.verify_and_link(Pulse(768), true);
    list.quantize_events(Pulse(48), Pulse(768), false, None);
    // on snaps from 5 to 0, a delta of -5; off carries the same delta
    // instead of independently snapping to its own nearest grid line.
    assert_eq!(list.get(on).unwrap().timestamp(), Pulse(0));
    assert_eq!(list.get(off).unwrap().timestamp(), Pulse(48));
}
