// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

use vampseq::prelude::*;
use vampseq::trigger::SplitPoint;

#[test]
fn split_at_middle_makes_two_equal_halves() {
    let mut list = TriggerList::new(192, Pulse(1000));
    list.add(Pulse(0), Pulse(1000), Pulse(0), 0, false);
    assert!(list.split(Pulse(500), SplitPoint::Middle));
    assert_eq!(list.count(), 2);
    assert_eq!(list.list()[0].tick_start(), Pulse(0));
    assert_eq!(list.list()[0].tick_end(), Pulse(499));
    assert_eq!(list.list()[1].tick_start(), Pulse(500));
    assert_eq!(list.list()[1].tick_end(), Pulse(999));
}

#[test]
fn paste_chain_lays_down_three_adjacent_copies() {
    let mut list = TriggerList::new(192, Pulse(400));
    list.add(Pulse(100), Pulse(100), Pulse(0), 0, false);
    list.select(Pulse(100));
    list.copy_selected();

    list.paste(Some(Pulse(200)));
    assert_eq!(list.count(), 2);
    assert_eq!(list.list()[1].tick_start(), Pulse(200));
    assert_eq!(list.list()[1].tick_end(), Pulse(299));

    // A chained paste with no explicit tick continues right after the
    // previous paste, not at the clipboard's own original position.
    list.paste(None);
    assert_eq!(list.count(), 3);
    assert_eq!(list.list()[2].tick_start(), Pulse(300));
    assert_eq!(list.list()[2].tick_end(), Pulse(399));

    list.paste(Some(Pulse(50)));
    assert_eq!(list.count(), 4);
    assert_eq!(list.list()[0].tick_start(), Pulse(50));
    assert_eq!(list.list()[0].tick_end(), Pulse(149));
}
