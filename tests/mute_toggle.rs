// Copyright (c) 2024 Sequencer Core Contributors. Licensed under GPL-3.0-or-later.

use vampseq::prelude::*;

#[test]
fn toggling_a_second_group_then_back_alternates_play_screen_state() {
    let mut mutes = MuteGroups::new(4, 8);
    // g0 arms patterns 0 and 1; g1 arms pattern 2.
    mutes.get_or_create(GroupNumber(0)).set_bits(&[true, true, false]);
    mutes.get_or_create(GroupNumber(1)).set_bits(&[false, false, true]);
    let mut bits = vec![false; 32];

    assert!(mutes.apply(GroupNumber(0), &mut bits));
    assert_eq!(&bits[..3], &[true, true, false]);
    assert_eq!(mutes.group_selected(), GroupNumber(0));

    assert!(mutes.toggle(GroupNumber(1), &mut bits));
    assert_eq!(&bits[..3], &[false, false, true]);
    assert_eq!(mutes.group_selected(), GroupNumber(1));

    // Toggling the same group again disarms it.
    assert!(!mutes.toggle(GroupNumber(1), &mut bits));
    assert_eq!(&bits[..3], &[false, false, false]);
    assert!(!mutes.group_state());
}
