use proptest::prelude::*;
use sline::{Codepoint, History, LineBuffer};

/// Apply a sequence of cursor moves to get an arbitrary cursor position.
fn buffer_with_cursor(text: &str, lefts: usize) -> LineBuffer {
    let mut b = LineBuffer::new(256);
    for ch in text.chars() {
        b.insert(Codepoint::from_char(ch));
    }
    for _ in 0..lefts {
        b.move_left();
    }
    b
}

proptest! {
    /// Typing a string one codepoint at a time reproduces it exactly.
    #[test]
    fn typing_round_trips(s in "\\PC{0,40}") {
        let b = buffer_with_cursor(&s, 0);
        prop_assert_eq!(b.as_str(), s.as_str());
        prop_assert_eq!(b.cursor(), s.chars().count());
        prop_assert_eq!(b.byte_cursor(), s.len());
    }
}

proptest! {
    /// insert then backspace restores content and both cursors.
    #[test]
    fn insert_then_backspace_is_identity(
        s in "\\PC{0,40}",
        lefts in 0usize..50,
        ch in any::<char>(),
    ) {
        let mut b = buffer_with_cursor(&s, lefts);
        let before = (b.as_str().to_owned(), b.byte_cursor(), b.cursor());

        prop_assume!(b.insert(Codepoint::from_char(ch)).is_some());
        b.delete_backward();

        prop_assert_eq!((b.as_str().to_owned(), b.byte_cursor(), b.cursor()), before);
    }
}

proptest! {
    /// A codepoint of width w moves the byte cursor by exactly w, and
    /// backspace removes exactly w bytes.
    #[test]
    fn utf8_boundary_safety(s in "\\PC{0,20}", lefts in 0usize..30, ch in any::<char>()) {
        let mut b = buffer_with_cursor(&s, lefts);
        let (len, at) = (b.len(), b.byte_cursor());
        let w = ch.len_utf8();

        prop_assume!(b.insert(Codepoint::from_char(ch)).is_some());
        prop_assert_eq!(b.byte_cursor(), at + w);
        prop_assert_eq!(b.len(), len + w);

        b.delete_backward();
        prop_assert_eq!(b.len(), len);
        prop_assert_eq!(b.byte_cursor(), at);
    }
}

proptest! {
    /// Cursor pair stays consistent through arbitrary moves and edits.
    #[test]
    fn cursor_pair_invariant(s in "\\PC{0,30}", ops in prop::collection::vec(0u8..6, 0..40)) {
        let mut b = buffer_with_cursor(&s, 0);
        for op in ops {
            match op {
                0 => { b.move_left(); }
                1 => { b.move_right(); }
                2 => { b.move_home(); }
                3 => { b.move_end(); }
                4 => { b.delete_backward(); }
                _ => { b.delete_forward(); }
            }
            let left = std::str::from_utf8(b.before_cursor());
            prop_assert!(left.is_ok());
            prop_assert_eq!(left.unwrap().chars().count(), b.cursor());
            prop_assert!(b.len() < b.capacity());
        }
    }
}

proptest! {
    /// Committing more than N non-empty lines keeps exactly the N newest,
    /// oldest first.
    #[test]
    fn history_keeps_newest(capacity in 1usize..12, count in 0usize..40) {
        let mut h = History::new(capacity, 32).unwrap();
        let lines: Vec<String> = (0..count).map(|i| format!("cmd{i}")).collect();
        for line in &lines {
            h.commit(line);
        }
        let kept: Vec<&str> = h.iter().collect();
        let start = count.saturating_sub(capacity);
        let expected: Vec<&str> = lines[start..].iter().map(String::as_str).collect();
        prop_assert!(h.len() <= capacity);
        prop_assert_eq!(kept, expected);
    }
}

proptest! {
    /// Navigation never leaves [0, top].
    #[test]
    fn navigation_is_clamped(
        count in 0usize..8,
        moves in prop::collection::vec(any::<bool>(), 0..30),
    ) {
        let mut h = History::new(5, 16).unwrap();
        for i in 0..count {
            h.commit(&format!("l{i}"));
        }
        for up in moves {
            if up {
                h.navigate_up();
            } else {
                h.navigate_down();
            }
            prop_assert!(h.browse() <= h.top());
        }
    }
}
