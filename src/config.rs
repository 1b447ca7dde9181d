//! Compile-time configuration. There is no runtime config file: every
//! binding and rule here is a `const`/`static` table, following
//! SPEC_FULL.md §4.11 — rebuilding is the mechanism for changing a binding,
//! same as dwm's `config.h`.
use x11::keysym::*;
use x11::xlib::{Mod1Mask, Mod4Mask, ShiftMask};

use crate::commands::*;
use crate::input::{Arg, Button, Click, Key};
use crate::rules::Rule;

/// Ordered tag labels. The bit position is the tag index; `TAGS.len()`
/// must not exceed 31 so tagmask fits comfortably in a `u32`.
pub const TAGS: &[&str] = &["1", "2", "3", "4", "5", "6", "7", "8", "9"];

const _: () = assert!(TAGS.len() <= 31, "too many tags for a u32 tagmask");

pub const MFACT: f32 = 0.55;
pub const NMASTER: i32 = 1;
pub const GAPPX: i32 = 10;
pub const BORDERPX: i32 = 1;
pub const SNAP: i32 = 32;
pub const RESIZE_HINTS: bool = true;

/// Class name of the external status bar this manager reserves top-strip
/// space for and maps directly rather than tiling, SPEC_FULL.md §4.2.
pub const ALTBAR_CLASS: &str = "Polybar";

const MODKEY: u32 = Mod4Mask;
const COMBOKEY: u32 = Mod1Mask;

const fn tag_bit(i: usize) -> u32 {
    1 << i
}

macro_rules! tagkeys {
    ($keysym:expr, $i:expr) => {
        Key { modmask: MODKEY, keysym: $keysym, func: view, arg: Arg::UInt(tag_bit($i)) }
    };
}

pub const RULES: &[Rule] = &[
    Rule {
        class: Some("Gimp"),
        instance: None,
        title: None,
        tags: 0,
        isfloating: true,
        monitor: -1,
    },
    Rule {
        class: Some("Firefox"),
        instance: None,
        title: None,
        tags: 1 << 8,
        isfloating: false,
        monitor: -1,
    },
];

pub const KEYS: &[Key] = &[
    Key { modmask: MODKEY, keysym: XK_p, func: spawn, arg: Arg::Strs(&["dmenu_run"]) },
    Key {
        modmask: MODKEY | ShiftMask,
        keysym: XK_Return,
        func: spawn,
        arg: Arg::Strs(&["xterm"]),
    },
    Key { modmask: MODKEY, keysym: XK_b, func: togglefloating, arg: Arg::None },
    Key { modmask: MODKEY, keysym: XK_j, func: focusstack, arg: Arg::Int(1) },
    Key { modmask: MODKEY, keysym: XK_k, func: focusstack, arg: Arg::Int(-1) },
    Key { modmask: MODKEY, keysym: XK_i, func: incnmaster, arg: Arg::Int(1) },
    Key { modmask: MODKEY, keysym: XK_d, func: incnmaster, arg: Arg::Int(-1) },
    Key { modmask: MODKEY, keysym: XK_h, func: setmfact, arg: Arg::Float(-0.05) },
    Key { modmask: MODKEY, keysym: XK_l, func: setmfact, arg: Arg::Float(0.05) },
    Key { modmask: MODKEY, keysym: XK_Return, func: zoom, arg: Arg::None },
    Key { modmask: MODKEY, keysym: XK_Tab, func: view, arg: Arg::UInt(0) },
    Key {
        modmask: MODKEY | ShiftMask,
        keysym: XK_c,
        func: killclient,
        arg: Arg::None,
    },
    Key { modmask: MODKEY, keysym: XK_comma, func: focusmon, arg: Arg::Int(-1) },
    Key { modmask: MODKEY, keysym: XK_period, func: focusmon, arg: Arg::Int(1) },
    Key {
        modmask: MODKEY | ShiftMask,
        keysym: XK_comma,
        func: tagmon,
        arg: Arg::Int(-1),
    },
    Key {
        modmask: MODKEY | ShiftMask,
        keysym: XK_period,
        func: tagmon,
        arg: Arg::Int(1),
    },
    tagkeys!(XK_1, 0),
    tagkeys!(XK_2, 1),
    tagkeys!(XK_3, 2),
    tagkeys!(XK_4, 3),
    tagkeys!(XK_5, 4),
    tagkeys!(XK_6, 5),
    tagkeys!(XK_7, 6),
    tagkeys!(XK_8, 7),
    tagkeys!(XK_9, 8),
    Key {
        modmask: MODKEY | ShiftMask,
        keysym: XK_q,
        func: quit,
        arg: Arg::None,
    },
    Key { modmask: COMBOKEY, keysym: XK_1, func: comboview, arg: Arg::UInt(tag_bit(0)) },
    Key { modmask: COMBOKEY, keysym: XK_2, func: comboview, arg: Arg::UInt(tag_bit(1)) },
    Key { modmask: COMBOKEY, keysym: XK_3, func: comboview, arg: Arg::UInt(tag_bit(2)) },
    Key {
        modmask: COMBOKEY | ShiftMask,
        keysym: XK_1,
        func: combotag,
        arg: Arg::UInt(tag_bit(0)),
    },
    Key {
        modmask: COMBOKEY | ShiftMask,
        keysym: XK_2,
        func: combotag,
        arg: Arg::UInt(tag_bit(1)),
    },
    Key {
        modmask: COMBOKEY | ShiftMask,
        keysym: XK_3,
        func: combotag,
        arg: Arg::UInt(tag_bit(2)),
    },
];

pub const BUTTONS: &[Button] = &[
    Button { click: Click::ClientWin, modmask: MODKEY, button: 1, func: movemouse, arg: Arg::None },
    Button { click: Click::ClientWin, modmask: MODKEY, button: 2, func: togglefloating, arg: Arg::None },
    Button { click: Click::ClientWin, modmask: MODKEY, button: 3, func: resizemouse, arg: Arg::None },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_count_fits_in_tagmask() {
        assert!(TAGS.len() <= 31);
    }

    #[test]
    fn tag_bit_is_a_single_bit_position() {
        assert_eq!(tag_bit(0), 1);
        assert_eq!(tag_bit(3), 8);
    }

    #[test]
    fn every_key_binding_has_a_distinct_trigger() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for k in KEYS {
            assert!(seen.insert((k.modmask, k.keysym)), "duplicate binding");
        }
    }
}
