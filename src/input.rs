//! Input grammar: the numlock-aware grab matrix, the key/button dispatch
//! tables, and the combo chord interpreter.
use x11::xlib::{
    ControlMask, KeySym, LockMask, Mod1Mask, Mod2Mask, Mod3Mask, Mod4Mask, Mod5Mask, ShiftMask,
};

use crate::wm::Wm;

/// The argument payload passed to a bound command. Mirrors dwm's `Arg`
/// union but as a proper sum type since Rust doesn't need the C trick.
#[derive(Debug, Clone)]
pub enum Arg {
    Int(i32),
    UInt(u32),
    Float(f32),
    Strs(&'static [&'static str]),
    None,
}

pub type CommandFn = fn(&mut Wm, &Arg);

/// One configured key binding: modifier mask, keysym, command, argument.
pub struct Key {
    pub modmask: u32,
    pub keysym: KeySym,
    pub func: CommandFn,
    pub arg: Arg,
}

/// Where a button press landed, used to select the button table's `click`
/// column before matching modifier/button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    TagBar,
    LtSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

/// One configured button binding.
pub struct Button {
    pub click: Click,
    pub modmask: u32,
    pub button: u32,
    pub func: CommandFn,
    pub arg: Arg,
}

/// Modifier bits dwm's `CLEANMASK` keeps: Shift/Control/Mod1-5, with Lock
/// and the runtime-discovered numlock bit stripped.
pub const HANDLED_MODS: u32 =
    ShiftMask | ControlMask | Mod1Mask | Mod2Mask | Mod3Mask | Mod4Mask | Mod5Mask;

pub fn clean_mask(state: u32, numlockmask: u32) -> u32 {
    state & !(numlockmask | LockMask) & HANDLED_MODS
}

/// Combo chord state: holding a modifier while tapping multiple tag keys
/// accumulates tag bits instead of replacing them, per SPEC_FULL.md §4.7.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComboState {
    pub active: bool,
}

impl ComboState {
    pub fn reset(&mut self) {
        self.active = false;
    }

    /// `comboview`: OR the new mask into the current tagset when chaining,
    /// otherwise flip the double-buffer and replace.
    pub fn comboview(&mut self, tagset: &mut [u32; 2], seltags: &mut usize, newtags: u32) {
        if self.active {
            tagset[*seltags] |= newtags;
        } else {
            *seltags ^= 1;
            tagset[*seltags] = newtags;
            self.active = true;
        }
    }

    /// `combotag`: OR the new mask into the selected client's tags when
    /// chaining, otherwise replace.
    pub fn combotag(&mut self, client_tags: &mut u32, newtags: u32) {
        if self.active {
            *client_tags |= newtags;
        } else {
            *client_tags = newtags;
            self.active = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_mask_strips_lock_and_numlock() {
        let numlock = 1 << 4;
        let state = ShiftMask | LockMask | numlock;
        assert_eq!(clean_mask(state, numlock), ShiftMask);
    }

    #[test]
    fn combo_accumulates_across_taps_without_release() {
        let mut combo = ComboState::default();
        let mut tagset = [1u32, 1u32];
        let mut seltags = 0usize;

        combo.comboview(&mut tagset, &mut seltags, 0b01);
        combo.comboview(&mut tagset, &mut seltags, 0b10);

        assert_eq!(tagset[seltags], 0b11);
    }

    #[test]
    fn release_resets_combo_to_plain_replace() {
        let mut combo = ComboState::default();
        let mut tagset = [1u32, 1u32];
        let mut seltags = 0usize;

        combo.comboview(&mut tagset, &mut seltags, 0b01);
        combo.reset();
        combo.comboview(&mut tagset, &mut seltags, 0b10);

        // second comboview after reset flips buffer and replaces, not ORs
        assert_eq!(tagset[seltags], 0b10);
    }

    #[test]
    fn combotag_accumulates_then_resets() {
        let mut combo = ComboState::default();
        let mut tags = 0b001u32;
        combo.combotag(&mut tags, 0b001);
        combo.combotag(&mut tags, 0b010);
        assert_eq!(tags, 0b011);
        combo.reset();
        combo.combotag(&mut tags, 0b100);
        assert_eq!(tags, 0b100);
    }
}
