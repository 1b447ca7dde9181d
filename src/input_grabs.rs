//! Numlock discovery and the grab matrix: every configured key/button
//! binding is grabbed four times, once per combination of the Lock and
//! numlock modifier bits, since X does not let a single grab ignore a
//! modifier.
use x11::xlib::{
    self, AnyButton, AnyModifier, ButtonPressMask, ButtonReleaseMask, GrabModeAsync, GrabModeSync,
    LockMask, Window, XGetModifierMapping, XGrabButton, XGrabKey, XKeysymToKeycode, XUngrabButton,
    XUngrabKey, XFree,
};

use crate::config;
use crate::wm::Wm;

/// Scans the server's modifier map for the keycode bound to `Num_Lock` and
/// returns which modifier bit (`Mod1Mask`..`Mod5Mask`) it was assigned to,
/// or `0` if `Num_Lock` isn't bound to any modifier.
pub fn discover_numlock_mask(wm: &Wm) -> u32 {
    let dpy = wm.display.dpy;
    unsafe {
        let modmap = XGetModifierMapping(dpy);
        if modmap.is_null() {
            return 0;
        }
        let numlock_keycode = XKeysymToKeycode(dpy, x11::keysym::XK_Num_Lock as u64);
        let max_keypermod = (*modmap).max_keypermod;
        let mut mask = 0u32;
        'outer: for mod_index in 0..8 {
            for k in 0..max_keypermod {
                let code = *(*modmap)
                    .modifiermap
                    .offset((mod_index * max_keypermod + k) as isize);
                if code == numlock_keycode {
                    mask = 1 << mod_index;
                    break 'outer;
                }
            }
        }
        XFree(modmap as *mut libc::c_void);
        mask
    }
}

fn modifier_variants(base: u32, numlockmask: u32) -> [u32; 4] {
    [base, base | LockMask, base | numlockmask, base | LockMask | numlockmask]
}

/// Re-grabs every configured key on the root window: ungrab everything
/// first, then grab each `(mod, keysym)` in all four numlock/Lock
/// variants. Called at startup and on `MappingNotify`.
pub fn grab_keys(wm: &Wm) {
    let dpy = wm.display.dpy;
    let root = wm.display.root;
    unsafe {
        XUngrabKey(dpy, xlib::AnyKey, AnyModifier, root);
        for key in config::KEYS {
            let code = XKeysymToKeycode(dpy, key.keysym);
            if code == 0 {
                continue;
            }
            for m in modifier_variants(key.modmask, wm.numlockmask) {
                XGrabKey(
                    dpy,
                    code as i32,
                    m,
                    root,
                    1,
                    GrabModeAsync,
                    GrabModeAsync,
                );
            }
        }
    }
}

/// Per-client button grabs. Unfocused clients get an unconditional grab on
/// any button (click-to-focus); the focused client only grabs the
/// configured modifier/button pairs, so ordinary clicks reach it directly.
pub fn grab_buttons_for_client(wm: &Wm, win: Window, focused: bool) {
    let dpy = wm.display.dpy;
    unsafe {
        XUngrabButton(dpy, AnyButton as u32, AnyModifier, win);
        if !focused {
            XGrabButton(
                dpy,
                AnyButton as u32,
                AnyModifier,
                win,
                0,
                (ButtonPressMask | ButtonReleaseMask) as u32,
                GrabModeSync,
                GrabModeSync,
                0,
                0,
            );
            return;
        }
        for b in config::BUTTONS {
            if b.click != crate::input::Click::ClientWin {
                continue;
            }
            for m in modifier_variants(b.modmask, wm.numlockmask) {
                XGrabButton(
                    dpy,
                    b.button,
                    m,
                    win,
                    0,
                    (ButtonPressMask | ButtonReleaseMask) as u32,
                    GrabModeAsync,
                    GrabModeSync,
                    0,
                    0,
                );
            }
        }
    }
}
