//! The command functions bound in `config::KEYS`/`config::BUTTONS`. Each
//! one matches a single dwm `void cmd(const Arg *arg)` function, translated
//! to `fn(&mut Wm, &Arg)`.
use std::process::Command;

use crate::input::Arg;
use crate::wm::Wm;

/// `spawn`: forks the first string of `arg`'s `Strs` as a command with the
/// rest as arguments, detached from the manager. Failures are logged, not
/// propagated — a broken launcher shouldn't take the window manager down.
pub fn spawn(_wm: &mut Wm, arg: &Arg) {
    let argv = match arg {
        Arg::Strs(v) if !v.is_empty() => v,
        _ => return,
    };
    match Command::new(argv[0]).args(&argv[1..]).spawn() {
        Ok(_) => log::debug!("spawned {:?}", argv),
        Err(e) => log::warn!("failed to spawn {:?}: {}", argv, e),
    }
}

pub fn togglefloating(wm: &mut Wm, _arg: &Arg) {
    let mon = wm.selmon;
    let sel = match wm.selmon().sel {
        Some(w) => w,
        None => return,
    };
    if wm.clients.get(&sel).map_or(false, |c| c.isfullscreen) {
        return;
    }
    if let Some(c) = wm.clients.get_mut(&sel) {
        c.isfloating = !c.isfloating;
        if c.isfloating {
            c.x = c.oldx;
            c.y = c.oldy;
            c.w = c.oldw;
            c.h = c.oldh;
        }
    }
    wm.arrange_mon_pub(mon);
}

fn dir_mon(wm: &Wm, dir: i32) -> usize {
    let n = wm.mons.len() as i32;
    if n <= 1 {
        return wm.selmon;
    }
    (((wm.selmon as i32) + dir).rem_euclid(n)) as usize
}

/// `focusmon`: moves selection to the next/previous monitor, `arg.Int` = ±1.
pub fn focusmon(wm: &mut Wm, arg: &Arg) {
    let dir = if let Arg::Int(d) = arg { *d } else { 1 };
    let target = dir_mon(wm, dir);
    if target == wm.selmon {
        return;
    }
    wm.selmon = target;
    wm.focus(None);
}

/// `tagmon`: sends the selected client to the next/previous monitor.
pub fn tagmon(wm: &mut Wm, arg: &Arg) {
    let dir = if let Arg::Int(d) = arg { *d } else { 1 };
    let sel = match wm.selmon().sel {
        Some(w) => w,
        None => return,
    };
    let target = dir_mon(wm, dir);
    wm.send_client_to_mon(sel, target);
}

/// `focusstack`: cycles `sel` forward/backward through the visible entries
/// of the tile-order list, `arg.Int` = ±1.
pub fn focusstack(wm: &mut Wm, arg: &Arg) {
    let dir = if let Arg::Int(d) = arg { *d } else { 1 };
    let mon = wm.selmon;
    let tagset = wm.mons[mon].active_tagset();
    let visible: Vec<_> = wm.mons[mon]
        .clients
        .iter()
        .copied()
        .filter(|&w| wm.clients.get(&w).map_or(false, |c| c.is_visible(tagset)))
        .collect();
    if visible.is_empty() {
        return;
    }
    let sel = wm.mons[mon].sel;
    let next = match sel.and_then(|s| visible.iter().position(|&w| w == s)) {
        Some(i) => {
            let n = visible.len() as i32;
            let idx = ((i as i32 + dir).rem_euclid(n)) as usize;
            visible[idx]
        }
        None => visible[0],
    };
    wm.focus(Some(next));
}

/// `incnmaster`: adjusts the master-area client count, floored at 0.
pub fn incnmaster(wm: &mut Wm, arg: &Arg) {
    let delta = if let Arg::Int(d) = arg { *d } else { 0 };
    let mon = wm.selmon;
    wm.mons[mon].nmaster = (wm.mons[mon].nmaster + delta).max(0);
    wm.arrange_mon_pub(mon);
}

/// `setmfact`: adjusts the master/stack split, clamped to [0.05, 0.95].
pub fn setmfact(wm: &mut Wm, arg: &Arg) {
    let delta = if let Arg::Float(f) = arg { *f } else { 0.0 };
    let mon = wm.selmon;
    let next = (wm.mons[mon].mfact + delta).clamp(0.05, 0.95);
    wm.mons[mon].mfact = next;
    wm.arrange_mon_pub(mon);
}

pub fn zoom(wm: &mut Wm, _arg: &Arg) {
    wm.zoom();
}

/// `view`: replaces the selected monitor's active tagset with `arg.UInt`.
pub fn view(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let mon = wm.selmon;
    let masked = bits & Wm::tagmask();
    if masked == 0 || masked == wm.mons[mon].active_tagset() {
        return;
    }
    wm.mons[mon].seltags ^= 1;
    let idx = wm.mons[mon].seltags;
    wm.mons[mon].tagset[idx] = masked;
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}

/// `toggleview`: XORs `arg.UInt` into the active tagset; a no-op if that
/// would leave no tag visible.
pub fn toggleview(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let mon = wm.selmon;
    let idx = wm.mons[mon].seltags;
    let next = wm.mons[mon].tagset[idx] ^ (bits & Wm::tagmask());
    if next == 0 {
        return;
    }
    wm.mons[mon].tagset[idx] = next;
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}

/// `tag`: replaces the selected client's tags with `arg.UInt`.
pub fn tag(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let masked = bits & Wm::tagmask();
    if masked == 0 {
        return;
    }
    let mon = wm.selmon;
    let sel = match wm.mons[mon].sel {
        Some(w) => w,
        None => return,
    };
    if let Some(c) = wm.clients.get_mut(&sel) {
        c.tags = masked;
    }
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}

/// `toggletag`: XORs `arg.UInt` into the selected client's tags; a no-op if
/// that would leave the client with no tags.
pub fn toggletag(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let mon = wm.selmon;
    let sel = match wm.mons[mon].sel {
        Some(w) => w,
        None => return,
    };
    let next = wm.clients.get(&sel).map_or(0, |c| c.tags ^ (bits & Wm::tagmask()));
    if next == 0 {
        return;
    }
    if let Some(c) = wm.clients.get_mut(&sel) {
        c.tags = next;
    }
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}

pub fn quit(wm: &mut Wm, _arg: &Arg) {
    wm.quit();
}

/// `killclient`: politely asks a `WM_DELETE_WINDOW`-supporting client to
/// close itself, otherwise kills its X connection outright.
pub fn killclient(wm: &mut Wm, _arg: &Arg) {
    let sel = match wm.selmon().sel {
        Some(w) => w,
        None => return,
    };
    if wm.display.supports_protocol(sel, wm.atoms.icccm.wm_delete_window) {
        wm.display.send_client_message(
            sel,
            wm.atoms.icccm.wm_protocols,
            [wm.atoms.icccm.wm_delete_window as i64, x11::xlib::CurrentTime as i64, 0, 0, 0],
        );
    } else {
        wm.display.install_dummy_error_handler();
        unsafe {
            x11::xlib::XGrabServer(wm.display.dpy);
            x11::xlib::XSetCloseDownMode(wm.display.dpy, x11::xlib::DestroyAll);
            x11::xlib::XKillClient(wm.display.dpy, sel);
            x11::xlib::XSync(wm.display.dpy, 0);
            x11::xlib::XUngrabServer(wm.display.dpy);
        }
        wm.display.install_error_handler();
    }
}

pub fn movemouse(wm: &mut Wm, _arg: &Arg) {
    if let Some(sel) = wm.selmon().sel {
        wm.move_mouse(sel);
    }
}

pub fn resizemouse(wm: &mut Wm, _arg: &Arg) {
    if let Some(sel) = wm.selmon().sel {
        wm.resize_mouse(sel);
    }
}

/// `comboview`: chord-aware tag view switch bound to the combo modifier.
pub fn comboview(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let mon = wm.selmon;
    let masked = bits & Wm::tagmask();
    let (mut tagset, mut seltags) = (wm.mons[mon].tagset, wm.mons[mon].seltags);
    wm.combo.comboview(&mut tagset, &mut seltags, masked);
    wm.mons[mon].tagset = tagset;
    wm.mons[mon].seltags = seltags;
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}

/// `combotag`: chord-aware client retag bound to the combo modifier.
pub fn combotag(wm: &mut Wm, arg: &Arg) {
    let bits = if let Arg::UInt(u) = arg { *u } else { return };
    let mon = wm.selmon;
    let sel = match wm.mons[mon].sel {
        Some(w) => w,
        None => return,
    };
    let masked = bits & Wm::tagmask();
    let mut tags = wm.clients.get(&sel).map_or(0, |c| c.tags);
    wm.combo.combotag(&mut tags, masked);
    if tags != 0 {
        if let Some(c) = wm.clients.get_mut(&sel) {
            c.tags = tags;
        }
    }
    wm.focus(None);
    wm.arrange_mon_pub(mon);
}
