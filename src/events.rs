//! The event dispatcher: a constant-time table from X event type to
//! handler, window adoption/teardown (`manage`/`unmanage`), and the
//! per-event-type handlers described in SPEC_FULL.md §4.1.
use std::os::raw::c_long;

use x11::xlib::{
    self, ButtonPress, ButtonRelease, ClientMessage, ConfigureNotify, ConfigureRequest,
    DestroyNotify, EnterNotify, FocusIn, KeyPress, KeyRelease, LASTEvent, MapRequest,
    MappingNotify, MotionNotify, NotifyInferior, NotifyNormal, PropertyNotify, UnmapNotify,
    Window, XEvent, XGetWindowAttributes, XWindowAttributes,
};

use crate::atoms::{NET_WM_STATE_ADD, NET_WM_STATE_REMOVE, NET_WM_STATE_TOGGLE};
use crate::client::Client;
use crate::config;
use crate::input::Click;
use crate::wm::Wm;

type Handler = fn(&mut Wm, &XEvent);

/// The event mask the root window is selected for, SPEC_FULL.md §6.
pub const ROOT_EVENT_MASK: c_long = xlib::SubstructureRedirectMask
    | xlib::SubstructureNotifyMask
    | xlib::ButtonPressMask
    | xlib::PointerMotionMask
    | xlib::EnterWindowMask
    | xlib::LeaveWindowMask
    | xlib::StructureNotifyMask
    | xlib::PropertyChangeMask;

/// The event mask every managed client window is selected for.
pub const CLIENT_EVENT_MASK: c_long =
    xlib::EnterWindowMask | xlib::FocusChangeMask | xlib::PropertyChangeMask | xlib::StructureNotifyMask;

fn build_table() -> [Option<Handler>; LASTEvent as usize] {
    let mut table: [Option<Handler>; LASTEvent as usize] = [None; LASTEvent as usize];
    table[ButtonPress as usize] = Some(on_button_press);
    table[ButtonRelease as usize] = Some(on_combo_reset);
    table[ClientMessage as usize] = Some(on_client_message);
    table[ConfigureRequest as usize] = Some(on_configure_request);
    table[ConfigureNotify as usize] = Some(on_configure_notify);
    table[DestroyNotify as usize] = Some(on_destroy_notify);
    table[EnterNotify as usize] = Some(on_enter_notify);
    table[FocusIn as usize] = Some(on_focus_in);
    table[KeyPress as usize] = Some(on_key_press);
    table[KeyRelease as usize] = Some(on_combo_reset);
    table[MappingNotify as usize] = Some(on_mapping_notify);
    table[MapRequest as usize] = Some(on_map_request);
    table[MotionNotify as usize] = Some(on_motion_notify);
    table[PropertyNotify as usize] = Some(on_property_notify);
    table[UnmapNotify as usize] = Some(on_unmap_notify);
    table
}

lazy_static! {
    static ref HANDLERS: [Option<Handler>; LASTEvent as usize] = build_table();
}

/// O(1) dispatch: look the event type up in the fixed-size table and
/// invoke the handler if one is registered. Unknown types are dropped.
pub fn dispatch_one(wm: &mut Wm, ev: &XEvent) {
    let ty = unsafe { ev.type_ } as usize;
    if ty >= HANDLERS.len() {
        log::trace!("dropping event of unrecognized type {}", ty);
        return;
    }
    match HANDLERS[ty] {
        Some(handler) => {
            log::debug!("dispatching event type {}", ty);
            handler(wm, ev);
        }
        None => log::trace!("no handler registered for event type {}", ty),
    }
}

fn on_map_request(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.map_request };
    let (class, _instance) = wm.display.class_hint(e.window);
    if class.contains(config::ALTBAR_CLASS) {
        adopt_bar(wm, e.window);
        return;
    }
    if wm.client(e.window).is_some() {
        return;
    }
    manage(wm, e.window);
}

fn adopt_bar(wm: &mut Wm, win: Window) {
    let mut attrs: XWindowAttributes = unsafe { std::mem::zeroed() };
    if unsafe { XGetWindowAttributes(wm.display.dpy, win, &mut attrs) } == 0 {
        return;
    }
    let mon = wm.mon_index_of_point(attrs.x, attrs.y);
    wm.mons[mon].barwin = Some(win);
    wm.mons[mon].bh = attrs.height;
    wm.mons[mon].recompute_usable();
    wm.display.map_window(win);
    log::info!("adopted alternate bar on monitor {}", mon);
    wm.arrange_mon_pub(mon);
}

/// Adopts a window discovered by `lifecycle::scan` at startup, the same
/// path `MapRequest` uses for newly-mapped windows.
pub fn manage_existing(wm: &mut Wm, win: Window) {
    manage(wm, win);
}

/// Detaches a client during shutdown without restoring its border or
/// marking it withdrawn — the display is about to close anyway.
pub fn unmanage_for_shutdown(wm: &mut Wm, win: Window) {
    unmanage(wm, win, true);
}

/// `manage()`: adopts a freshly-mapped, non-override-redirect, not-yet
/// managed window as a client, per SPEC_FULL.md §4.2.
fn manage(wm: &mut Wm, win: Window) {
    let mut attrs: XWindowAttributes = unsafe { std::mem::zeroed() };
    if unsafe { XGetWindowAttributes(wm.display.dpy, win, &mut attrs) } == 0 {
        return;
    }
    if attrs.override_redirect != 0 {
        return;
    }

    let mon = wm.selmon;
    let mut c = Client::new(win, attrs.x, attrs.y, attrs.width, attrs.height, config::BORDERPX, mon);

    let transient = wm.display.transient_for(win);
    let transient_parent = transient.filter(|&t| wm.client(t).is_some());
    if let Some(t) = transient_parent {
        let tm = wm.clients[&t].mon;
        c.mon = tm;
        c.tags = wm.clients[&t].tags;
        c.isfloating = true;
    } else {
        c.tags = wm.mons[mon].active_tagset();
    }

    // Clamp into the owning monitor's screen rect.
    {
        let m = &wm.mons[c.mon];
        if c.x + c.outer_w() > m.mx + m.mw {
            c.x = m.mx + m.mw - c.outer_w();
        }
        if c.y + c.outer_h() > m.my + m.mh {
            c.y = m.my + m.mh - c.outer_h();
        }
        c.x = c.x.max(m.mx);
        // push below the bar if it would otherwise sit under the bar strip
        let center_x = c.x + c.w / 2;
        if c.y < m.wy && center_x > m.wx && center_x < m.wx + m.ww {
            c.y = m.wy;
        } else {
            c.y = c.y.max(m.my);
        }
    }

    c.hints = read_size_hints(wm, win);
    c.isfixed = c.hints.is_fixed();
    let (isurgent, neverfocus) = read_wm_hints(wm, win);
    c.isurgent = isurgent;
    c.neverfocus = neverfocus;
    c.name = wm.display.window_title(win);
    if !c.isfloating {
        c.isfloating = transient.is_some() || c.isfixed;
    }

    let mon = c.mon;
    wm.clients.insert(win, c);
    // transient children inherit tags/monitor/floating from their parent above;
    // rules only apply to top-level windows, matching dwm's applyrules guard.
    if transient_parent.is_none() {
        wm.apply_rules_to(win);
    }

    wm.display.select_input(win, CLIENT_EVENT_MASK);
    wm.display.configure_border(win, config::BORDERPX);

    wm.mons[mon].attach(win);
    wm.mons[mon].attach_stack(win);
    wm.update_client_list();

    // move offscreen until the first arrange places it for real
    let (ow, y) = {
        let c = &wm.clients[&win];
        (c.outer_w(), c.y)
    };
    let (px, _) = crate::layout::parked_position(ow, y);
    wm.display.move_resize(win, px, y, wm.clients[&win].w, wm.clients[&win].h);
    wm.mark_normal(win);

    if let Some(prev_sel) = wm.mons[mon].sel {
        wm.grab_buttons(prev_sel, false);
    }
    wm.mons[mon].sel = Some(win);
    wm.selmon = mon;

    if wm.clients[&win].isfloating {
        wm.display.raise_window(win);
    }

    wm.arrange_mon_pub(mon);
    wm.display.map_window(win);
    wm.focus(None);
    log::info!("managed window {:#x} on monitor {}", win, mon);
}

fn read_size_hints(wm: &Wm, win: Window) -> crate::client::SizeHints {
    use x11::xlib::{XGetWMNormalHints, XSizeHints, PAspect, PBaseSize, PMaxSize, PMinSize, PResizeInc};
    let mut hints: crate::client::SizeHints = Default::default();
    let mut size: XSizeHints = unsafe { std::mem::zeroed() };
    let mut supplied: i64 = 0;
    let ok = unsafe { XGetWMNormalHints(wm.display.dpy, win, &mut size, &mut supplied) } != 0;
    if !ok {
        return hints;
    }
    if size.flags & PBaseSize != 0 {
        hints.basew = size.base_width;
        hints.baseh = size.base_height;
    } else if size.flags & PMinSize != 0 {
        hints.basew = size.min_width;
        hints.baseh = size.min_height;
    }
    if size.flags & PResizeInc != 0 {
        hints.incw = size.width_inc;
        hints.inch = size.height_inc;
    }
    if size.flags & PMaxSize != 0 {
        hints.maxw = size.max_width;
        hints.maxh = size.max_height;
    }
    if size.flags & PMinSize != 0 {
        hints.minw = size.min_width;
        hints.minh = size.min_height;
    } else if size.flags & PBaseSize != 0 {
        hints.minw = size.base_width;
        hints.minh = size.base_height;
    }
    if size.flags & PAspect != 0 {
        hints.mina = size.min_aspect.y as f32 / size.min_aspect.x.max(1) as f32;
        hints.maxa = size.max_aspect.x as f32 / size.max_aspect.y.max(1) as f32;
    }
    hints
}

/// Reads urgency and the input hint from `WM_HINTS`, without touching the
/// property — used while adopting a window, before it has a `Client` record.
fn read_wm_hints(wm: &Wm, win: Window) -> (bool, bool) {
    use x11::xlib::{InputHint, XGetWMHints, XUrgencyHint};
    let wmh = unsafe { XGetWMHints(wm.display.dpy, win) };
    if wmh.is_null() {
        return (false, false);
    }
    unsafe {
        let isurgent = (*wmh).flags & XUrgencyHint != 0;
        let neverfocus = (*wmh).flags & InputHint != 0 && (*wmh).input == 0;
        xlib::XFree(wmh as *mut libc::c_void);
        (isurgent, neverfocus)
    }
}

/// `updatewmhints`: re-reads `WM_HINTS` on a `PropertyNotify`. Urgency set on
/// the currently-focused client is cleared right back on the window instead
/// of being recorded, matching dwm — a focused window has no business
/// demanding attention.
fn update_wm_hints(wm: &mut Wm, win: Window) {
    use x11::xlib::{InputHint, XGetWMHints, XSetWMHints, XUrgencyHint};
    let wmh = unsafe { XGetWMHints(wm.display.dpy, win) };
    if wmh.is_null() {
        return;
    }
    let is_selected = wm.mons[wm.selmon].sel == Some(win);
    unsafe {
        if is_selected && (*wmh).flags & XUrgencyHint != 0 {
            (*wmh).flags &= !XUrgencyHint;
            XSetWMHints(wm.display.dpy, win, wmh);
        } else if let Some(c) = wm.client_mut(win) {
            c.isurgent = (*wmh).flags & XUrgencyHint != 0;
        }
        if let Some(c) = wm.client_mut(win) {
            c.neverfocus = (*wmh).flags & InputHint != 0 && (*wmh).input == 0;
        }
        xlib::XFree(wmh as *mut libc::c_void);
    }
}

/// `unmanage(destroyed)`: detaches a client from both orderings, restores
/// its border if still alive, frees the client record, and re-arranges.
fn unmanage(wm: &mut Wm, win: Window, destroyed: bool) {
    let mon = match wm.client(win) {
        Some(c) => c.mon,
        None => return,
    };

    wm.mons[mon].detach(win);
    wm.mons[mon].detach_stack(win);
    wm.clients.remove(&win);

    if !destroyed {
        wm.display.configure_border(win, config::BORDERPX);
        wm.withdraw(win);
    }

    wm.update_client_list();
    wm.focus(None);
    wm.arrange_mon_pub(mon);
    log::info!("unmanaged window {:#x} (destroyed={})", win, destroyed);
}

fn on_unmap_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.unmap };
    if e.send_event != 0 {
        if wm.client(e.window).is_some() {
            wm.withdraw(e.window);
        }
        return;
    }
    if wm.client(e.window).is_some() {
        unmanage(wm, e.window, false);
    } else if let Some(mon) = wm.mon_of_window(e.window) {
        detach_bar_or_tray(wm, mon, e.window);
    }
}

fn on_destroy_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.destroy_window };
    if wm.client(e.window).is_some() {
        unmanage(wm, e.window, true);
    } else if let Some(mon) = wm.mon_of_window(e.window) {
        detach_bar_or_tray(wm, mon, e.window);
    }
}

fn detach_bar_or_tray(wm: &mut Wm, mon: usize, win: Window) {
    if wm.mons[mon].barwin == Some(win) {
        wm.mons[mon].barwin = None;
        wm.mons[mon].bh = 0;
        wm.mons[mon].recompute_usable();
        wm.arrange_mon_pub(mon);
    } else if wm.mons[mon].traywin == Some(win) {
        wm.mons[mon].traywin = None;
    }
}

fn on_configure_request(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.configure_request };
    if let Some(c) = wm.clients.get(&e.window).cloned() {
        if e.value_mask & xlib::CWBorderWidth as u64 != 0 {
            if let Some(c) = wm.clients.get_mut(&e.window) {
                c.bw = e.border_width;
            }
        }
        if c.isfloating {
            let mon = c.mon;
            let m = wm.mons[mon].screen_rect();
            let mut nx = if e.value_mask & xlib::CWX as u64 != 0 { e.x } else { c.x };
            let mut ny = if e.value_mask & xlib::CWY as u64 != 0 { e.y } else { c.y };
            let mut nw = if e.value_mask & xlib::CWWidth as u64 != 0 { e.width } else { c.w };
            let mut nh = if e.value_mask & xlib::CWHeight as u64 != 0 { e.height } else { c.h };

            if nx + nw > m.x + m.w {
                nx = m.x + (m.w - nw) / 2;
            }
            if ny + nh > m.y + m.h {
                ny = m.y + (m.h - nh) / 2;
            }
            if let Some(c) = wm.clients.get_mut(&e.window) {
                c.x = nx;
                c.y = ny;
                c.w = nw;
                c.h = nh;
            }
            wm.display.move_resize(e.window, nx, ny, nw, nh);
        } else {
            // tiled: ignore requested geometry, re-assert current layout
            wm.send_configure(e.window);
        }
    } else {
        wm.forward_configure(&e);
    }
}

fn on_configure_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.configure };
    if e.window != wm.display.root {
        return;
    }
    let screens = crate::lifecycle::query_screens(&wm.display);
    wm.update_geom(screens);
}

fn on_property_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.property };
    if e.window == wm.display.root {
        return;
    }
    if wm.client(e.window).is_none() {
        return;
    }
    if e.atom == xlib::XA_WM_TRANSIENT_FOR {
        if let Some(t) = wm.display.transient_for(e.window) {
            if wm.client(t).is_some() {
                if let Some(c) = wm.client_mut(e.window) {
                    c.isfloating = true;
                }
                let mon = wm.clients[&e.window].mon;
                wm.arrange_mon_pub(mon);
            }
        }
    } else if e.atom == xlib::XA_WM_NORMAL_HINTS {
        let hints = read_size_hints(wm, e.window);
        if let Some(c) = wm.client_mut(e.window) {
            c.hints = hints;
            c.isfixed = c.hints.is_fixed();
        }
    } else if e.atom == xlib::XA_WM_HINTS {
        update_wm_hints(wm, e.window);
    } else if e.atom == xlib::XA_WM_NAME || e.atom == wm.atoms.net.wm_name {
        let title = wm.display.window_title(e.window);
        if let Some(c) = wm.client_mut(e.window) {
            c.name = title;
        }
    } else if e.atom == wm.atoms.net.wm_window_type {
        apply_dialog_rule(wm, e.window);
    }
}

fn apply_dialog_rule(wm: &mut Wm, win: Window) {
    if let Some(c) = wm.client_mut(win) {
        c.isfloating = true;
    }
}

fn on_client_message(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.client_message };
    if wm.client(e.window).is_none() {
        return;
    }
    if e.message_type == wm.atoms.net.wm_state {
        let data = unsafe { e.data.as_longs() };
        let action = data[0];
        let is_fullscreen =
            data[1] as u64 == wm.atoms.net.wm_state_fullscreen || data[2] as u64 == wm.atoms.net.wm_state_fullscreen;
        if is_fullscreen {
            let now = wm.clients[&e.window].isfullscreen;
            let want = match action {
                NET_WM_STATE_ADD => true,
                NET_WM_STATE_REMOVE => false,
                NET_WM_STATE_TOGGLE => !now,
                _ => now,
            };
            wm.set_fullscreen(e.window, want);
        }
    } else if e.message_type == wm.atoms.net.active_window {
        let mon = wm.clients[&e.window].mon;
        let is_selected = wm.mons[mon].sel == Some(e.window);
        let urgent = wm.clients[&e.window].isurgent;
        if !is_selected && !urgent {
            if let Some(c) = wm.client_mut(e.window) {
                c.isurgent = true;
            }
        }
    }
}

fn on_enter_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.crossing };
    if e.mode != NotifyNormal || e.detail == NotifyInferior {
        if e.window != wm.display.root {
            return;
        }
    }
    if wm.client(e.window).is_some() {
        let mon = wm.clients[&e.window].mon;
        wm.selmon = mon;
        wm.focus(Some(e.window));
    } else if let Some(mon) = wm.mons.iter().find(|m| m.screen_rect().contains_point(e.x_root, e.y_root)).map(|m| m.num) {
        wm.selmon = mon;
        wm.focus(None);
    }
}

fn on_focus_in(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.focus_change };
    let sel = wm.selmon().sel;
    if let Some(sel_win) = sel {
        if e.window != sel_win {
            wm.setfocus(sel_win);
        }
    }
}

fn on_mapping_notify(wm: &mut Wm, ev: &XEvent) {
    let mut e = unsafe { ev.mapping };
    unsafe {
        xlib::XRefreshKeyboardMapping(&mut e);
    }
    if e.request == xlib::MappingKeyboard {
        crate::input_grabs::grab_keys(wm);
    }
}

fn on_motion_notify(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.motion };
    if e.window != wm.display.root {
        return;
    }
    let mon = wm.mon_index_of_point(e.x_root, e.y_root);
    if mon != wm.selmon {
        wm.selmon = mon;
        wm.focus(None);
    }
}

fn on_key_press(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.key };
    let keysym = unsafe { xlib::XKeycodeToKeysym(wm.display.dpy, e.keycode as u8, 0) };
    let clean = crate::input::clean_mask(e.state, wm.numlockmask);
    for key in config::KEYS {
        if key.keysym == keysym && crate::input::clean_mask(key.modmask, wm.numlockmask) == clean {
            (key.func)(wm, &key.arg);
        }
    }
}

/// Resets the combo-chord state on either a key or a button release, since
/// a chord can be broken by releasing any key in the combo or by clicking.
fn on_combo_reset(wm: &mut Wm, _ev: &XEvent) {
    wm.combo.reset();
}

fn classify_click(wm: &Wm, win: Window) -> Click {
    if win == wm.display.root {
        Click::RootWin
    } else if wm.mons.iter().any(|m| m.barwin == Some(win)) {
        Click::StatusText
    } else if wm.client(win).is_some() {
        Click::ClientWin
    } else {
        Click::RootWin
    }
}

fn on_button_press(wm: &mut Wm, ev: &XEvent) {
    let e = unsafe { ev.button };
    let click = classify_click(wm, e.window);

    if click == Click::ClientWin {
        if let Some(mon) = wm.mon_of_window(e.window) {
            wm.selmon = mon;
        }
        wm.focus(Some(e.window));
    }

    let clean = crate::input::clean_mask(e.state, wm.numlockmask);
    for b in config::BUTTONS {
        if b.click == click
            && b.button == e.button
            && crate::input::clean_mask(b.modmask, wm.numlockmask) == clean
        {
            (b.func)(wm, &b.arg);
        }
    }
}

impl Wm {
    /// Re-sends the client's current geometry as a synthetic
    /// `ConfigureNotify`, used when a tiled client's `ConfigureRequest` is
    /// otherwise ignored — ICCCM requires some response.
    fn send_configure(&self, win: Window) {
        if let Some(c) = self.client(win) {
            let mut ce: xlib::XConfigureEvent = unsafe { std::mem::zeroed() };
            ce.type_ = ConfigureNotify;
            ce.display = self.display.dpy;
            ce.event = win;
            ce.window = win;
            ce.x = c.x;
            ce.y = c.y;
            ce.width = c.w;
            ce.height = c.h;
            ce.border_width = c.bw;
            let mut xe = XEvent { configure: ce };
            unsafe {
                xlib::XSendEvent(self.display.dpy, win, 0, xlib::StructureNotifyMask, &mut xe);
            }
        }
    }

    /// Forwards an unmanaged window's `ConfigureRequest` verbatim.
    fn forward_configure(&self, e: &xlib::XConfigureRequestEvent) {
        let mut wc = xlib::XWindowChanges {
            x: e.x,
            y: e.y,
            width: e.width,
            height: e.height,
            border_width: e.border_width,
            sibling: e.above,
            stack_mode: e.detail,
        };
        unsafe {
            xlib::XConfigureWindow(self.display.dpy, e.window, e.value_mask as u32, &mut wc);
        }
    }
}
