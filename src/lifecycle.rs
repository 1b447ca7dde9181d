//! Startup (`setup`), adoption of pre-existing windows (`scan`), and
//! teardown (`cleanup`) — the parts of the manager's life that happen
//! exactly once, outside the steady-state event loop.
use std::collections::HashMap;

use x11::xinerama::{XineramaIsActive, XineramaQueryScreens};
use x11::xlib::{
    self, CurrentTime, PropModeReplace, Window, XChangeProperty, XCreateSimpleWindow,
    XDefaultScreen, XDisplayHeight, XDisplayWidth, XFree, XGetWindowAttributes,
    XGrabServer, XQueryTree, XUngrabServer, XWindowAttributes,
};

use crate::atoms::Atoms;
use crate::display::DisplayAdapter;
use crate::error::WmError;
use crate::events::ROOT_EVENT_MASK;
use crate::geometry::Rect;
use crate::input_grabs::{discover_numlock_mask, grab_keys};
use crate::monitor::Monitor;
use crate::wm::Wm;

/// Queries Xinerama for screen rectangles, falling back to a single
/// monitor spanning the whole default screen when Xinerama isn't active
/// (matches dwm's `updategeom` fallback).
pub fn query_screens(display: &DisplayAdapter) -> Vec<Rect> {
    unsafe {
        if XineramaIsActive(display.dpy) == 0 {
            let w = XDisplayWidth(display.dpy, display.screen);
            let h = XDisplayHeight(display.dpy, display.screen);
            return vec![Rect::new(0, 0, w, h)];
        }
        let mut count: i32 = 0;
        let infos = XineramaQueryScreens(display.dpy, &mut count);
        if infos.is_null() || count == 0 {
            let w = XDisplayWidth(display.dpy, display.screen);
            let h = XDisplayHeight(display.dpy, display.screen);
            return vec![Rect::new(0, 0, w, h)];
        }
        let slice = std::slice::from_raw_parts(infos, count as usize);
        let rects = slice
            .iter()
            .map(|s| Rect::new(s.x_org as i32, s.y_org as i32, s.width as i32, s.height as i32))
            .collect();
        XFree(infos as *mut libc::c_void);
        rects
    }
}

/// Creates the hidden `_NET_SUPPORTING_WM_CHECK` window and advertises
/// EWMH compliance, per SPEC_FULL.md §4.9.
fn advertise_ewmh(display: &DisplayAdapter, atoms: &Atoms) -> Window {
    let check = unsafe {
        XCreateSimpleWindow(display.dpy, display.root, 0, 0, 1, 1, 0, 0, 0)
    };
    unsafe {
        XChangeProperty(
            display.dpy,
            check,
            atoms.net.supporting_wm_check,
            xlib::XA_WINDOW,
            32,
            PropModeReplace,
            &check as *const Window as *const u8,
            1,
        );
        let name = std::ffi::CString::new("rdwm").unwrap();
        XChangeProperty(
            display.dpy,
            check,
            atoms.net.wm_name,
            xlib::XA_STRING,
            8,
            PropModeReplace,
            name.as_ptr() as *const u8,
            4,
        );
        XChangeProperty(
            display.dpy,
            display.root,
            atoms.net.supporting_wm_check,
            xlib::XA_WINDOW,
            32,
            PropModeReplace,
            &check as *const Window as *const u8,
            1,
        );

        let supported = atoms.supported_list();
        XChangeProperty(
            display.dpy,
            display.root,
            atoms.net.supported,
            xlib::XA_ATOM,
            32,
            PropModeReplace,
            supported.as_ptr() as *const u8,
            supported.len() as i32,
        );
        // clear any stale _NET_CLIENT_LIST left over from a previous run
        xlib::XDeleteProperty(display.dpy, display.root, atoms.net.client_list);
    }
    check
}

/// Builds a fresh `Wm`: opens the display, checks exclusivity, interns
/// atoms, advertises EWMH, discovers the numlock mask, grabs the
/// configured keys, and seeds the monitor list from Xinerama.
pub fn setup() -> Result<Wm, WmError> {
    let display = DisplayAdapter::open()?;
    display.probe_exclusivity(ROOT_EVENT_MASK)?;
    display.install_error_handler();

    let atoms = Atoms::intern_all(display.dpy);
    let wmcheckwin = advertise_ewmh(&display, &atoms);

    let screens = query_screens(&display);
    let mons: Vec<Monitor> = screens
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let mut m = Monitor::new(i, r, crate::config::MFACT, crate::config::NMASTER, crate::config::GAPPX);
            m.recompute_usable();
            m
        })
        .collect();

    let mut wm = Wm {
        display,
        atoms,
        wmcheckwin,
        mons,
        selmon: 0,
        clients: HashMap::new(),
        numlockmask: 0,
        combo: Default::default(),
        running: true,
    };
    wm.numlockmask = discover_numlock_mask(&wm);
    grab_keys(&wm);

    wm.display.select_input(wm.display.root, ROOT_EVENT_MASK);
    wm.display.sync();

    log::info!("started with {} monitor(s)", wm.mons.len());
    Ok(wm)
}

/// Adopts windows that already exist on the root window at startup
/// (dwm's `scan`): walks the tree once under `XGrabServer`, managing
/// viewable/iconic top-level windows and transients of already-managed
/// windows on a second pass so parent ordering doesn't matter.
pub fn scan(wm: &mut Wm) {
    let dpy = wm.display.dpy;
    let mut root_ret: Window = 0;
    let mut parent_ret: Window = 0;
    let mut children: *mut Window = std::ptr::null_mut();
    let mut n: u32 = 0;

    unsafe {
        XGrabServer(dpy);
        let ok = XQueryTree(dpy, wm.display.root, &mut root_ret, &mut parent_ret, &mut children, &mut n);
        if ok == 0 {
            XUngrabServer(dpy);
            return;
        }
        let wins = std::slice::from_raw_parts(children, n as usize).to_vec();
        XFree(children as *mut libc::c_void);

        for &w in &wins {
            let mut attrs: XWindowAttributes = std::mem::zeroed();
            if XGetWindowAttributes(dpy, w, &mut attrs) == 0 {
                continue;
            }
            if attrs.override_redirect != 0 || wm.display.transient_for(w).is_some() {
                continue;
            }
            if attrs.map_state == xlib::IsViewable || is_iconic(wm, w) {
                crate::events::manage_existing(wm, w);
            }
        }
        for &w in &wins {
            let mut attrs: XWindowAttributes = std::mem::zeroed();
            if XGetWindowAttributes(dpy, w, &mut attrs) == 0 {
                continue;
            }
            if wm.display.transient_for(w).is_some()
                && (attrs.map_state == xlib::IsViewable || is_iconic(wm, w))
            {
                crate::events::manage_existing(wm, w);
            }
        }
        XUngrabServer(dpy);
    }
}

fn is_iconic(wm: &Wm, win: Window) -> bool {
    use std::os::raw::{c_long, c_uchar};
    use x11::xlib::{AnyPropertyType, XGetWindowProperty};
    let mut actual_type = 0;
    let mut actual_format = 0;
    let mut nitems: u64 = 0;
    let mut bytes_after: u64 = 0;
    let mut prop: *mut c_uchar = std::ptr::null_mut();
    let state = unsafe {
        let rc = XGetWindowProperty(
            wm.display.dpy,
            win,
            wm.atoms.icccm.wm_state,
            0,
            2,
            0,
            AnyPropertyType as u64,
            &mut actual_type,
            &mut actual_format,
            &mut nitems,
            &mut bytes_after,
            &mut prop,
        );
        if rc != 0 || prop.is_null() || nitems == 0 {
            None
        } else {
            let val = *(prop as *const c_long);
            XFree(prop as *mut libc::c_void);
            Some(val)
        }
    };
    state == Some(crate::atoms::WM_STATE_ICONIC)
}

/// Releases grabs, frees the `_NET_SUPPORTING_WM_CHECK` window and
/// cursors, and closes the display. Called once the main loop exits.
pub fn cleanup(wm: &mut Wm) {
    let tagmask = Wm::tagmask();
    for i in 0..wm.mons.len() {
        wm.mons[i].tagset = [tagmask, tagmask];
    }
    wm.arrange_all();

    let wins: Vec<Window> = wm.clients.keys().copied().collect();
    for w in wins {
        crate::events::unmanage_for_shutdown(wm, w);
    }

    unsafe {
        xlib::XUngrabKey(wm.display.dpy, xlib::AnyKey, xlib::AnyModifier, wm.display.root);
        xlib::XDestroyWindow(wm.display.dpy, wm.wmcheckwin);
        xlib::XSetInputFocus(wm.display.dpy, xlib::PointerRoot as Window, xlib::RevertToPointerRoot, CurrentTime);
        xlib::XDeleteProperty(wm.display.dpy, wm.display.root, wm.atoms.net.active_window);
        xlib::XSync(wm.display.dpy, 0);
        xlib::XCloseDisplay(wm.display.dpy);
    }
    log::info!("shut down cleanly");
}

#[allow(dead_code)]
fn default_screen(display: &DisplayAdapter) -> i32 {
    unsafe { XDefaultScreen(display.dpy) }
}
