//! ICCCM/EWMH atom registry. This is the only part of the Display Adapter
//! that touches `Xlib` directly outside of `display.rs`, because interning
//! happens exactly once, in `setup()`.
use std::ffi::CString;
use x11::xlib::{Atom, Display, XInternAtom};

/// `WM_STATE` values, ICCCM 4.1.3.1.
pub const WM_STATE_WITHDRAWN: i64 = 0;
pub const WM_STATE_NORMAL: i64 = 1;
pub const WM_STATE_ICONIC: i64 = 3;

/// `_NET_WM_STATE` client-message action codes, EWMH 1.3.
pub const NET_WM_STATE_REMOVE: i64 = 0;
pub const NET_WM_STATE_ADD: i64 = 1;
pub const NET_WM_STATE_TOGGLE: i64 = 2;

/// ICCCM atoms consumed by the manager.
#[derive(Debug, Clone, Copy)]
pub struct IcccmAtoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub wm_take_focus: Atom,
}

/// EWMH atoms advertised via `_NET_SUPPORTED` and consumed from clients.
#[derive(Debug, Clone, Copy)]
pub struct NetAtoms {
    pub supported: Atom,
    pub wm_name: Atom,
    pub wm_state: Atom,
    pub supporting_wm_check: Atom,
    pub wm_state_fullscreen: Atom,
    pub wm_window_type: Atom,
    pub wm_window_type_dialog: Atom,
    pub client_list: Atom,
    pub active_window: Atom,
}

#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub icccm: IcccmAtoms,
    pub net: NetAtoms,
}

fn intern(dpy: *mut Display, name: &str) -> Atom {
    let c = CString::new(name).expect("atom name has no interior nul");
    unsafe { XInternAtom(dpy, c.as_ptr(), 0) }
}

impl Atoms {
    /// Interns every atom this manager needs. Called once from `setup()`.
    pub fn intern_all(dpy: *mut Display) -> Self {
        let icccm = IcccmAtoms {
            wm_protocols: intern(dpy, "WM_PROTOCOLS"),
            wm_delete_window: intern(dpy, "WM_DELETE_WINDOW"),
            wm_state: intern(dpy, "WM_STATE"),
            wm_take_focus: intern(dpy, "WM_TAKE_FOCUS"),
        };
        let net = NetAtoms {
            supported: intern(dpy, "_NET_SUPPORTED"),
            wm_name: intern(dpy, "_NET_WM_NAME"),
            wm_state: intern(dpy, "_NET_WM_STATE"),
            supporting_wm_check: intern(dpy, "_NET_SUPPORTING_WM_CHECK"),
            wm_state_fullscreen: intern(dpy, "_NET_WM_STATE_FULLSCREEN"),
            wm_window_type: intern(dpy, "_NET_WM_WINDOW_TYPE"),
            wm_window_type_dialog: intern(dpy, "_NET_WM_WINDOW_TYPE_DIALOG"),
            client_list: intern(dpy, "_NET_CLIENT_LIST"),
            active_window: intern(dpy, "_NET_ACTIVE_WINDOW"),
        };
        Atoms { icccm, net }
    }

    /// The full list advertised on the root window's `_NET_SUPPORTED`.
    pub fn supported_list(&self) -> [Atom; 9] {
        [
            self.net.active_window,
            self.net.supported,
            self.net.wm_name,
            self.net.wm_state,
            self.net.supporting_wm_check,
            self.net.wm_state_fullscreen,
            self.net.wm_window_type,
            self.net.wm_window_type_dialog,
            self.net.client_list,
        ]
    }
}
