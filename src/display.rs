//! Thin abstraction over the X connection: open/close, property read/write,
//! grabs, configure/map, and the installed error handler. Everything that
//! reaches into `Xlib` directly lives behind this module (plus
//! `atoms.rs`), so the rest of the crate can stay ordinary safe Rust.
#![allow(non_upper_case_globals)]
use std::ffi::CStr;
use std::os::raw::{c_int, c_long, c_uchar};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

use libc::c_void;
use x11::xlib::{
    self, Atom, BadAccess, ClientMessage, Display, PropModeReplace, Window, XClassHint,
    XConfigureWindow, XDefaultRootWindow, XErrorEvent, XEvent, XFetchName, XFree, XGetClassHint,
    XGetTransientForHint, XGetWMProtocols, XInternAtom, XMapWindow, XMoveResizeWindow,
    XOpenDisplay, XRaiseWindow, XRootWindow, XScreenCount, XSelectInput, XSendEvent,
    XSetErrorHandler, XSetInputFocus, XSync, XUnmapWindow, XWindowChanges,
};

use crate::error::WmError;

/// Set by the startup exclusivity probe's error handler and checked once
/// `XSync` returns. A `BadAccess` there means another window manager
/// already holds `SubstructureRedirect`.
static OTHER_WM_DETECTED: AtomicBool = AtomicBool::new(false);

/// X protocol request opcodes from `<X11/Xproto.h>`, not part of the `x11`
/// crate's `xlib` bindings. Needed to scope which `BadMatch`/`BadDrawable`/
/// `BadAccess` errors are expected races rather than real bugs, matching
/// dwm's `xerror`.
const X_SET_INPUT_FOCUS: c_uchar = 42;
const X_CONFIGURE_WINDOW: c_uchar = 12;
const X_GRAB_BUTTON: c_uchar = 28;
const X_GRAB_KEY: c_uchar = 33;
const X_COPY_AREA: c_uchar = 62;
const X_POLY_SEGMENT: c_uchar = 66;
const X_POLY_FILL_RECTANGLE: c_uchar = 70;
const X_POLY_TEXT8: c_uchar = 74;

/// True for the exact (request, error) pairs dwm's `xerror` absorbs as
/// ordinary races with a dying window, rather than absorbing any
/// `BadMatch`/`BadDrawable`/`BadAccess` regardless of which request raised
/// it.
fn is_expected_race(request_code: c_uchar, error_code: c_uchar) -> bool {
    if error_code == xlib::BadWindow {
        return true;
    }
    match (request_code, error_code) {
        (X_SET_INPUT_FOCUS, xlib::BadMatch) => true,
        (X_POLY_TEXT8, xlib::BadDrawable) => true,
        (X_POLY_FILL_RECTANGLE, xlib::BadDrawable) => true,
        (X_POLY_SEGMENT, xlib::BadDrawable) => true,
        (X_CONFIGURE_WINDOW, xlib::BadMatch) => true,
        (X_GRAB_BUTTON, xlib::BadAccess) => true,
        (X_GRAB_KEY, xlib::BadAccess) => true,
        (X_COPY_AREA, xlib::BadDrawable) => true,
        _ => false,
    }
}

pub struct DisplayAdapter {
    pub dpy: *mut Display,
    pub root: Window,
    pub screen: c_int,
}

impl DisplayAdapter {
    /// Opens the default display. Fails only when `XOpenDisplay` itself
    /// fails or the display reports zero screens.
    pub fn open() -> Result<Self, WmError> {
        let dpy = unsafe { XOpenDisplay(ptr::null()) };
        if dpy.is_null() {
            return Err(WmError::DisplayOpenFailed);
        }
        let screen = unsafe { XScreenCount(dpy) };
        if screen <= 0 {
            return Err(WmError::NoScreens);
        }
        let root = unsafe { XDefaultRootWindow(dpy) };
        Ok(DisplayAdapter { dpy, root, screen })
    }

    /// Selects `SubstructureRedirect` under a probing error handler that
    /// flips `OTHER_WM_DETECTED` on `BadAccess`. Must be called before the
    /// real error handler is installed.
    pub fn probe_exclusivity(&self, event_mask: c_long) -> Result<(), WmError> {
        OTHER_WM_DETECTED.store(false, Ordering::SeqCst);
        unsafe {
            XSetErrorHandler(Some(probe_error_handler));
            XSelectInput(self.dpy, self.root, event_mask);
            XSync(self.dpy, 0);
        }
        if OTHER_WM_DETECTED.load(Ordering::SeqCst) {
            return Err(WmError::AnotherWmRunning);
        }
        Ok(())
    }

    /// Installs the steady-state error handler that absorbs expected races
    /// and defers everything else to the library default.
    pub fn install_error_handler(&self) {
        unsafe {
            XSetErrorHandler(Some(steady_state_error_handler));
        }
    }

    /// Installs a no-op handler, dwm's `xerrordummy`. Used to bracket
    /// sequences like `XKillClient` where the target window can vanish
    /// mid-sequence and any resulting error is meaningless.
    pub fn install_dummy_error_handler(&self) {
        unsafe {
            XSetErrorHandler(Some(dummy_error_handler));
        }
    }

    pub fn root_of_screen(&self, screen: c_int) -> Window {
        unsafe { XRootWindow(self.dpy, screen) }
    }

    pub fn select_input(&self, win: Window, mask: c_long) {
        unsafe {
            XSelectInput(self.dpy, win, mask);
        }
    }

    pub fn map_window(&self, win: Window) {
        unsafe {
            XMapWindow(self.dpy, win);
        }
    }

    pub fn unmap_window(&self, win: Window) {
        unsafe {
            XUnmapWindow(self.dpy, win);
        }
    }

    pub fn raise_window(&self, win: Window) {
        unsafe {
            XRaiseWindow(self.dpy, win);
        }
    }

    pub fn move_resize(&self, win: Window, x: i32, y: i32, w: i32, h: i32) {
        unsafe {
            XMoveResizeWindow(self.dpy, win, x, y, w.max(1) as u32, h.max(1) as u32);
        }
    }

    pub fn configure_border(&self, win: Window, bw: i32) {
        let mut wc = XWindowChanges {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            border_width: bw,
            sibling: 0,
            stack_mode: 0,
        };
        unsafe {
            XConfigureWindow(self.dpy, win, xlib::CWBorderWidth as u32, &mut wc);
        }
    }

    pub fn set_input_focus(&self, win: Window) {
        unsafe {
            XSetInputFocus(self.dpy, win, xlib::RevertToPointerRoot, xlib::CurrentTime);
        }
    }

    pub fn sync(&self) {
        unsafe {
            XSync(self.dpy, 0);
        }
    }

    /// Reads `WM_CLASS` into owned `(class, instance)` strings, falling
    /// back to `"broken"` the way dwm's `applyrules` does when a hint is
    /// absent.
    pub fn class_hint(&self, win: Window) -> (String, String) {
        let mut ch: XClassHint = unsafe { std::mem::zeroed() };
        let ok = unsafe { XGetClassHint(self.dpy, win, &mut ch) } != 0;
        let class = read_and_free(ok, ch.res_class).unwrap_or_else(|| "broken".to_string());
        let instance = read_and_free(ok, ch.res_name).unwrap_or_else(|| "broken".to_string());
        (class, instance)
    }

    /// Reads `WM_NAME` via `XFetchName`, used for rule title matching.
    /// Empty string if unset, matching dwm's `updatetitle` fallback.
    pub fn window_title(&self, win: Window) -> String {
        let mut name_ptr: *mut std::os::raw::c_char = ptr::null_mut();
        let ok = unsafe { XFetchName(self.dpy, win, &mut name_ptr) } != 0;
        read_and_free(ok, name_ptr).unwrap_or_default()
    }

    /// Resolves `WM_TRANSIENT_FOR`, returning `None` if unset.
    pub fn transient_for(&self, win: Window) -> Option<Window> {
        let mut prop: Window = 0;
        let ok = unsafe { XGetTransientForHint(self.dpy, win, &mut prop) } != 0;
        if ok && prop != 0 {
            Some(prop)
        } else {
            None
        }
    }

    /// True iff `WM_DELETE_WINDOW` is listed in the client's `WM_PROTOCOLS`.
    pub fn supports_protocol(&self, win: Window, wanted: Atom) -> bool {
        let mut protocols: *mut Atom = ptr::null_mut();
        let mut count: c_int = 0;
        let ok = unsafe { XGetWMProtocols(self.dpy, win, &mut protocols, &mut count) } != 0;
        if !ok || protocols.is_null() {
            return false;
        }
        let found = unsafe { std::slice::from_raw_parts(protocols, count as usize) }
            .iter()
            .any(|&a| a == wanted);
        unsafe {
            XFree(protocols as *mut c_void);
        }
        found
    }

    /// Sends a client message with up to 5 `i64` data words, used for
    /// `WM_TAKE_FOCUS` and `_NET_WM_STATE` round-trips.
    pub fn send_client_message(&self, win: Window, message_type: Atom, data: [c_long; 5]) {
        let mut ev: XEvent = unsafe { std::mem::zeroed() };
        ev.client_message.type_ = ClientMessage;
        ev.client_message.window = win;
        ev.client_message.message_type = message_type;
        ev.client_message.format = 32;
        ev.client_message.data.set_long(0, data[0]);
        ev.client_message.data.set_long(1, data[1]);
        ev.client_message.data.set_long(2, data[2]);
        ev.client_message.data.set_long(3, data[3]);
        ev.client_message.data.set_long(4, data[4]);
        unsafe {
            XSendEvent(self.dpy, win, 0, xlib::NoEventMask, &mut ev);
        }
    }

    /// Writes a single-atom `u32` property, used for `WM_STATE` and
    /// `_NET_WM_STATE`.
    pub fn set_atom_property(&self, win: Window, prop: Atom, typ: Atom, values: &[Atom]) {
        unsafe {
            XChangePropertyAtoms(self.dpy, win, prop, typ, values);
        }
    }

    /// Appends a window to `_NET_CLIENT_LIST` (callers rebuild the whole
    /// list on removal, matching dwm's `updateclientlist`).
    pub fn append_client_list(&self, root: Window, prop: Atom, win: Window) {
        unsafe {
            xlib::XChangeProperty(
                self.dpy,
                root,
                prop,
                xlib::XA_WINDOW,
                32,
                xlib::PropModeAppend,
                &win as *const Window as *const u8,
                1,
            );
        }
    }

    pub fn delete_property(&self, win: Window, prop: Atom) {
        unsafe {
            xlib::XDeleteProperty(self.dpy, win, prop);
        }
    }
}

unsafe fn XChangePropertyAtoms(
    dpy: *mut Display,
    win: Window,
    prop: Atom,
    typ: Atom,
    values: &[Atom],
) {
    xlib::XChangeProperty(
        dpy,
        win,
        prop,
        typ,
        32,
        PropModeReplace,
        values.as_ptr() as *const u8,
        values.len() as c_int,
    );
}

fn read_and_free(ok: bool, ptr: *mut std::os::raw::c_char) -> Option<String> {
    if !ok || ptr.is_null() {
        return None;
    }
    let s = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    unsafe {
        XFree(ptr as *mut c_void);
    }
    Some(s)
}

unsafe extern "C" fn dummy_error_handler(_dpy: *mut Display, _event: *mut XErrorEvent) -> c_int {
    0
}

unsafe extern "C" fn probe_error_handler(_dpy: *mut Display, event: *mut XErrorEvent) -> c_int {
    if (*event).error_code == BadAccess {
        OTHER_WM_DETECTED.store(true, Ordering::SeqCst);
    }
    0
}

/// The steady-state handler installed for the life of the process: absorb
/// races with dying windows, log and defer everything else.
unsafe extern "C" fn steady_state_error_handler(dpy: *mut Display, event: *mut XErrorEvent) -> c_int {
    let code = (*event).error_code;
    let request = (*event).request_code;
    if is_expected_race(request, code) {
        log::debug!(
            "absorbed X error code {} (request {}) — expected race with a dying window",
            code,
            request
        );
        return 0;
    }
    log::error!(
        "unexpected X error code {} on request {}, deferring to default handler",
        code,
        request
    );
    // SAFETY: falling through to Xlib's compiled-in default handler, which
    // typically terminates the process — matches dwm's `xerror` fallback.
    let default = xlib::XSetErrorHandler(None);
    let rc = if let Some(f) = default {
        f(dpy, event)
    } else {
        0
    };
    rc
}

/// Interns a single atom by name; used by call sites that need one ad hoc
/// atom outside of the `Atoms` registry (e.g. `UTF8_STRING`).
pub fn intern(dpy: *mut Display, name: &str) -> Atom {
    let c = std::ffi::CString::new(name).expect("atom name has no interior nul");
    unsafe { XInternAtom(dpy, c.as_ptr(), 0) }
}
