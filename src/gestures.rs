//! Interactive mouse-driven move and resize. Both grab the pointer
//! exclusively and drain only a whitelist of event types while the grab is
//! held, since the main loop is paused for the duration of the gesture.
use std::time::{Duration, Instant};

use x11::xlib::{
    self, ButtonRelease, ConfigureRequest, CurrentTime, Expose, GrabModeAsync, MapRequest,
    MotionNotify, Window, XEvent, XMaskEvent, XQueryPointer, XUngrabPointer,
};

use crate::config;
use crate::geometry::{snap_to_edges, Rect};
use crate::wm::Wm;

/// Motion events arriving faster than 60 Hz are dropped, matching the
/// spec's `1000/60` ms rate limit.
const MOTION_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

const GESTURE_MASK: i64 =
    (xlib::ButtonPressMask | xlib::ButtonReleaseMask | xlib::PointerMotionMask) as i64;

impl Wm {
    /// Queries the pointer's current root-relative position.
    fn query_pointer(&self) -> (i32, i32) {
        let mut root_ret: Window = 0;
        let mut child_ret: Window = 0;
        let (mut root_x, mut root_y, mut win_x, mut win_y) = (0, 0, 0, 0);
        let mut mask = 0u32;
        unsafe {
            XQueryPointer(
                self.display.dpy,
                self.display.root,
                &mut root_ret,
                &mut child_ret,
                &mut root_x,
                &mut root_y,
                &mut win_x,
                &mut win_y,
                &mut mask,
            );
        }
        (root_x, root_y)
    }

    /// `movemouse`: refuses fullscreen clients, grabs the pointer, and
    /// tracks motion until `ButtonRelease`, snapping to monitor edges and
    /// promoting tiled clients to floating once displacement exceeds
    /// `snap`.
    pub fn move_mouse(&mut self, win: Window) {
        if self.clients.get(&win).map_or(true, |c| c.isfullscreen) {
            return;
        }
        let (ocx, ocy) = match self.client(win) {
            Some(c) => (c.x, c.y),
            None => return,
        };
        let (px0, py0) = self.query_pointer();

        unsafe {
            xlib::XGrabPointer(
                self.display.dpy,
                self.display.root,
                0,
                GESTURE_MASK as u32,
                GrabModeAsync,
                GrabModeAsync,
                0,
                0,
                CurrentTime,
            );
        }

        let was_tiled = self.clients.get(&win).map_or(false, |c| !c.isfloating);
        let mut last_motion = Instant::now() - MOTION_INTERVAL;

        loop {
            let mut ev: XEvent = unsafe { std::mem::zeroed() };
            unsafe {
                XMaskEvent(self.display.dpy, GESTURE_MASK, &mut ev);
            }
            let etype = unsafe { ev.type_ };
            if etype == ButtonRelease {
                break;
            }
            if etype == ConfigureRequest || etype == Expose || etype == MapRequest {
                self.dispatch_whitelisted(&ev);
                continue;
            }
            if etype == MotionNotify {
                let now = Instant::now();
                if now.duration_since(last_motion) < MOTION_INTERVAL {
                    continue;
                }
                last_motion = now;

                let motion = unsafe { ev.motion };
                let dx = motion.x_root - px0;
                let dy = motion.y_root - py0;
                let mut nx = ocx + dx;
                let mut ny = ocy + dy;

                let mon = self.client(win).map_or(self.selmon, |c| c.mon);
                let bounds = self.mons[mon].usable_rect();
                let (w, h) = self.client(win).map_or((0, 0), |c| (c.w, c.h));
                let snapped = snap_to_edges(nx, ny, w, h, &bounds, config::SNAP);
                if (nx - ocx).abs() > config::SNAP || (ny - ocy).abs() > config::SNAP {
                    if was_tiled {
                        if let Some(c) = self.clients.get_mut(&win) {
                            c.isfloating = true;
                        }
                        self.arrange_mon_pub(mon);
                    }
                }
                nx = snapped.0;
                ny = snapped.1;

                if let Some(c) = self.clients.get_mut(&win) {
                    c.x = nx;
                    c.y = ny;
                }
                self.display.move_resize(win, nx, ny, w, h);
            }
        }

        unsafe {
            XUngrabPointer(self.display.dpy, CurrentTime);
        }
        self.reparent_after_gesture(win);
    }

    /// `resizemouse`: same gesture loop, but drives `w`/`h` from pointer
    /// displacement and routes the result through the size-hint
    /// application so floating clients still honor aspect/increment
    /// constraints.
    pub fn resize_mouse(&mut self, win: Window) {
        if self.clients.get(&win).map_or(true, |c| c.isfullscreen) {
            return;
        }
        let (ocx, ocy, ow, oh, bw, hints) = match self.client(win) {
            Some(c) => (c.x, c.y, c.w, c.h, c.bw, c.hints),
            None => return,
        };
        let (px0, py0) = self.query_pointer();

        unsafe {
            xlib::XGrabPointer(
                self.display.dpy,
                self.display.root,
                0,
                GESTURE_MASK as u32,
                GrabModeAsync,
                GrabModeAsync,
                0,
                0,
                CurrentTime,
            );
        }

        let mut last_motion = Instant::now() - MOTION_INTERVAL;
        loop {
            let mut ev: XEvent = unsafe { std::mem::zeroed() };
            unsafe {
                XMaskEvent(self.display.dpy, GESTURE_MASK, &mut ev);
            }
            let etype = unsafe { ev.type_ };
            if etype == ButtonRelease {
                break;
            }
            if etype == ConfigureRequest || etype == Expose || etype == MapRequest {
                self.dispatch_whitelisted(&ev);
                continue;
            }
            if etype == MotionNotify {
                let now = Instant::now();
                if now.duration_since(last_motion) < MOTION_INTERVAL {
                    continue;
                }
                last_motion = now;

                let motion = unsafe { ev.motion };
                let nw = (ow + (motion.x_root - px0)).max(1);
                let nh = (oh + (motion.y_root - py0)).max(1);

                let mon = self.client(win).map_or(self.selmon, |c| c.mon);
                let bh = self.mons[mon].bh;
                let (_, _, w, h, _) =
                    crate::client::apply_size_hints(ocx, ocy, nw, nh, bw, &hints, bh, true);

                if let Some(c) = self.clients.get_mut(&win) {
                    c.w = w;
                    c.h = h;
                }
                self.display.move_resize(win, ocx, ocy, w, h);
            }
        }

        unsafe {
            XUngrabPointer(self.display.dpy, CurrentTime);
        }
        self.reparent_after_gesture(win);
    }

    /// On release, if the client's new centroid lies on a different
    /// monitor, it migrates there.
    fn reparent_after_gesture(&mut self, win: Window) {
        let (cx, cy, cur_mon) = match self.client(win) {
            Some(c) => {
                let (cx, cy) = Rect::new(c.x, c.y, c.w, c.h).center();
                (cx, cy, c.mon)
            }
            None => return,
        };
        let target = self.mon_index_of_point(cx, cy);
        if target != cur_mon {
            self.send_client_to_mon(win, target);
        }
    }

    /// Drains the restricted event set the interactive gestures allow to
    /// flow through while the pointer is grabbed, so `ConfigureRequest`/
    /// `MapRequest` from other clients don't stall behind the gesture.
    fn dispatch_whitelisted(&mut self, ev: &XEvent) {
        crate::events::dispatch_one(self, ev);
    }
}
