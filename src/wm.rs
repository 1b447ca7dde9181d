//! The `Wm` context struct: every piece of what dwm keeps as file-scope
//! globals (`mons`, `selmon`, `running`, `numlockmask`, the display handle,
//! atom tables) bundled into one value threaded through every handler, per
//! SPEC_FULL.md §9. This is what makes the rest of the crate testable
//! without a live X connection — only this struct and `events.rs`/
//! `lifecycle.rs`/`gestures.rs` touch `DisplayAdapter` directly.
use std::collections::HashMap;

use x11::xlib::Window;

use crate::atoms::{Atoms, WM_STATE_NORMAL, WM_STATE_WITHDRAWN};
use crate::client::Client;
use crate::config;
use crate::display::DisplayAdapter;
use crate::error::WmError;
use crate::geometry::Rect;
use crate::input::ComboState;
use crate::layout;
use crate::monitor::Monitor;
use crate::rules;

pub struct Wm {
    pub display: DisplayAdapter,
    pub atoms: Atoms,
    pub wmcheckwin: Window,

    pub mons: Vec<Monitor>,
    pub selmon: usize,

    pub clients: HashMap<Window, Client>,

    pub numlockmask: u32,
    pub combo: ComboState,
    pub running: bool,
}

impl Wm {
    /// `TAGMASK`: the set of valid tag bits, derived from `config::TAGS`.
    pub fn tagmask() -> u32 {
        (1u32 << config::TAGS.len()) - 1
    }

    pub fn selmon(&self) -> &Monitor {
        &self.mons[self.selmon]
    }

    pub fn selmon_mut(&mut self) -> &mut Monitor {
        &mut self.mons[self.selmon]
    }

    pub fn client(&self, win: Window) -> Option<&Client> {
        self.clients.get(&win)
    }

    pub fn client_mut(&mut self, win: Window) -> Option<&mut Client> {
        self.clients.get_mut(&win)
    }

    /// Finds the monitor whose screen rectangle contains `win`'s frame, or
    /// the monitor owning `win` if it's a managed client. Falls back to
    /// `selmon` as dwm's `wintomon` does for the root window.
    pub fn mon_index_of_point(&self, x: i32, y: i32) -> usize {
        self.mons
            .iter()
            .find(|m| m.screen_rect().contains_point(x, y))
            .map(|m| m.num)
            .unwrap_or(self.selmon)
    }

    pub fn mon_of_window(&self, win: Window) -> Option<usize> {
        if let Some(c) = self.client(win) {
            return Some(c.mon);
        }
        self.mons
            .iter()
            .find(|m| m.barwin == Some(win) || m.traywin == Some(win))
            .map(|m| m.num)
    }

    /// Re-runs the layout engine on one monitor: `showhide` then `tile`
    /// then `restack`, as specified.
    pub fn arrange_mon(&mut self, mon: usize) {
        self.showhide(mon);
        self.tile(mon);
        self.restack(mon);
    }

    pub fn arrange_all(&mut self) {
        for i in 0..self.mons.len() {
            self.arrange_mon(i);
        }
    }

    /// `showhide`: visible clients are moved on-screen (and resized via
    /// hints if floating); invisible ones are parked off-screen. Processed
    /// in focus-stack order, top (most-recently-focused) first, matching
    /// the recursive top-down walk in the spec.
    fn showhide(&mut self, mon: usize) {
        let tagset = self.mons[mon].active_tagset();
        let stack = self.mons[mon].stack.clone();
        for win in stack {
            let respect_hints = config::RESIZE_HINTS;
            let visible = self.clients.get(&win).map_or(false, |c| c.is_visible(tagset));
            if visible {
                let (x, y) = {
                    let c = &self.clients[&win];
                    (c.x, c.y)
                };
                self.display.move_resize(
                    win,
                    x,
                    y,
                    self.clients[&win].w,
                    self.clients[&win].h,
                );
                let should_resize = {
                    let c = &self.clients[&win];
                    (c.isfloating || true) && !c.isfullscreen
                };
                if should_resize {
                    self.apply_hints_to_client(win, respect_hints);
                }
            } else {
                let (outer_w, y) = {
                    let c = &self.clients[&win];
                    (c.outer_w(), c.y)
                };
                let (px, py) = layout::parked_position(outer_w, y);
                self.display.move_resize(
                    win,
                    px,
                    py,
                    self.clients[&win].w,
                    self.clients[&win].h,
                );
            }
        }
    }

    fn apply_hints_to_client(&mut self, win: Window, respect: bool) {
        let bh = self.mons[self.client(win).map_or(self.selmon, |c| c.mon)].bh;
        if let Some(c) = self.clients.get_mut(&win) {
            let (x, y, w, h, _changed) = crate::client::apply_size_hints(
                c.x, c.y, c.w, c.h, c.bw, &c.hints, bh, respect || c.isfloating,
            );
            c.x = x;
            c.y = y;
            c.w = w;
            c.h = h;
        }
    }

    /// Runs the layout engine on one monitor's tiled, visible clients and
    /// pushes the resulting geometry to X.
    fn tile(&mut self, mon: usize) {
        let tagset = self.mons[mon].active_tagset();
        let tiled: Vec<Window> = self.mons[mon]
            .clients
            .iter()
            .copied()
            .filter(|&w| {
                self.clients
                    .get(&w)
                    .map_or(false, |c| !c.isfloating && c.is_visible(tagset))
            })
            .collect();
        if tiled.is_empty() {
            return;
        }

        let bws: Vec<i32> = tiled.iter().map(|w| self.clients[w].bw).collect();
        let m = &self.mons[mon];
        let placements = layout::tile_placements(
            &bws, m.nmaster, m.mfact, m.wx, m.wy, m.ww, m.wh, m.gappx,
        );

        let bh = self.mons[mon].bh;
        for (i, (win, p)) in tiled.iter().zip(placements.iter()).enumerate() {
            let bw = bws[i];
            let (x, y, w, h, _) = if let Some(c) = self.clients.get(win) {
                crate::client::apply_size_hints(p.x, p.y, p.w, p.h, bw, &c.hints, bh, config::RESIZE_HINTS)
            } else {
                (p.x, p.y, p.w, p.h, false)
            };
            if let Some(c) = self.clients.get_mut(win) {
                c.x = x;
                c.y = y;
                c.w = w;
                c.h = h;
            }
            self.display.move_resize(*win, x, y, w, h);
            self.display.configure_border(*win, bw);
        }
    }

    /// `restack`: raise a floating selection, sync, and let already-queued
    /// `EnterNotify` events drain on the next dispatch pass rather than
    /// bouncing focus back and forth.
    fn restack(&mut self, mon: usize) {
        let sel = self.mons[mon].sel;
        if let Some(win) = sel {
            let floating = self.clients.get(&win).map_or(false, |c| c.isfloating);
            if floating {
                self.display.raise_window(win);
            }
        }
        self.display.sync();
    }

    /// Adopts an existing rectangle set into the monitor list, per
    /// `updategeom` in SPEC_FULL.md §4.6. Orphaned clients migrate to the
    /// first surviving monitor rather than being destroyed.
    pub fn update_geom(&mut self, screens: Vec<Rect>) {
        let unique = crate::geometry::unique_rects(&screens);

        if unique.len() > self.mons.len() {
            for (i, r) in unique.iter().enumerate().skip(self.mons.len()) {
                let mut m = Monitor::new(i, *r, config::MFACT, config::NMASTER, config::GAPPX);
                m.recompute_usable();
                self.mons.push(m);
            }
        }

        for (i, r) in unique.iter().enumerate() {
            if i >= self.mons.len() {
                break;
            }
            if self.mons[i].screen_rect() != *r {
                self.mons[i].mx = r.x;
                self.mons[i].my = r.y;
                self.mons[i].mw = r.w;
                self.mons[i].mh = r.h;
                self.mons[i].recompute_usable();
            }
        }

        while self.mons.len() > unique.len().max(1) {
            let removed = self.mons.pop().unwrap();
            for win in removed.clients {
                if let Some(c) = self.clients.get_mut(&win) {
                    c.mon = 0;
                }
                self.mons[0].attach(win);
                self.mons[0].attach_stack(win);
            }
            if self.selmon >= self.mons.len() {
                self.selmon = 0;
            }
        }

        self.arrange_all();
    }

    /// Relocates a client to a different monitor's head (used by rules and
    /// `tagmon`), preserving tags but re-clamping geometry on arrange.
    pub fn send_client_to_mon(&mut self, win: Window, target: usize) {
        if target >= self.mons.len() {
            return;
        }
        let src = match self.client(win) {
            Some(c) => c.mon,
            None => return,
        };
        if src == target {
            return;
        }
        self.mons[src].detach(win);
        self.mons[src].detach_stack(win);
        if let Some(c) = self.clients.get_mut(&win) {
            c.mon = target;
        }
        self.mons[target].attach(win);
        self.mons[target].attach_stack(win);
        self.arrange_mon(src);
        self.arrange_mon(target);
    }

    /// Applies the compile-time rule table to a freshly-managed client,
    /// OR-ing in tags, setting floating, and relocating if a rule names a
    /// monitor, per SPEC_FULL.md §4.5.
    pub fn apply_rules_to(&mut self, win: Window) {
        let (class, instance) = self.display.class_hint(win);
        let title = self.client(win).map(|c| c.name.clone()).unwrap_or_default();
        let outcome = rules::apply_rules(config::RULES, &class, &instance, &title);

        let current_tagset = self.mons[self.client(win).map_or(self.selmon, |c| c.mon)]
            .active_tagset();
        let tags = rules::resolve_tags(outcome.tags, Self::tagmask(), current_tagset);

        if let Some(c) = self.clients.get_mut(&win) {
            c.tags = tags;
            if outcome.isfloating {
                c.isfloating = true;
            }
        }
        if let Some(target) = outcome.monitor {
            self.send_client_to_mon(win, target);
        }
    }

    /// Marks a window's ICCCM `WM_STATE` (Withdrawn/Normal/Iconic).
    pub fn set_wm_state(&self, win: Window, state: i64) {
        self.display
            .set_atom_property(win, self.atoms.icccm.wm_state, self.atoms.icccm.wm_state, &[
                state as u64,
                0,
            ]);
    }

    pub fn withdraw(&self, win: Window) {
        self.set_wm_state(win, WM_STATE_WITHDRAWN);
    }

    pub fn mark_normal(&self, win: Window) {
        self.set_wm_state(win, WM_STATE_NORMAL);
    }

    /// Rebuilds `_NET_CLIENT_LIST` from scratch across every monitor, in
    /// tile order. Simpler than dwm's incremental append/delete dance, and
    /// still upholds invariant I2 (the list is a permutation of all
    /// clients) on every call.
    pub fn update_client_list(&self) {
        self.display.delete_property(self.display.root, self.atoms.net.client_list);
        for m in &self.mons {
            for &win in &m.clients {
                self.display
                    .append_client_list(self.display.root, self.atoms.net.client_list, win);
            }
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }
}

pub fn bootstrap() -> Result<Wm, WmError> {
    crate::lifecycle::setup()
}
