//! Focus transitions, stacking decisions, urgency, and the EWMH
//! active-window property.
use x11::xlib::Window;

use crate::wm::Wm;

impl Wm {
    /// `focus(c)`: if `c` is `None` or no longer visible, falls back to the
    /// topmost visible entry of the selected monitor's focus stack.
    /// Otherwise migrates `selmon` to the client's monitor, clears
    /// urgency, promotes it to the head of the stack, and hands off to
    /// `setfocus`. With nothing visible left, focuses the root window.
    pub fn focus(&mut self, want: Option<Window>) {
        let tagset = self.selmon().active_tagset();

        let chosen = want
            .filter(|&w| self.clients.get(&w).map_or(false, |c| c.is_visible(tagset)))
            .or_else(|| {
                self.selmon()
                    .stack
                    .iter()
                    .copied()
                    .find(|&w| self.clients.get(&w).map_or(false, |c| c.is_visible(tagset)))
            });

        if let Some(prev) = self.selmon().sel {
            if Some(prev) != chosen {
                self.unfocus(prev, false);
            }
        }

        match chosen {
            Some(win) => {
                let mon = self.clients[&win].mon;
                self.selmon = mon;
                if let Some(c) = self.clients.get_mut(&win) {
                    c.isurgent = false;
                }
                self.mons[mon].attach_stack(win);
                self.mons[mon].sel = Some(win);
                self.grab_buttons(win, true);
                self.setfocus(win);
            }
            None => {
                self.selmon_mut().sel = None;
                self.display.set_input_focus(self.display.root);
                self.display.delete_property(
                    self.display.root,
                    self.atoms.net.active_window,
                );
            }
        }
    }

    fn unfocus(&mut self, win: Window, _setfocus: bool) {
        self.grab_buttons(win, false);
    }

    /// `setfocus(c)`: no-ops on `neverfocus` clients, otherwise sets X
    /// input focus, writes `_NET_ACTIVE_WINDOW`, and always sends
    /// `WM_TAKE_FOCUS` when the client advertises ICCCM protocol support.
    pub fn setfocus(&mut self, win: Window) {
        let (neverfocus, supports_take_focus);
        {
            let c = match self.client(win) {
                Some(c) => c,
                None => return,
            };
            neverfocus = c.neverfocus;
        }
        if !neverfocus {
            self.display.set_input_focus(win);
            self.display.set_atom_property(
                self.display.root,
                self.atoms.net.active_window,
                x11::xlib::XA_WINDOW,
                &[win],
            );
        }
        supports_take_focus = self
            .display
            .supports_protocol(win, self.atoms.icccm.wm_take_focus);
        if supports_take_focus {
            self.display.send_client_message(
                win,
                self.atoms.icccm.wm_protocols,
                [self.atoms.icccm.wm_take_focus as i64, x11::xlib::CurrentTime as i64, 0, 0, 0],
            );
        }
    }

    /// Per-client button grabs: click-to-focus windows get an
    /// unconditional grab on any button; the focused window only grabs
    /// the configured modifier/button pairs.
    pub fn grab_buttons(&self, win: Window, focused: bool) {
        crate::input_grabs::grab_buttons_for_client(self, win, focused);
    }

    /// `zoom`: promotes the selected client to the master slot. If it's
    /// already the first tiled client, promotes the next tiled client
    /// instead (so repeated zoom toggles between the top two).
    pub fn zoom(&mut self) {
        let mon = self.selmon;
        let sel = match self.mons[mon].sel {
            Some(w) => w,
            None => return,
        };
        if self.clients.get(&sel).map_or(true, |c| c.isfloating) {
            return;
        }

        let tagset = self.mons[mon].active_tagset();
        let first_tiled = self.mons[mon].clients.iter().copied().find(|&w| {
            self.clients.get(&w).map_or(false, |c| !c.isfloating && c.is_visible(tagset))
        });

        let target = if first_tiled == Some(sel) {
            self.mons[mon]
                .clients
                .iter()
                .copied()
                .filter(|&w| w != sel)
                .find(|&w| {
                    self.clients
                        .get(&w)
                        .map_or(false, |c| !c.isfloating && c.is_visible(tagset))
                })
        } else {
            Some(sel)
        };

        if let Some(win) = target {
            self.pop(win);
        }
    }

    /// `pop(c)`: promote-and-focus — detach, re-attach at head of tile
    /// order, focus it, and re-arrange.
    pub fn pop(&mut self, win: Window) {
        let mon = match self.client(win) {
            Some(c) => c.mon,
            None => return,
        };
        self.mons[mon].attach(win);
        self.focus(Some(win));
        self.arrange_mon_pub(mon);
    }

    pub fn arrange_mon_pub(&mut self, mon: usize) {
        self.arrange_mon(mon);
    }

    /// `setfullscreen(c, on)`: saves/restores floating state, border
    /// width, and geometry around a fullscreen transition, and writes the
    /// EWMH `_NET_WM_STATE` atom list accordingly.
    pub fn set_fullscreen(&mut self, win: Window, on: bool) {
        let mon = match self.client(win) {
            Some(c) => c.mon,
            None => return,
        };

        let already = self.clients.get(&win).map_or(false, |c| c.isfullscreen);
        if on && !already {
            self.display.set_atom_property(
                win,
                self.atoms.net.wm_state,
                x11::xlib::XA_ATOM,
                &[self.atoms.net.wm_state_fullscreen],
            );
            let screen = self.mons[mon].screen_rect();
            if let Some(c) = self.clients.get_mut(&win) {
                c.isfullscreen = true;
                c.oldstate = c.isfloating;
                c.oldbw = c.bw;
                c.isfloating = true;
                c.bw = 0;
                c.save_geometry();
                c.x = screen.x;
                c.y = screen.y;
                c.w = screen.w;
                c.h = screen.h;
            }
            self.display.move_resize(win, screen.x, screen.y, screen.w, screen.h);
            self.display.raise_window(win);
        } else if !on && already {
            self.display
                .set_atom_property(win, self.atoms.net.wm_state, x11::xlib::XA_ATOM, &[]);
            if let Some(c) = self.clients.get_mut(&win) {
                c.isfullscreen = false;
                c.isfloating = c.oldstate;
                c.bw = c.oldbw;
                c.restore_geometry();
            }
            self.arrange_mon(mon);
        }
    }
}
