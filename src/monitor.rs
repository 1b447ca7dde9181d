//! One physical/logical screen, its tiling/focus-stack orderings and tag
//! state.
use x11::xlib::Window;

use crate::geometry::Rect;

/// A monitor's ordered client lists are identity-keyed `Vec<Window>`s rather
/// than intrusive pointers (see DESIGN.md / SPEC_FULL.md §9) — the real
/// per-window state lives in the `Wm`-level client arena, keyed by the same
/// `Window` handle.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub num: usize,

    pub mx: i32,
    pub my: i32,
    pub mw: i32,
    pub mh: i32,

    pub wx: i32,
    pub wy: i32,
    pub ww: i32,
    pub wh: i32,

    pub bh: i32,
    pub by: i32,
    pub barwin: Option<Window>,
    pub traywin: Option<Window>,

    pub mfact: f32,
    pub nmaster: i32,
    pub gappx: i32,

    pub tagset: [u32; 2],
    pub seltags: usize,

    /// Tile order: the order windows were mapped, head-inserted on attach.
    pub clients: Vec<Window>,
    /// Focus-stack order: most-recently-focused first.
    pub stack: Vec<Window>,
    pub sel: Option<Window>,
}

impl Monitor {
    pub fn new(num: usize, screen: Rect, mfact: f32, nmaster: i32, gappx: i32) -> Self {
        Monitor {
            num,
            mx: screen.x,
            my: screen.y,
            mw: screen.w,
            mh: screen.h,
            wx: screen.x,
            wy: screen.y,
            ww: screen.w,
            wh: screen.h,
            bh: 0,
            by: screen.y,
            barwin: None,
            traywin: None,
            mfact,
            nmaster,
            gappx,
            tagset: [1, 1],
            seltags: 0,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
        }
    }

    pub fn screen_rect(&self) -> Rect {
        Rect::new(self.mx, self.my, self.mw, self.mh)
    }

    pub fn usable_rect(&self) -> Rect {
        Rect::new(self.wx, self.wy, self.ww, self.wh)
    }

    pub fn active_tagset(&self) -> u32 {
        self.tagset[self.seltags]
    }

    /// Recomputes the usable area from the full screen rectangle and the
    /// current bar height, keeping the bar pinned to the top.
    pub fn recompute_usable(&mut self) {
        self.wy = self.my + self.bh;
        self.wh = self.mh - self.bh;
        self.wx = self.mx;
        self.ww = self.mw;
        self.by = self.my;
    }

    /// Attaches a window at the head of tile order.
    pub fn attach(&mut self, win: Window) {
        self.clients.retain(|&w| w != win);
        self.clients.insert(0, win);
    }

    pub fn detach(&mut self, win: Window) {
        self.clients.retain(|&w| w != win);
    }

    /// Attaches a window at the head of focus-stack order.
    pub fn attach_stack(&mut self, win: Window) {
        self.stack.retain(|&w| w != win);
        self.stack.insert(0, win);
    }

    pub fn detach_stack(&mut self, win: Window) {
        self.stack.retain(|&w| w != win);
        if self.sel == Some(win) {
            self.sel = self.stack.first().copied();
        }
    }

    pub fn contains_client(&self, win: Window) -> bool {
        self.clients.contains(&win)
    }

    /// Toggles the double-buffered tagset selector, implementing "last view
    /// recall": `view(A); view(B); view(A)` ends back on A.
    pub fn toggle_view_buffer(&mut self) {
        self.seltags ^= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mon() -> Monitor {
        Monitor::new(0, Rect::new(0, 0, 1920, 1080), 0.55, 1, 10)
    }

    #[test]
    fn attach_inserts_at_head() {
        let mut m = mon();
        m.attach(1);
        m.attach(2);
        m.attach(3);
        assert_eq!(m.clients, vec![3, 2, 1]);
    }

    #[test]
    fn detach_removes_single_occurrence() {
        let mut m = mon();
        m.attach(1);
        m.attach(2);
        m.detach(1);
        assert_eq!(m.clients, vec![2]);
    }

    #[test]
    fn double_buffered_view_recall() {
        let mut m = mon();
        m.tagset = [1, 1];
        m.seltags = 0;
        // view(A=2)
        m.toggle_view_buffer();
        m.tagset[m.seltags] = 2;
        assert_eq!(m.active_tagset(), 2);
        // view(B=4)
        m.toggle_view_buffer();
        m.tagset[m.seltags] = 4;
        assert_eq!(m.active_tagset(), 4);
        // view(A) recall: toggling back reveals the buffered value, 2
        m.toggle_view_buffer();
        assert_eq!(m.active_tagset(), 2);
    }

    #[test]
    fn detach_stack_promotes_next_as_sel() {
        let mut m = mon();
        m.attach_stack(1);
        m.attach_stack(2);
        m.sel = Some(1);
        m.detach_stack(1);
        assert_eq!(m.sel, Some(2));
    }
}
