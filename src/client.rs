//! Per-window state record and ICCCM size-hint cache/application.
use x11::xlib::Window;

/// Cache of `WM_NORMAL_HINTS`, ICCCM 4.1.2.3. Aspect ratios are stored as
/// `min = y/x` and `max = x/y`, matching the spec's convention; `0.0` means
/// "unset" for both the aspect fields and the increment/size fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHints {
    pub basew: i32,
    pub baseh: i32,
    pub incw: i32,
    pub inch: i32,
    pub maxw: i32,
    pub maxh: i32,
    pub minw: i32,
    pub minh: i32,
    pub mina: f32,
    pub maxa: f32,
}

impl SizeHints {
    /// A client is "fixed" when its min and max size agree on both axes.
    pub fn is_fixed(&self) -> bool {
        self.maxw > 0 && self.maxw == self.minw && self.maxh == self.minh
    }
}

/// Applies the ICCCM 4.1.2.3 size-hint algorithm in place. Returns `true`
/// iff the candidate geometry changed. This is deliberately X-free: the
/// monitor-edge clamping done during adoption, `ConfigureRequest` handling,
/// and interactive gestures is a separate concern (see `geometry.rs`).
pub fn apply_size_hints(
    x: i32,
    y: i32,
    mut w: i32,
    mut h: i32,
    bw: i32,
    hints: &SizeHints,
    bar_height: i32,
    respect_hints: bool,
) -> (i32, i32, i32, i32, bool) {
    let (orig_w, orig_h) = (w, h);
    w = w.max(1);
    h = h.max(1);
    if h < bar_height {
        h = bar_height;
    }
    if w < bar_height {
        w = bar_height;
    }

    if respect_hints {
        let base_is_min = hints.basew == hints.minw && hints.baseh == hints.minh;
        if !base_is_min {
            w -= hints.basew;
            h -= hints.baseh;
        }

        if hints.mina > 0.0 && hints.maxa > 0.0 {
            if hints.maxa < w as f32 / h as f32 {
                w = (h as f32 * hints.maxa + 0.5) as i32;
            } else if hints.mina < h as f32 / w as f32 {
                h = (w as f32 * hints.mina + 0.5) as i32;
            }
        }

        if base_is_min {
            w -= hints.basew;
            h -= hints.baseh;
        }

        if hints.incw > 0 {
            w -= w % hints.incw;
        }
        if hints.inch > 0 {
            h -= h % hints.inch;
        }

        w = (w + hints.basew).max(hints.minw);
        h = (h + hints.baseh).max(hints.minh);
        if hints.maxw > 0 {
            w = w.min(hints.maxw);
        }
        if hints.maxh > 0 {
            h = h.min(hints.maxh);
        }
    }
    let _ = bw; // border width participates only in the caller's outer-geometry math.
    (x, y, w, h, w != orig_w || h != orig_h)
}

/// One managed top-level X window.
#[derive(Debug, Clone)]
pub struct Client {
    pub win: Window,
    pub name: String,

    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub oldx: i32,
    pub oldy: i32,
    pub oldw: i32,
    pub oldh: i32,
    pub bw: i32,
    pub oldbw: i32,

    pub hints: SizeHints,

    pub tags: u32,

    pub isfixed: bool,
    pub isfloating: bool,
    pub isurgent: bool,
    pub neverfocus: bool,
    pub oldstate: bool,
    pub isfullscreen: bool,

    pub mon: usize,
}

impl Client {
    pub fn new(win: Window, x: i32, y: i32, w: i32, h: i32, bw: i32, mon: usize) -> Self {
        Client {
            win,
            name: String::new(),
            x,
            y,
            w,
            h,
            oldx: x,
            oldy: y,
            oldw: w,
            oldh: h,
            bw,
            oldbw: bw,
            hints: SizeHints::default(),
            tags: 0,
            isfixed: false,
            isfloating: false,
            isurgent: false,
            neverfocus: false,
            oldstate: false,
            isfullscreen: false,
            mon,
        }
    }

    /// Outer width including both borders, dwm's `WIDTH` macro.
    pub fn outer_w(&self) -> i32 {
        self.w + 2 * self.bw
    }

    /// Outer height including both borders, dwm's `HEIGHT` macro.
    pub fn outer_h(&self) -> i32 {
        self.h + 2 * self.bw
    }

    pub fn is_visible(&self, tagset: u32) -> bool {
        self.tags & tagset != 0
    }

    /// Saves current geometry/floating state before a fullscreen transition
    /// or a floating toggle so it can be restored later.
    pub fn save_geometry(&mut self) {
        self.oldx = self.x;
        self.oldy = self.y;
        self.oldw = self.w;
        self.oldh = self.h;
    }

    pub fn restore_geometry(&mut self) {
        self.x = self.oldx;
        self.y = self.oldy;
        self.w = self.oldw;
        self.h = self.oldh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_hints_just_clamps_minimum() {
        let hints = SizeHints::default();
        let (_, _, w, h, changed) = apply_size_hints(0, 0, 0, 0, 0, &hints, 0, false);
        assert!(changed);
        assert_eq!((w, h), (1, 1));
    }

    #[test]
    fn increment_rounds_down_to_base_plus_multiple() {
        let hints = SizeHints {
            basew: 10,
            baseh: 10,
            incw: 20,
            inch: 20,
            minw: 10,
            minh: 10,
            ..Default::default()
        };
        let (_, _, w, h, _) = apply_size_hints(0, 0, 55, 55, 0, &hints, 0, true);
        // 55 - 10 = 45, 45 - (45 % 20) = 40, + 10 = 50
        assert_eq!((w, h), (50, 50));
    }

    #[test]
    fn max_size_is_enforced() {
        let hints = SizeHints {
            maxw: 100,
            maxh: 100,
            ..Default::default()
        };
        let (_, _, w, h, _) = apply_size_hints(0, 0, 500, 500, 0, &hints, 0, true);
        assert_eq!((w, h), (100, 100));
    }

    #[test]
    fn idempotent_application() {
        let hints = SizeHints {
            basew: 16,
            baseh: 16,
            incw: 8,
            inch: 8,
            minw: 16,
            minh: 16,
            maxw: 800,
            maxh: 600,
            ..Default::default()
        };
        let (_, _, w1, h1, _) = apply_size_hints(0, 0, 333, 271, 0, &hints, 0, true);
        let (_, _, w2, h2, _) = apply_size_hints(0, 0, w1, h1, 0, &hints, 0, true);
        assert_eq!((w1, h1), (w2, h2));
    }

    #[test]
    fn is_fixed_requires_equal_min_max_on_both_axes() {
        let mut hints = SizeHints {
            minw: 100,
            maxw: 100,
            minh: 100,
            maxh: 100,
            ..Default::default()
        };
        assert!(hints.is_fixed());
        hints.maxh = 200;
        assert!(!hints.is_fixed());
    }
}
