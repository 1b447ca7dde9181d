//! Master/stack tiling with gaps. The placement arithmetic is pure (takes
//! border widths and monitor geometry, returns placements) so it can be
//! exercised without a `Monitor` or a display connection; `arrange`/
//! `arrangemon`/`showhide` in `wm.rs` thread it through the live model.

/// One tile's placement, in the same coordinate space as `Client::x/y/w/h`
/// (i.e. excluding the border itself, which X draws outside this rect).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Computes master/stack placements for `n` tiled, visible clients given
/// their border widths (in tile order). Mirrors dwm's `tile()` with the
/// gap arithmetic from SPEC_FULL.md §4.3.
pub fn tile_placements(
    bws: &[i32],
    nmaster: i32,
    mfact: f32,
    wx: i32,
    wy: i32,
    ww: i32,
    wh: i32,
    gappx: i32,
) -> Vec<Placement> {
    let n = bws.len();
    if n == 0 {
        return Vec::new();
    }

    let nm = (n as i32).min(nmaster).max(0) as usize;
    let mw = if n as i32 > nmaster {
        if nmaster > 0 {
            (ww as f32 * mfact) as i32
        } else {
            0
        }
    } else {
        ww - gappx
    };

    let mut placements = Vec::with_capacity(n);
    let mut my = gappx;
    let mut ty = gappx;

    for (i, &bw) in bws.iter().enumerate() {
        if i < nm {
            let slot_h = (wh - my) / (nm - i) as i32 - gappx;
            let x = wx + gappx;
            let y = wy + my;
            let w = mw - 2 * bw - gappx;
            let h = slot_h - 2 * bw;
            placements.push(Placement { x, y, w, h });
            if my + slot_h + gappx < wh {
                my += slot_h + gappx;
            }
        } else {
            let slot_h = (wh - ty) / (n - i) as i32 - gappx;
            let x = wx + mw + gappx;
            let y = wy + ty;
            let w = ww - mw - 2 * bw - 2 * gappx;
            let h = slot_h - 2 * bw;
            placements.push(Placement { x, y, w, h });
            if ty + slot_h + gappx < wh {
                ty += slot_h + gappx;
            }
        }
    }
    placements
}

/// The "off-screen park" position for a currently-invisible client, dwm's
/// convention of moving hidden windows far to the left rather than
/// unmapping them (keeps pixmaps alive for instant redisplay).
pub fn parked_position(outer_w: i32, y: i32) -> (i32, i32) {
    (-2 * outer_w, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    // S1: one window, no borders, gap 10, 1920x1080 usable area.
    #[test]
    fn s1_single_window_fills_minus_gaps() {
        let p = tile_placements(&[0], 1, 0.55, 0, 0, 1920, 1080, 10);
        assert_eq!(p, vec![Placement { x: 10, y: 10, w: 1900, h: 1060 }]);
    }

    // S2: two windows, nmaster=1, mfact=0.55 -> master width 1056.
    #[test]
    fn s2_two_windows_master_and_stack() {
        let p = tile_placements(&[0, 0], 1, 0.55, 0, 0, 1920, 1080, 10);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0], Placement { x: 10, y: 10, w: 1046, h: 1060 });
        assert_eq!(p[1], Placement { x: 1066, y: 10, w: 844, h: 1060 });
    }

    #[test]
    fn three_in_stack_split_evenly_top_down() {
        let p = tile_placements(&[0, 0, 0], 1, 0.5, 0, 0, 1000, 1000, 0);
        assert_eq!(p.len(), 3);
        // master takes full column
        assert_eq!(p[0].x, 0);
        assert_eq!(p[0].w, 500);
        // two stack tiles split the remaining height evenly
        assert_eq!(p[1].h, 500);
        assert_eq!(p[2].h, 500);
        assert_eq!(p[1].y, 0);
        assert_eq!(p[2].y, 500);
    }

    #[test]
    fn zero_clients_is_empty() {
        assert!(tile_placements(&[], 1, 0.55, 0, 0, 1920, 1080, 10).is_empty());
    }

    #[test]
    fn nmaster_zero_puts_everything_in_stack_column() {
        let p = tile_placements(&[0, 0], 0, 0.55, 0, 0, 1000, 1000, 0);
        // master column width is 0, so the stack column starts right at wx
        assert_eq!(p[0].x, 0);
        assert_eq!(p[1].x, 0);
    }

    #[test]
    fn parked_position_is_far_offscreen_left() {
        assert_eq!(parked_position(400, 77), (-800, 77));
    }
}
