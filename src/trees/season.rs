//! Date-driven deciduous foliage state.

/// Canopy visibility and color for a calendar date.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoliageState {
    pub visible: bool,
    pub color: [f32; 3],
}

const SUMMER: [f32; 3] = [0.22, 0.45, 0.18];
const EARLY_FALL: [f32; 3] = [0.75, 0.50, 0.15];
const LATE_FALL: [f32; 3] = [0.55, 0.27, 0.10];
const SPRING: [f32; 3] = [0.38, 0.55, 0.22];

fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Foliage state for `(month, day)`, both 1-based.
///
/// May through August is full summer green; September blends toward early
/// fall, October toward late fall. Leaves drop mid November and the tree
/// stays bare until late March, when spring green fades back in through
/// April.
pub fn foliage_state(month: u32, day: u32) -> FoliageState {
    let day_t = (day.clamp(1, 31) - 1) as f32 / 30.0;
    match month {
        5..=8 => FoliageState {
            visible: true,
            color: SUMMER,
        },
        9 => FoliageState {
            visible: true,
            color: lerp(SUMMER, EARLY_FALL, day_t),
        },
        10 => FoliageState {
            visible: true,
            color: lerp(EARLY_FALL, LATE_FALL, day_t),
        },
        11 if day <= 15 => FoliageState {
            visible: true,
            color: LATE_FALL,
        },
        3 if day >= 20 => FoliageState {
            visible: true,
            color: SPRING,
        },
        4 => FoliageState {
            visible: true,
            color: lerp(SPRING, SUMMER, day_t),
        },
        _ => FoliageState {
            visible: false,
            color: LATE_FALL,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summer_is_green_and_visible() {
        let s = foliage_state(7, 15);
        assert!(s.visible);
        assert_eq!(s.color, SUMMER);
    }

    #[test]
    fn test_winter_is_bare() {
        assert!(!foliage_state(1, 10).visible);
        assert!(!foliage_state(12, 25).visible);
        assert!(!foliage_state(11, 20).visible);
    }

    #[test]
    fn test_fall_blend_progresses() {
        let early = foliage_state(9, 1);
        let late = foliage_state(9, 30);
        assert!(early.visible && late.visible);
        assert!(late.color[0] > early.color[0], "reds up through September");
        assert_eq!(early.color, SUMMER);
    }

    #[test]
    fn test_spring_returns() {
        assert!(!foliage_state(3, 10).visible);
        assert!(foliage_state(3, 25).visible);
        let mid_april = foliage_state(4, 15);
        assert!(mid_april.visible);
        assert!(mid_april.color[1] > SPRING[1].min(SUMMER[1]) - 1e-3);
    }
}
