//! Screen-edge tracking for bounded entities.
//!
//! The [`BoundsTracker`] clamps an entity's position against the visible play
//! field and reports which edges it exceeded as a [`BoundsFlags`] set.
//!
//! # Flags
//!
//! Flags are recomputed from scratch on every evaluation; they never accumulate
//! across ticks. An empty set means the entity is on screen.
//!
//! # Keep-on-screen
//!
//! When a [`BoundsBinding`] has `keep_on_screen` set and any edge is exceeded,
//! the clamped position is applied and the flags are reset to on-screen in the
//! same evaluation. Logic that reads the flags afterwards sees "on screen", not
//! the edge that triggered the clamp.
//!
//! # Example
//!
//! ```
//! use skystrike_core::bounds::{compute, BoundsFlags, BoundsMode};
//! use glam::Vec2;
//!
//! let (clamped, flags) = compute(Vec2::new(11.0, 0.0), 10.0, 6.0, 0.5, BoundsMode::Outset);
//! assert_eq!(clamped.x, 10.5);
//! assert!(flags.loc_is(BoundsFlags::OFF_RIGHT));
//! ```

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which screen edges an entity currently exceeds.
    ///
    /// The empty set is the on-screen state (see [`BoundsFlags::ON_SCREEN`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct BoundsFlags: u8 {
        /// Past the right edge.
        const OFF_RIGHT = 0b0001;
        /// Past the left edge.
        const OFF_LEFT = 0b0010;
        /// Past the top edge.
        const OFF_UP = 0b0100;
        /// Past the bottom edge.
        const OFF_DOWN = 0b1000;
    }
}

impl BoundsFlags {
    /// The on-screen state: no edge exceeded.
    pub const ON_SCREEN: Self = Self::empty();

    /// Returns `true` if no edge is exceeded.
    #[must_use]
    pub fn is_on_screen(self) -> bool {
        self.is_empty()
    }

    /// Tests a location query against these flags.
    ///
    /// Querying [`BoundsFlags::ON_SCREEN`] defers to [`is_on_screen`](Self::is_on_screen);
    /// any other query is satisfied when every queried edge is set.
    #[must_use]
    pub fn loc_is(self, query: Self) -> bool {
        if query.is_empty() {
            return self.is_on_screen();
        }
        self.contains(query)
    }
}

/// How an entity's radius adjusts the effective screen boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundsMode {
    /// The entity's center is tested against the raw edge.
    #[default]
    Center,
    /// The boundary is pulled in by the radius (entity stays fully visible).
    Inset,
    /// The boundary is pushed out by the radius (entity fully leaves before flagging).
    Outset,
}

impl BoundsMode {
    /// Returns the signed adjustment added to each half extent.
    #[must_use]
    pub fn adjustment(self, radius: f32) -> f32 {
        match self {
            Self::Center => 0.0,
            Self::Inset => -radius,
            Self::Outset => radius,
        }
    }
}

/// Half extents of the visible play field, centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenExtents {
    /// Half of the visible width.
    pub half_width: f32,
    /// Half of the visible height.
    pub half_height: f32,
}

impl ScreenExtents {
    /// Creates extents from half width and half height.
    #[must_use]
    pub const fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Derives extents from an orthographic camera size and aspect ratio.
    ///
    /// The orthographic size is the half height; the half width follows from
    /// the aspect ratio.
    #[must_use]
    pub fn from_orthographic(size: f32, aspect: f32) -> Self {
        Self::new(size * aspect, size)
    }

    /// Returns the half extents as a vector.
    #[must_use]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }
}

impl Default for ScreenExtents {
    fn default() -> Self {
        // 60 × 80 portrait field (3:4)
        Self::from_orthographic(40.0, 0.75)
    }
}

/// Per-entity bounds configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsBinding {
    /// Entity radius used by the inset/outset modes.
    pub radius: f32,
    /// How the radius adjusts the boundary.
    pub mode: BoundsMode,
    /// Clamp the entity back on screen instead of letting it leave.
    pub keep_on_screen: bool,
}

impl BoundsBinding {
    /// A binding that clamps the entity inside the screen.
    #[must_use]
    pub const fn kept(radius: f32, mode: BoundsMode) -> Self {
        Self {
            radius,
            mode,
            keep_on_screen: true,
        }
    }

    /// A binding that only reports edges and lets the entity leave.
    #[must_use]
    pub const fn free(radius: f32, mode: BoundsMode) -> Self {
        Self {
            radius,
            mode,
            keep_on_screen: false,
        }
    }
}

/// Clamps `position` against the screen and reports the exceeded edges.
///
/// Each axis is tested independently against `±(half_extent + adjustment)`,
/// where the adjustment comes from `mode`. The returned position is the
/// clamped one; callers decide whether to apply it.
#[must_use]
pub fn compute(
    position: Vec2,
    half_width: f32,
    half_height: f32,
    radius: f32,
    mode: BoundsMode,
) -> (Vec2, BoundsFlags) {
    let adjust = mode.adjustment(radius);
    let limit_x = half_width + adjust;
    let limit_y = half_height + adjust;

    let mut clamped = position;
    let mut flags = BoundsFlags::ON_SCREEN;

    if clamped.x > limit_x {
        clamped.x = limit_x;
        flags |= BoundsFlags::OFF_RIGHT;
    }
    if clamped.x < -limit_x {
        clamped.x = -limit_x;
        flags |= BoundsFlags::OFF_LEFT;
    }
    if clamped.y > limit_y {
        clamped.y = limit_y;
        flags |= BoundsFlags::OFF_UP;
    }
    if clamped.y < -limit_y {
        clamped.y = -limit_y;
        flags |= BoundsFlags::OFF_DOWN;
    }

    (clamped, flags)
}

/// Result of evaluating one entity against the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsOutcome {
    /// Position the entity should have after evaluation.
    pub position: Vec2,
    /// Flags the entity should carry after evaluation.
    pub flags: BoundsFlags,
}

/// Applies [`compute`] with the session's screen extents and keep-on-screen policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsTracker {
    extents: ScreenExtents,
}

impl BoundsTracker {
    /// Creates a tracker for the given screen extents.
    #[must_use]
    pub const fn new(extents: ScreenExtents) -> Self {
        Self { extents }
    }

    /// Returns the extents this tracker clamps against.
    #[must_use]
    pub const fn extents(&self) -> ScreenExtents {
        self.extents
    }

    /// Evaluates `position` under `binding`.
    ///
    /// Without keep-on-screen the position is left untouched and the flags
    /// report the exceeded edges. With keep-on-screen and any edge exceeded,
    /// the clamped position is returned and the flags are reset.
    #[must_use]
    pub fn evaluate(&self, position: Vec2, binding: &BoundsBinding) -> BoundsOutcome {
        let (clamped, flags) = compute(
            position,
            self.extents.half_width,
            self.extents.half_height,
            binding.radius,
            binding.mode,
        );

        if binding.keep_on_screen && !flags.is_on_screen() {
            return BoundsOutcome {
                position: clamped,
                flags: BoundsFlags::ON_SCREEN,
            };
        }

        BoundsOutcome { position, flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HALF_W: f32 = 10.0;
    const HALF_H: f32 = 6.0;
    const RADIUS: f32 = 0.5;

    mod flag_tests {
        use super::*;

        #[test]
        fn empty_is_on_screen() {
            assert!(BoundsFlags::ON_SCREEN.is_on_screen());
            assert!(BoundsFlags::ON_SCREEN.loc_is(BoundsFlags::ON_SCREEN));
        }

        #[test]
        fn combined_query_requires_every_edge() {
            let flags = BoundsFlags::OFF_RIGHT | BoundsFlags::OFF_UP;
            assert!(flags.loc_is(BoundsFlags::OFF_RIGHT));
            assert!(flags.loc_is(BoundsFlags::OFF_UP));
            assert!(flags.loc_is(BoundsFlags::OFF_RIGHT | BoundsFlags::OFF_UP));
            assert!(!flags.loc_is(BoundsFlags::OFF_RIGHT | BoundsFlags::OFF_DOWN));
            assert!(!flags.loc_is(BoundsFlags::ON_SCREEN));
        }

        #[test]
        fn on_screen_query_matches_is_on_screen_for_all_combinations() {
            for bits in 0u8..16 {
                let flags = BoundsFlags::from_bits_truncate(bits);
                assert_eq!(flags.is_on_screen(), bits == 0);
                assert_eq!(flags.loc_is(BoundsFlags::ON_SCREEN), flags.is_on_screen());
            }
        }

        #[test]
        fn serialization_roundtrip() {
            let flags = BoundsFlags::OFF_LEFT | BoundsFlags::OFF_DOWN;
            let json = serde_json::to_string(&flags).unwrap();
            let back: BoundsFlags = serde_json::from_str(&json).unwrap();
            assert_eq!(flags, back);
        }
    }

    mod compute_tests {
        use super::*;

        #[test]
        fn outset_clamps_right_edge() {
            let (clamped, flags) =
                compute(Vec2::new(11.0, 0.0), HALF_W, HALF_H, RADIUS, BoundsMode::Outset);
            assert_eq!(clamped, Vec2::new(10.5, 0.0));
            assert_eq!(flags, BoundsFlags::OFF_RIGHT);
        }

        #[test]
        fn inset_pulls_boundary_in() {
            let (clamped, flags) =
                compute(Vec2::new(9.8, 0.0), HALF_W, HALF_H, RADIUS, BoundsMode::Inset);
            assert_eq!(clamped.x, 9.5);
            assert_eq!(flags, BoundsFlags::OFF_RIGHT);
        }

        #[test]
        fn center_uses_raw_edge() {
            let (clamped, flags) =
                compute(Vec2::new(0.0, -6.2), HALF_W, HALF_H, RADIUS, BoundsMode::Center);
            assert_eq!(clamped.y, -6.0);
            assert_eq!(flags, BoundsFlags::OFF_DOWN);
        }

        #[test]
        fn corner_sets_both_axes() {
            let (clamped, flags) =
                compute(Vec2::new(-20.0, 20.0), HALF_W, HALF_H, RADIUS, BoundsMode::Center);
            assert_eq!(clamped, Vec2::new(-10.0, 6.0));
            assert_eq!(flags, BoundsFlags::OFF_LEFT | BoundsFlags::OFF_UP);
        }

        #[test]
        fn inside_is_unchanged() {
            let pos = Vec2::new(3.0, -2.0);
            let (clamped, flags) = compute(pos, HALF_W, HALF_H, RADIUS, BoundsMode::Inset);
            assert_eq!(clamped, pos);
            assert!(flags.is_on_screen());
        }
    }

    mod tracker_tests {
        use super::*;

        fn tracker() -> BoundsTracker {
            BoundsTracker::new(ScreenExtents::new(HALF_W, HALF_H))
        }

        #[test]
        fn free_binding_reports_without_moving() {
            let binding = BoundsBinding::free(RADIUS, BoundsMode::Outset);
            let outcome = tracker().evaluate(Vec2::new(0.0, 7.0), &binding);
            assert_eq!(outcome.position, Vec2::new(0.0, 7.0));
            assert!(outcome.flags.loc_is(BoundsFlags::OFF_UP));
        }

        #[test]
        fn kept_binding_clamps_and_reports_on_screen() {
            let binding = BoundsBinding::kept(RADIUS, BoundsMode::Inset);
            let outcome = tracker().evaluate(Vec2::new(12.0, 0.0), &binding);
            assert_eq!(outcome.position, Vec2::new(9.5, 0.0));
            // The triggering edge is not observable after a kept clamp.
            assert!(outcome.flags.is_on_screen());
            assert!(!outcome.flags.loc_is(BoundsFlags::OFF_RIGHT));
        }

        #[test]
        fn orthographic_extents() {
            let extents = ScreenExtents::from_orthographic(40.0, 0.75);
            assert_eq!(extents.half_height, 40.0);
            assert_eq!(extents.half_width, 30.0);
        }
    }

    proptest! {
        #[test]
        fn horizontal_overflow_clamps_to_outset_edge(excess in 0.001f32..1000.0, y in -5.0f32..5.0) {
            let limit = HALF_W + RADIUS;

            let (right, right_flags) =
                compute(Vec2::new(limit + excess, y), HALF_W, HALF_H, RADIUS, BoundsMode::Outset);
            prop_assert_eq!(right.x, limit);
            prop_assert_eq!(right_flags, BoundsFlags::OFF_RIGHT);

            let (left, left_flags) =
                compute(Vec2::new(-limit - excess, y), HALF_W, HALF_H, RADIUS, BoundsMode::Outset);
            prop_assert_eq!(left.x, -limit);
            prop_assert_eq!(left_flags, BoundsFlags::OFF_LEFT);
        }

        #[test]
        fn vertical_overflow_clamps_to_outset_edge(excess in 0.001f32..1000.0, x in -9.0f32..9.0) {
            let limit = HALF_H + RADIUS;

            let (up, up_flags) =
                compute(Vec2::new(x, limit + excess), HALF_W, HALF_H, RADIUS, BoundsMode::Outset);
            prop_assert_eq!(up.y, limit);
            prop_assert_eq!(up_flags, BoundsFlags::OFF_UP);

            let (down, down_flags) =
                compute(Vec2::new(x, -limit - excess), HALF_W, HALF_H, RADIUS, BoundsMode::Outset);
            prop_assert_eq!(down.y, -limit);
            prop_assert_eq!(down_flags, BoundsFlags::OFF_DOWN);
        }

        #[test]
        fn kept_entities_always_end_on_screen(x in -100.0f32..100.0, y in -100.0f32..100.0) {
            let tracker = BoundsTracker::new(ScreenExtents::new(HALF_W, HALF_H));
            let binding = BoundsBinding::kept(RADIUS, BoundsMode::Inset);
            let outcome = tracker.evaluate(Vec2::new(x, y), &binding);
            prop_assert!(outcome.flags.is_on_screen());
            prop_assert!(outcome.position.x.abs() <= HALF_W - RADIUS);
            prop_assert!(outcome.position.y.abs() <= HALF_H - RADIUS);
        }
    }
}
