//! Motion profiles for enemies and projectiles.
//!
//! Every moving entity carries one [`MotionProfile`], a closed set of tagged
//! variants each owning its own parameter struct. [`MotionProfile::advance`]
//! is the single entry point: it reads a [`MotionContext`] and returns the next
//! pose plus an expiry signal. Profiles never touch other entities; the only
//! state they mutate is their own parameters.
//!
//! # Profiles
//!
//! | Profile | Movement | Expires |
//! |---------|----------|---------|
//! | [`LinearDescent`] | constant velocity | when the exit edge is reported |
//! | [`TwoPointWaypointSine`] | sine-eased sweep between two screen sides | after its lifetime |
//! | [`RepeatingWaypointEase`] | eased hops between on-screen waypoints | never |
//! | [`LateralSineWeave`] | forward drift with a sideways sine | when the exit edge is reported |
//! | [`HomingPursuit`] | exponential approach to a live target | when the target is gone |

use std::f32::consts::TAU;

use glam::{Mat3, Quat, Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bounds::{BoundsFlags, ScreenExtents};
use crate::entity::{EntityId, Pose};

// =============================================================================
// Context and result
// =============================================================================

/// Inputs to one motion update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionContext {
    /// Clock sample for this tick.
    pub now: f32,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// The entity's pose before the update.
    pub pose: Pose,
    /// The entity's bounds flags from this tick's bounds pass.
    pub bounds: BoundsFlags,
    /// Current position of the entity's homing target, if it is still live.
    pub target: Option<Vec2>,
}

/// Result of one motion update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Next pose.
    pub pose: Pose,
    /// The profile has finished and the entity should be removed.
    pub expired: bool,
}

impl MotionStep {
    const fn moved(pose: Pose) -> Self {
        Self {
            pose,
            expired: false,
        }
    }

    const fn expired(pose: Pose) -> Self {
        Self {
            pose,
            expired: true,
        }
    }
}

// =============================================================================
// Easing curves
// =============================================================================

/// One control point of a keyframed curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Input position, normally in `[0, 1]`.
    pub time: f32,
    /// Output value.
    pub value: f32,
}

/// A remapping of normalized progress supplied by the content author.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum EasingCurve {
    /// Identity.
    #[default]
    Linear,
    /// Cubic smoothstep over `[0, 1]`.
    SmoothStep,
    /// Piecewise-linear through keyframes sorted by time; clamped outside them.
    Keyframes(Vec<Keyframe>),
}

impl EasingCurve {
    /// Evaluates the curve at `u`.
    #[must_use]
    pub fn evaluate(&self, u: f32) -> f32 {
        match self {
            Self::Linear => u,
            Self::SmoothStep => {
                let t = u.clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
            Self::Keyframes(keys) => evaluate_keyframes(keys, u),
        }
    }
}

fn evaluate_keyframes(keys: &[Keyframe], u: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 0.0;
    };
    if u <= first.time {
        return first.value;
    }
    if u >= last.time {
        return last.value;
    }
    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if u <= b.time {
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            let t = (u - a.time) / span;
            return a.value + (b.value - a.value) * t;
        }
    }
    last.value
}

// =============================================================================
// Orientation helpers
// =============================================================================

/// Builds the rotation whose local +Z looks along `forward`, with local +Y as
/// close to `up` as possible.
///
/// When `forward` is parallel to `up` the shortest-arc rotation from +Z is
/// used instead.
#[must_use]
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(z) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };
    let Some(x) = up.cross(z).try_normalize() else {
        return Quat::from_rotation_arc(Vec3::Z, z);
    };
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

// =============================================================================
// Profiles
// =============================================================================

/// Constant-velocity travel that ends at a screen edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearDescent {
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Edge whose crossing expires the profile. An empty set never expires.
    pub exit_edge: BoundsFlags,
}

impl LinearDescent {
    /// Straight down at `speed`, leaving through the bottom edge.
    #[must_use]
    pub fn downward(speed: f32) -> Self {
        Self {
            velocity: Vec2::new(0.0, -speed),
            exit_edge: BoundsFlags::OFF_DOWN,
        }
    }

    /// Along `velocity`, leaving through the top edge.
    #[must_use]
    pub const fn upward(velocity: Vec2) -> Self {
        Self {
            velocity,
            exit_edge: BoundsFlags::OFF_UP,
        }
    }

    /// Along `velocity`, leaving through the edge of its dominant axis.
    #[must_use]
    pub fn toward(velocity: Vec2) -> Self {
        let exit_edge = if velocity.y.abs() >= velocity.x.abs() {
            if velocity.y >= 0.0 {
                BoundsFlags::OFF_UP
            } else {
                BoundsFlags::OFF_DOWN
            }
        } else if velocity.x >= 0.0 {
            BoundsFlags::OFF_RIGHT
        } else {
            BoundsFlags::OFF_LEFT
        };
        Self {
            velocity,
            exit_edge,
        }
    }

    fn advance(&self, ctx: &MotionContext) -> MotionStep {
        if exited(self.exit_edge, ctx.bounds) {
            return MotionStep::expired(ctx.pose);
        }
        let mut pose = ctx.pose;
        pose.position += self.velocity * ctx.dt;
        MotionStep::moved(pose)
    }
}

/// Tuning for [`TwoPointWaypointSine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTuning {
    /// Seconds to cross the screen.
    pub lifetime: f32,
    /// Strength of the sine perturbation of progress.
    pub eccentricity: f32,
    /// Curve driving the roll, evaluated over unperturbed progress.
    pub rotation_curve: EasingCurve,
}

impl Default for SweepTuning {
    fn default() -> Self {
        Self {
            lifetime: 10.0,
            eccentricity: 0.6,
            rotation_curve: EasingCurve::SmoothStep,
        }
    }
}

/// A sweep from one side of the screen to the other with sine-eased progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoPointWaypointSine {
    /// Start point.
    pub p0: Vec2,
    /// End point.
    pub p1: Vec2,
    /// Clock time the sweep began.
    pub birth_time: f32,
    /// Sweep duration and curve.
    pub tuning: SweepTuning,
    /// Orientation facing from `p0` toward `p1`.
    pub base_orientation: Quat,
}

impl TwoPointWaypointSine {
    /// Picks waypoints just outside opposite screen sides and starts the sweep.
    ///
    /// `p0` sits left of the screen and `p1` right of it, each at a random
    /// height; a coin flip swaps the sides. The returned pose places the
    /// entity at `p0` facing `p1`.
    pub fn spawn<R: Rng + ?Sized>(
        extents: ScreenExtents,
        radius: f32,
        now: f32,
        tuning: SweepTuning,
        rng: &mut R,
    ) -> (Self, Pose) {
        let side = extents.half_width + radius;
        let mut p0 = Vec2::new(-side, sample_axis(rng, extents.half_height));
        let mut p1 = Vec2::new(side, sample_axis(rng, extents.half_height));

        if rng.gen::<f32>() < 0.5 {
            p0.x = -p0.x;
            p1.x = -p1.x;
        }

        let base_orientation = look_rotation((p1 - p0).extend(0.0), Vec3::NEG_Z);
        let profile = Self {
            p0,
            p1,
            birth_time: now,
            tuning,
            base_orientation,
        };
        let pose = Pose {
            position: p0,
            orientation: base_orientation,
        };
        (profile, pose)
    }

    fn advance(&self, ctx: &MotionContext) -> MotionStep {
        let u = (ctx.now - self.birth_time) / self.tuning.lifetime;
        if u > 1.0 {
            return MotionStep::expired(ctx.pose);
        }

        let roll = self.tuning.rotation_curve.evaluate(u) * 360.0;
        let orientation = self.base_orientation * Quat::from_rotation_x((-roll).to_radians());

        let eased = u + self.tuning.eccentricity * (TAU * u).sin();
        let position = self.p0.lerp(self.p1, eased);

        MotionStep::moved(Pose {
            position,
            orientation,
        })
    }
}

/// Endless eased hops between random on-screen waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepeatingWaypointEase {
    /// Waypoint the current hop started from.
    pub p0: Vec2,
    /// Waypoint the current hop heads to.
    pub p1: Vec2,
    /// Clock time the current hop began.
    pub cycle_start: f32,
    /// Seconds per hop.
    pub duration: f32,
    /// Easing strength `k` in `u - k·sin(2πu)`.
    pub ease_k: f32,
    /// Largest waypoint magnitude per axis.
    pub limits: Vec2,
}

impl RepeatingWaypointEase {
    /// Default seconds per hop.
    pub const DEFAULT_DURATION: f32 = 4.0;
    /// Default easing strength.
    pub const DEFAULT_EASE: f32 = 0.15;

    /// Starts hopping from `start`, choosing the first destination immediately.
    ///
    /// Waypoints stay within the screen pulled in by `radius`.
    pub fn spawn<R: Rng + ?Sized>(
        start: Vec2,
        extents: ScreenExtents,
        radius: f32,
        now: f32,
        duration: f32,
        rng: &mut R,
    ) -> Self {
        let mut profile = Self {
            p0: start,
            p1: start,
            cycle_start: now,
            duration,
            ease_k: Self::DEFAULT_EASE,
            limits: extents.as_vec2() - Vec2::splat(radius),
        };
        profile.begin_cycle(now, rng);
        profile
    }

    fn begin_cycle<R: Rng + ?Sized>(&mut self, now: f32, rng: &mut R) {
        self.p0 = self.p1;
        self.p1 = pick_waypoint(self.p0, self.limits, rng);
        self.cycle_start = now;
    }

    fn advance<R: Rng + ?Sized>(&mut self, ctx: &MotionContext, rng: &mut R) -> MotionStep {
        let mut u = (ctx.now - self.cycle_start) / self.duration;
        if u >= 1.0 {
            self.begin_cycle(ctx.now, rng);
            u = 0.0;
        }

        let eased = u - self.ease_k * (TAU * u).sin();
        let mut pose = ctx.pose;
        pose.position = self.p0.lerp(self.p1, eased);
        MotionStep::moved(pose)
    }
}

/// Picks a waypoint within `±limits` that lies in a different screen quadrant
/// from `previous`.
///
/// A draw landing in the same quadrant is mirrored across the axis on which
/// `previous` lies furthest from the center (ties mirror vertically).
pub fn pick_waypoint<R: Rng + ?Sized>(previous: Vec2, limits: Vec2, rng: &mut R) -> Vec2 {
    let mut next = Vec2::new(sample_axis(rng, limits.x), sample_axis(rng, limits.y));
    if previous.x * next.x > 0.0 && previous.y * next.y > 0.0 {
        if previous.x.abs() > previous.y.abs() {
            next.x = -next.x;
        } else {
            next.y = -next.y;
        }
    }
    next
}

/// Tuning for [`LateralSineWeave`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaveTuning {
    /// Sideways swing in units; the sign picks the starting side.
    pub amplitude: f32,
    /// Seconds per full swing.
    pub period: f32,
    /// Degrees of yaw at full swing.
    pub rotation_multiplier: f32,
}

impl Default for WeaveTuning {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            period: 1.0,
            rotation_multiplier: 45.0,
        }
    }
}

/// Forward drift with a sideways sine swing around an anchor line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateralSineWeave {
    /// Anchor on the perpendicular axis.
    pub x0: f32,
    /// Clock time the weave began.
    pub birth_time: f32,
    /// Swing shape.
    pub tuning: WeaveTuning,
    /// Speed along the primary axis.
    pub forward_speed: f32,
    /// Edge whose crossing expires the profile. An empty set never expires.
    pub exit_edge: BoundsFlags,
}

impl LateralSineWeave {
    /// An upward weave anchored at `x0` leaving through the top edge.
    #[must_use]
    pub const fn upward(x0: f32, now: f32, forward_speed: f32, tuning: WeaveTuning) -> Self {
        Self {
            x0,
            birth_time: now,
            tuning,
            forward_speed,
            exit_edge: BoundsFlags::OFF_UP,
        }
    }

    /// The same weave with its amplitude sign flipped.
    #[must_use]
    pub fn mirrored(mut self) -> Self {
        self.tuning.amplitude = -self.tuning.amplitude;
        self
    }

    fn advance(&self, ctx: &MotionContext) -> MotionStep {
        if exited(self.exit_edge, ctx.bounds) {
            return MotionStep::expired(ctx.pose);
        }

        let age = ctx.now - self.birth_time;
        let swing = (TAU * age / self.tuning.period).sin();

        let mut pose = ctx.pose;
        pose.position.x = self.x0 + self.tuning.amplitude * swing;
        pose.position.y += self.forward_speed * ctx.dt;
        pose.orientation =
            Quat::from_rotation_y((swing * self.tuning.rotation_multiplier).to_radians());
        MotionStep::moved(pose)
    }
}

/// Exponential approach toward a live target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomingPursuit {
    /// Entity being pursued.
    pub target: EntityId,
    /// Fraction of the remaining distance covered per tick.
    pub approach_fraction: f32,
}

impl HomingPursuit {
    /// Default fraction of the remaining distance covered per tick.
    pub const DEFAULT_FRACTION: f32 = 0.01;

    fn advance(&self, ctx: &MotionContext) -> MotionStep {
        let Some(target) = ctx.target else {
            return MotionStep::expired(ctx.pose);
        };
        let mut pose = ctx.pose;
        pose.position = pose.position.lerp(target, self.approach_fraction);
        MotionStep::moved(pose)
    }
}

/// The closed set of motion profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionProfile {
    /// Constant velocity until an exit edge.
    LinearDescent(LinearDescent),
    /// Side-to-side sweep with sine-eased progress.
    TwoPointWaypointSine(TwoPointWaypointSine),
    /// Endless eased waypoint hops.
    RepeatingWaypointEase(RepeatingWaypointEase),
    /// Forward drift with a sideways sine.
    LateralSineWeave(LateralSineWeave),
    /// Exponential approach to a live target.
    HomingPursuit(HomingPursuit),
}

impl MotionProfile {
    /// Advances the profile by one tick.
    ///
    /// `rng` is only drawn from by profiles that pick new waypoints.
    pub fn advance<R: Rng + ?Sized>(&mut self, ctx: &MotionContext, rng: &mut R) -> MotionStep {
        match self {
            Self::LinearDescent(p) => p.advance(ctx),
            Self::TwoPointWaypointSine(p) => p.advance(ctx),
            Self::RepeatingWaypointEase(p) => p.advance(ctx, rng),
            Self::LateralSineWeave(p) => p.advance(ctx),
            Self::HomingPursuit(p) => p.advance(ctx),
        }
    }

    /// The entity this profile pursues, if any.
    #[must_use]
    pub const fn homing_target(&self) -> Option<EntityId> {
        match self {
            Self::HomingPursuit(p) => Some(p.target),
            _ => None,
        }
    }
}

fn exited(edge: BoundsFlags, flags: BoundsFlags) -> bool {
    !edge.is_empty() && flags.loc_is(edge)
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, limit: f32) -> f32 {
    if limit > 0.0 {
        rng.gen_range(-limit..=limit)
    } else {
        0.0
    }
}
