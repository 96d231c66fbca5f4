use core::time::Duration;


/// Value threshold is this fraction of the minimum visible change.
const VALUE_THRESHOLD_MULTIPLIER: f32 = 0.75;
/// Velocity threshold (units per second) relative to the value threshold,
/// i.e. one value threshold per 16 ms frame.
const VELOCITY_THRESHOLD_MULTIPLIER: f32 = 1000.0 / 16.0;
const DEFAULT_MIN_VISIBLE_CHANGE: f32 = 1.0 / 256.0;
/// Keeps every configured spring convergent.
const MIN_DAMPING_RATIO: f32 = 0.05;
const MIN_VALUE: f32 = 0.0;
const MAX_VALUE: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParams {
    pub stiffness: f32,
    pub damping_ratio: f32,
}

impl SpringParams {
    pub fn new(stiffness: f32, damping_ratio: f32) -> Self {
        Self {
            stiffness: if stiffness.is_finite() && stiffness > 0.0 {
                stiffness
            } else {
                f32::MIN_POSITIVE
            },
            damping_ratio: if damping_ratio.is_nan() {
                1.0
            } else {
                damping_ratio.max(MIN_DAMPING_RATIO)
            },
        }
    }

    /// Stiffness divided by the host animation scale so slow-motion settings
    /// slow the spring proportionally. `None` when animation is disabled and
    /// callers must snap instead.
    pub fn scaled(stiffness: f32, damping_ratio: f32, animation_scale: f32) -> Option<Self> {
        if !(animation_scale.is_finite() && animation_scale > 0.0) {
            return None;
        }
        Some(Self::new(stiffness / animation_scale, damping_ratio))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringFrame {
    pub value: f32,
    pub at_rest: bool,
}

/// Damped harmonic oscillator driving one scalar in `[0, 1]` toward a target.
///
/// Each tick advances the exact solution of
/// `x'' = -k (x - target) - 2 ζ √k x'` over the elapsed time, so large or
/// uneven frame gaps never destabilise the motion.
#[derive(Clone, Copy, Debug)]
pub struct SpringEngine {
    value: f32,
    velocity: f32,
    target: f32,
    params: SpringParams,
    min_visible_change: f32,
    running: bool,
}

impl SpringEngine {
    pub fn new(value: f32) -> Self {
        let value = clamp_unit(value, 0.0);
        Self {
            value,
            velocity: 0.0,
            target: value,
            params: SpringParams::new(1.0, 1.0),
            min_visible_change: DEFAULT_MIN_VISIBLE_CHANGE,
            running: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn min_visible_change(&self) -> f32 {
        self.min_visible_change
    }

    pub fn set_min_visible_change(&mut self, min_visible_change: f32) {
        if min_visible_change.is_finite() && min_visible_change > 0.0 {
            self.min_visible_change = min_visible_change;
        }
    }

    /// Points the spring at a new target without touching the current value
    /// or velocity. Out-of-range targets are clamped. Returns `true` when the
    /// engine needs frames to get there.
    pub fn retarget(&mut self, target: f32, params: SpringParams) -> bool {
        self.target = clamp_unit(target, self.target);
        self.params = params;
        if self.is_at_equilibrium() {
            self.settle();
        } else {
            self.running = true;
        }
        self.running
    }

    pub fn tick(&mut self, dt: Duration) -> SpringFrame {
        if self.running {
            self.step(dt.as_secs_f32());
            self.value = self.value.clamp(MIN_VALUE, MAX_VALUE);
            if self.is_at_equilibrium() {
                self.settle();
            }
        }
        SpringFrame {
            value: self.value,
            at_rest: !self.running,
        }
    }

    /// Stops any motion and jumps straight to `value`.
    pub fn snap(&mut self, value: f32) {
        let value = clamp_unit(value, self.value);
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.running = false;
    }

    /// Stops where it is.
    pub fn cancel(&mut self) {
        self.velocity = 0.0;
        self.running = false;
    }

    fn value_threshold(&self) -> f32 {
        self.min_visible_change * VALUE_THRESHOLD_MULTIPLIER
    }

    fn velocity_threshold(&self) -> f32 {
        self.value_threshold() * VELOCITY_THRESHOLD_MULTIPLIER
    }

    fn is_at_equilibrium(&self) -> bool {
        self.velocity.abs() < self.velocity_threshold()
            && (self.value - self.target).abs() < self.value_threshold()
    }

    fn settle(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
        self.running = false;
    }

    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let omega = self.params.stiffness.sqrt();
        let zeta = self.params.damping_ratio;
        let displacement = self.value - self.target;
        let velocity = self.velocity;

        let (offset, next_velocity) = if zeta > 1.0 {
            let root = omega * (zeta * zeta - 1.0).sqrt();
            let gamma_plus = -zeta * omega + root;
            let gamma_minus = -zeta * omega - root;
            let coeff_b = (gamma_minus * displacement - velocity) / (gamma_minus - gamma_plus);
            let coeff_a = displacement - coeff_b;
            let decay_minus = (gamma_minus * dt).exp();
            let decay_plus = (gamma_plus * dt).exp();
            (
                coeff_a * decay_minus + coeff_b * decay_plus,
                coeff_a * gamma_minus * decay_minus + coeff_b * gamma_plus * decay_plus,
            )
        } else if zeta == 1.0 {
            let coeff_a = displacement;
            let coeff_b = velocity + omega * displacement;
            let decay = (-omega * dt).exp();
            let offset = (coeff_a + coeff_b * dt) * decay;
            (offset, -omega * offset + coeff_b * decay)
        } else {
            let damped = omega * (1.0 - zeta * zeta).sqrt();
            let cos_coeff = displacement;
            let sin_coeff = (zeta * omega * displacement + velocity) / damped;
            let decay = (-zeta * omega * dt).exp();
            let (sin, cos) = (damped * dt).sin_cos();
            let offset = decay * (cos_coeff * cos + sin_coeff * sin);
            (
                offset,
                -zeta * omega * offset + decay * damped * (sin_coeff * cos - cos_coeff * sin),
            )
        };

        self.value = self.target + offset;
        self.velocity = next_velocity;
    }
}

fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(MIN_VALUE, MAX_VALUE)
    }
}
