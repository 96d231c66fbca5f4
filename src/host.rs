use core::time::Duration;

/// Host globals injected into the controller instead of being read from
/// ambient platform state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostEnvironment {
    /// Pixels per density-independent pixel.
    pub density: f32,
    /// System animation duration scale; `0` disables animation.
    pub animation_scale: f32,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl HostEnvironment {
    pub const fn new(density: f32, animation_scale: f32) -> Self {
        Self {
            density,
            animation_scale,
        }
    }

    pub fn density(&self) -> f32 {
        if self.density.is_finite() && self.density > 0.0 {
            self.density
        } else {
            1.0
        }
    }

    pub fn animation_scale(&self) -> f32 {
        if self.animation_scale.is_finite() && self.animation_scale > 0.0 {
            self.animation_scale
        } else {
            0.0
        }
    }

    pub fn animations_enabled(&self) -> bool {
        self.animation_scale() > 0.0
    }

    pub fn scaled_delay(&self, base_ms: u64) -> Duration {
        let scaled = (base_ms as f64 * self.animation_scale() as f64).round();
        Duration::from_millis(scaled as u64)
    }
}

/// Identifies one armed hold timer. Tokens are never reused while the
/// controller lives, so a late callback for an old token is recognisably stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoldToken(u32);

impl HoldToken {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEffect {
    RequestRedraw,
    PlayToggleFeedback,
    /// Suppress (`true`) or restore (`false`) ancestor gesture interception.
    AncestorGestureLock(bool),
    CheckedChanged(bool),
    ScheduleHold { token: HoldToken, delay: Duration },
    CancelHold(HoldToken),
}

impl HostEffect {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RequestRedraw => "redraw",
            Self::PlayToggleFeedback => "feedback",
            Self::AncestorGestureLock(true) => "lock",
            Self::AncestorGestureLock(false) => "unlock",
            Self::CheckedChanged(true) => "checked",
            Self::CheckedChanged(false) => "unchecked",
            Self::ScheduleHold { .. } => "schedule_hold",
            Self::CancelHold(_) => "cancel_hold",
        }
    }
}

pub const EFFECT_CAPACITY: usize = 8;

pub type EffectBuffer = heapless::Vec<HostEffect, EFFECT_CAPACITY>;

/// Everything the host has to do after one controller call.
#[derive(Clone, Debug, Default)]
pub struct ControllerOutput {
    pub effects: EffectBuffer,
    /// Pointer event was consumed by the control.
    pub handled: bool,
    /// At least one spring is still moving; keep delivering frames.
    pub animating: bool,
}

impl ControllerOutput {
    pub(crate) fn push(&mut self, effect: HostEffect) {
        if matches!(effect, HostEffect::RequestRedraw) && self.requests_redraw() {
            return;
        }
        if self.effects.push(effect).is_err() {
            log::warn!("switch effect_dropped effect={}", effect.label());
        }
    }

    pub fn requests_redraw(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, HostEffect::RequestRedraw))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostEffect> {
        self.effects.iter()
    }

    pub fn scheduled_hold(&self) -> Option<(HoldToken, Duration)> {
        self.effects.iter().find_map(|effect| match effect {
            HostEffect::ScheduleHold { token, delay } => Some((*token, *delay)),
            _ => None,
        })
    }

    pub fn dispatch(&self, host: &mut impl SwitchHost) {
        for effect in &self.effects {
            match *effect {
                HostEffect::RequestRedraw => host.request_redraw(),
                HostEffect::PlayToggleFeedback => host.play_toggle_feedback(),
                HostEffect::AncestorGestureLock(locked) => {
                    host.request_ancestor_gesture_lock(locked)
                }
                HostEffect::CheckedChanged(checked) => host.on_checked_changed(checked),
                HostEffect::ScheduleHold { token, delay } => host.schedule_hold(token, delay),
                HostEffect::CancelHold(token) => host.cancel_hold(token),
            }
        }
    }
}

/// Outbound callbacks and the cancellable delayed-callback scheduler.
///
/// When a scheduled hold elapses the host calls
/// [`ToggleController::on_hold_timer`](crate::ToggleController::on_hold_timer)
/// with the same token. Cancelling an unknown token must be a no-op.
pub trait SwitchHost {
    fn request_redraw(&mut self);
    fn play_toggle_feedback(&mut self);
    fn request_ancestor_gesture_lock(&mut self, locked: bool);
    fn on_checked_changed(&mut self, checked: bool);
    fn schedule_hold(&mut self, token: HoldToken, delay: Duration);
    fn cancel_hold(&mut self, token: HoldToken);
}
