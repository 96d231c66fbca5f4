use core::time::Duration;

mod hold;
#[cfg(test)]
mod tests;

use hold::HoldTimer;

use crate::{
    config::SwitchConfig,
    geometry::{self, SwitchGeometry, ThumbBounds},
    host::{ControllerOutput, HoldToken, HostEffect, HostEnvironment},
    palette::Argb,
    spring::{SpringEngine, SpringParams},
    state::{target_for, HoldSide, Press, Substate, ThumbPosition, ToggleState},
    touch::{
        ClassifierInput, GestureClassifier, GestureThresholds, Intent, PointerEvent, TouchMode,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    ThumbLeft,
    ThumbRight,
    TrackTint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Motion {
    Bounce,
    NoBounce,
}

/// One engine per animated scalar; none of them share state.
#[derive(Clone, Copy, Debug)]
struct SpringSet {
    thumb_left: SpringEngine,
    thumb_right: SpringEngine,
    track_tint: SpringEngine,
}

impl SpringSet {
    fn new(value: f32) -> Self {
        Self {
            thumb_left: SpringEngine::new(value),
            thumb_right: SpringEngine::new(value),
            track_tint: SpringEngine::new(value),
        }
    }

    fn get_mut(&mut self, channel: Channel) -> &mut SpringEngine {
        match channel {
            Channel::ThumbLeft => &mut self.thumb_left,
            Channel::ThumbRight => &mut self.thumb_right,
            Channel::TrackTint => &mut self.track_tint,
        }
    }

    fn engines_mut(&mut self) -> [&mut SpringEngine; 3] {
        [
            &mut self.thumb_left,
            &mut self.thumb_right,
            &mut self.track_tint,
        ]
    }

    fn any_running(&self) -> bool {
        self.thumb_left.is_running() || self.thumb_right.is_running() || self.track_tint.is_running()
    }
}

/// Owns the switch state and turns pointer input, hold timers and frame
/// ticks into state changes plus [`HostEffect`]s.
pub struct ToggleController {
    config: SwitchConfig,
    environment: HostEnvironment,
    state: ToggleState,
    classifier: GestureClassifier,
    springs: SpringSet,
    hold: HoldTimer,
    enabled: bool,
    attached: bool,
    geometry: Option<SwitchGeometry>,
    last_frame: Option<Duration>,
}

impl ToggleController {
    pub fn new(config: SwitchConfig, environment: HostEnvironment, checked: bool) -> Self {
        let target = target_for(checked);
        let mut springs = SpringSet::new(target);
        for engine in springs.engines_mut() {
            engine.set_min_visible_change(config.spring.tint_min_visible_change);
        }
        Self {
            config,
            environment,
            state: ToggleState::new(checked),
            classifier: GestureClassifier::new(),
            springs,
            hold: HoldTimer::default(),
            enabled: true,
            attached: false,
            geometry: None,
            last_frame: None,
        }
    }

    pub fn with_defaults(checked: bool) -> Self {
        Self::new(SwitchConfig::default(), HostEnvironment::default(), checked)
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    pub fn environment(&self) -> HostEnvironment {
        self.environment
    }

    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    pub fn is_checked(&self) -> bool {
        self.state.checked()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Springs only animate once this holds; before that every change snaps.
    pub fn is_laid_out(&self) -> bool {
        self.attached && self.geometry.is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.springs.any_running()
    }

    pub fn touch_mode(&self) -> TouchMode {
        self.classifier.mode()
    }

    pub fn was_toggled_by_drag(&self) -> bool {
        self.classifier.was_toggled_by_drag()
    }

    pub fn armed_hold(&self) -> Option<HoldToken> {
        self.hold.armed().map(|armed| armed.token)
    }

    pub fn geometry(&self) -> Option<&SwitchGeometry> {
        self.geometry.as_ref()
    }

    pub fn thumb_bounds(&self) -> Option<ThumbBounds> {
        self.geometry
            .map(|geometry| geometry.thumb_bounds(self.state.thumb_position()))
    }

    pub fn track_color(&self) -> Argb {
        self.config
            .palette
            .track()
            .color_at(self.state.track_tint_fraction())
    }

    pub fn thumb_color(&self) -> Argb {
        self.config.palette.thumb.with_alpha_scaled(self.alpha())
    }

    pub fn thumb_shadow_color(&self) -> Argb {
        self.config.palette.thumb_shadow.with_alpha_scaled(self.alpha())
    }

    pub fn alpha(&self) -> f32 {
        if self.enabled {
            1.0
        } else {
            self.config.palette.disabled_alpha
        }
    }

    pub fn preferred_size(&self, scale: f32) -> (u32, u32) {
        geometry::preferred_size(&self.config.layout, self.environment.density(), scale)
    }

    /// Drag commit line for debug overlays.
    pub fn commit_threshold_x(&self) -> Option<f32> {
        let percent = self.config.gesture.drag_toggle_threshold_percent;
        self.geometry
            .map(|geometry| geometry.commit_threshold_x(self.is_checked(), percent))
    }

    pub fn set_environment(&mut self, environment: HostEnvironment) {
        self.environment = environment;
    }

    pub fn on_attached(&mut self) -> ControllerOutput {
        self.attached = true;
        let mut output = ControllerOutput::default();
        output.push(HostEffect::RequestRedraw);
        self.finish(output)
    }

    /// Drops the touch session and hold timer, settles any press and parks
    /// every spring at its target, since no frames arrive while detached.
    pub fn on_detached(&mut self) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        let was_open = self.abort_session(&mut output);
        if was_open || self.state.substate().press() == Press::Pressed {
            self.settle(self.is_checked(), &mut output);
        }
        self.hold.cancel(&mut output);
        self.attached = false;
        for engine in self.springs.engines_mut() {
            let target = engine.target();
            engine.snap(target);
        }
        self.sync_state(&mut output);
        self.finish(output)
    }

    pub fn on_size_changed(&mut self, width: f32, height: f32) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        self.geometry =
            SwitchGeometry::new(width, height, self.config.layout.thumb_offset_percent);
        let fallback = self.config.spring.tint_min_visible_change;
        let thumb_change = self
            .geometry
            .map_or(fallback, |geometry| geometry.thumb_min_visible_change(fallback));
        self.springs.thumb_left.set_min_visible_change(thumb_change);
        self.springs.thumb_right.set_min_visible_change(thumb_change);
        self.springs.track_tint.set_min_visible_change(fallback);
        output.push(HostEffect::RequestRedraw);
        self.finish(output)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        if self.enabled == enabled {
            return self.finish(output);
        }
        self.enabled = enabled;
        output.push(HostEffect::RequestRedraw);
        if !enabled && self.abort_session(&mut output) {
            self.settle(self.is_checked(), &mut output);
        }
        self.finish(output)
    }

    /// Programmatic setter. Settling on the current value is idempotent.
    pub fn set_checked(&mut self, checked: bool) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        self.settle(checked, &mut output);
        self.finish(output)
    }

    pub fn toggle(&mut self) -> ControllerOutput {
        self.set_checked(!self.is_checked())
    }

    pub fn on_pointer_event(&mut self, event: PointerEvent) -> ControllerOutput {
        let input = self.classifier_input();
        let classified = self.classifier.on_event(event, input);
        let mut output = ControllerOutput {
            handled: classified.handled,
            ..ControllerOutput::default()
        };
        for intent in classified.intents {
            self.apply_intent(intent, &mut output);
        }
        self.finish(output)
    }

    pub fn on_hold_timer(&mut self, token: HoldToken) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        match self.hold.fire(token) {
            Some(side) => {
                log::debug!("switch hold_fired token={} side={side:?}", token.id());
                self.apply_hold_effect(side, &mut output);
            }
            None => log::debug!("switch hold_stale token={}", token.id()),
        }
        self.finish(output)
    }

    /// Advances running springs to the monotonic timestamp `now`. The first
    /// frame after idle only anchors the clock.
    pub fn on_frame(&mut self, now: Duration) -> ControllerOutput {
        let mut output = ControllerOutput::default();
        if !self.springs.any_running() {
            return self.finish(output);
        }

        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |previous| now.saturating_sub(previous));
        self.last_frame = Some(now);
        for engine in self.springs.engines_mut() {
            if engine.is_running() {
                engine.tick(dt);
            }
        }
        self.sync_state(&mut output);
        let thumb = self.state.thumb_position();
        log::trace!(
            "switch frame dt_ms={} left={:.4} right={:.4} tint={:.4}",
            dt.as_millis(),
            thumb.left,
            thumb.right,
            self.state.track_tint_fraction()
        );
        self.finish(output)
    }

    fn classifier_input(&self) -> ClassifierInput {
        ClassifierInput {
            enabled: self.enabled,
            substate: self.state.substate(),
            width: self.geometry.map_or(0.0, |geometry| geometry.width()),
            thresholds: GestureThresholds::from_config(
                &self.config.gesture,
                self.environment.density(),
            ),
        }
    }

    fn apply_intent(&mut self, intent: Intent, output: &mut ControllerOutput) {
        let checked = self.is_checked();
        match intent {
            Intent::SessionClosed { was_dragging } => {
                self.hold.cancel(output);
                if was_dragging {
                    output.push(HostEffect::AncestorGestureLock(false));
                }
            }
            Intent::ArmHoldEffect(side) => {
                let delay = self.environment.scaled_delay(self.config.hold.delay_ms);
                self.hold.arm(side, delay, output);
            }
            Intent::DragStarted => output.push(HostEffect::AncestorGestureLock(true)),
            Intent::CommitToggle(value) => self.commit_by_drag(value, output),
            Intent::ReaffirmCurrentState | Intent::SettleToCurrentState => {
                self.settle(checked, output)
            }
            Intent::ReapplyHoldEffect => {
                self.hold.cancel(output);
                self.apply_hold_effect(HoldSide::for_checked(checked), output);
            }
            Intent::Tap => {
                self.settle(!checked, output);
                output.push(HostEffect::PlayToggleFeedback);
            }
        }
    }

    /// Full commit: both thumb edges and the tint head for `checked`'s side.
    fn settle(&mut self, checked: bool, output: &mut ControllerOutput) {
        self.hold.cancel(output);
        self.set_substate(Substate::settled(checked), output);
        let target = target_for(checked);
        log::debug!(
            "switch settle checked={checked} animated={}",
            self.animates()
        );
        self.spring_to(Channel::ThumbRight, target, Motion::Bounce, output);
        self.spring_to(Channel::ThumbLeft, target, Motion::Bounce, output);
        self.spring_to(Channel::TrackTint, target, Motion::NoBounce, output);
    }

    /// Flip while the pointer is still down: the leading edge lands on the new
    /// side, the trailing edge stays stretched until release.
    fn commit_by_drag(&mut self, checked: bool, output: &mut ControllerOutput) {
        self.hold.cancel(output);
        output.push(HostEffect::PlayToggleFeedback);
        self.set_substate(Substate::pressed(checked), output);
        log::debug!("switch drag_commit checked={checked}");

        let shift = self.config.hold.shift;
        let target = target_for(checked);
        let tail = if checked { 1.0 - shift } else { shift };
        if checked {
            self.spring_to(Channel::ThumbRight, target, Motion::Bounce, output);
            self.spring_to(Channel::ThumbLeft, tail, Motion::Bounce, output);
        } else {
            self.spring_to(Channel::ThumbRight, tail, Motion::Bounce, output);
            self.spring_to(Channel::ThumbLeft, target, Motion::Bounce, output);
        }
        self.spring_to(Channel::TrackTint, target, Motion::NoBounce, output);
    }

    fn apply_hold_effect(&mut self, side: HoldSide, output: &mut ControllerOutput) {
        let shift = self.config.hold.shift;
        self.set_substate(Substate::pressed(side.is_checked()), output);
        match side {
            HoldSide::Left => self.spring_to(Channel::ThumbRight, shift, Motion::NoBounce, output),
            HoldSide::Right => {
                self.spring_to(Channel::ThumbLeft, 1.0 - shift, Motion::NoBounce, output)
            }
        }
    }

    /// Animates one channel, or snaps it when there is no laid-out frame to
    /// animate from or the host disabled animation.
    fn spring_to(
        &mut self,
        channel: Channel,
        target: f32,
        motion: Motion,
        output: &mut ControllerOutput,
    ) {
        let spring = self.config.spring;
        let ratio = match motion {
            Motion::Bounce => spring.bounce_ratio,
            Motion::NoBounce => spring.no_bounce_ratio,
        };
        let params = SpringParams::scaled(
            spring.stiffness,
            ratio,
            self.environment.animation_scale(),
        );
        let animates = self.animates();
        let engine = self.springs.get_mut(channel);
        match params {
            Some(params) if animates => {
                if engine.retarget(target, params) {
                    output.push(HostEffect::RequestRedraw);
                }
            }
            _ => engine.snap(target),
        }
        self.sync_state(output);
    }

    fn animates(&self) -> bool {
        self.is_laid_out() && self.environment.animations_enabled()
    }

    fn set_substate(&mut self, substate: Substate, output: &mut ControllerOutput) {
        let previous = self.state.set_substate(substate);
        if previous != substate {
            log::debug!(
                "switch substate from={} to={}",
                previous.label(),
                substate.label()
            );
        }
        if previous.is_checked() != substate.is_checked() {
            output.push(HostEffect::CheckedChanged(substate.is_checked()));
        }
    }

    fn sync_state(&mut self, output: &mut ControllerOutput) {
        let thumb = ThumbPosition {
            left: self.springs.thumb_left.value(),
            right: self.springs.thumb_right.value(),
        };
        if self
            .state
            .set_animated(thumb, self.springs.track_tint.value())
        {
            output.push(HostEffect::RequestRedraw);
        }
    }

    /// Returns `true` when a session was open.
    fn abort_session(&mut self, output: &mut ControllerOutput) -> bool {
        let input = self.classifier_input();
        let aborted = self.classifier.abort(input);
        let was_open = !aborted.intents.is_empty();
        for intent in aborted.intents {
            self.apply_intent(intent, output);
        }
        was_open
    }

    fn finish(&mut self, mut output: ControllerOutput) -> ControllerOutput {
        output.animating = self.springs.any_running();
        if !output.animating {
            self.last_frame = None;
        }
        output
    }
}
