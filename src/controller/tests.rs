use super::*;
use crate::state::Press;

const WIDTH: f32 = 153.0;
const HEIGHT: f32 = 93.0;
const Y: f32 = 40.0;
const FRAME: Duration = Duration::from_millis(16);

fn laid_out_with(environment: HostEnvironment, checked: bool) -> ToggleController {
    let mut controller = ToggleController::new(SwitchConfig::default(), environment, checked);
    controller.on_attached();
    controller.on_size_changed(WIDTH, HEIGHT);
    controller
}

fn laid_out(checked: bool) -> ToggleController {
    laid_out_with(HostEnvironment::default(), checked)
}

fn effects(output: &ControllerOutput) -> std::vec::Vec<HostEffect> {
    output.iter().copied().collect()
}

/// Feeds 16 ms frames until every spring rests.
struct Clock {
    now: Duration,
}

impl Clock {
    fn new() -> Self {
        Self {
            now: Duration::from_millis(1_000),
        }
    }

    fn settle(&mut self, controller: &mut ToggleController) -> usize {
        for frame in 0..1_000 {
            if !controller.is_animating() {
                return frame;
            }
            self.now += FRAME;
            controller.on_frame(self.now);
        }
        panic!("controller still animating after 1000 frames");
    }
}

fn checked_changes(outputs: &[ControllerOutput]) -> std::vec::Vec<bool> {
    outputs
        .iter()
        .flat_map(|output| output.iter())
        .filter_map(|effect| match effect {
            HostEffect::CheckedChanged(value) => Some(*value),
            _ => None,
        })
        .collect()
}

#[test]
fn tap_flips_and_animates_to_the_other_side() {
    let mut controller = laid_out(false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    assert!(down.handled);
    let (token, delay) = down.scheduled_hold().expect("hold armed on down");
    assert_eq!(delay, Duration::from_millis(60));

    let up = controller.on_pointer_event(PointerEvent::up(20.0, Y));
    assert!(up.handled);
    assert!(up.animating);
    assert_eq!(
        effects(&up),
        std::vec![
            HostEffect::CancelHold(token),
            HostEffect::CheckedChanged(true),
            HostEffect::RequestRedraw,
            HostEffect::PlayToggleFeedback,
        ]
    );
    assert!(controller.is_checked());
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Default));

    Clock::new().settle(&mut controller);
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
    assert_eq!(controller.state().track_tint_fraction(), 1.0);
    assert_eq!(controller.track_color(), controller.config().palette.track_checked);
}

#[test]
fn first_frame_only_anchors_the_clock() {
    let mut controller = laid_out(false);
    controller.toggle();
    let before = controller.state().thumb_position();

    let first = controller.on_frame(Duration::from_millis(5_000));
    assert!(first.animating);
    assert!(!first.requests_redraw());
    assert_eq!(controller.state().thumb_position(), before);

    let second = controller.on_frame(Duration::from_millis(5_016));
    assert!(second.requests_redraw());
    assert!(controller.state().thumb_position().right > before.right);
}

#[test]
fn drag_across_commit_line_toggles_once() {
    let mut controller = laid_out(false);
    let mut outputs = std::vec::Vec::new();
    outputs.push(controller.on_pointer_event(PointerEvent::down(20.0, Y)));

    let start = controller.on_pointer_event(PointerEvent::move_to(40.0, Y));
    assert!(effects(&start).contains(&HostEffect::AncestorGestureLock(true)));
    assert_eq!(controller.touch_mode(), TouchMode::Dragging);
    outputs.push(start);

    let commit = controller.on_pointer_event(PointerEvent::move_to(100.0, Y));
    assert!(effects(&commit).contains(&HostEffect::PlayToggleFeedback));
    assert!(controller.is_checked());
    assert!(controller.was_toggled_by_drag());
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Pressed));
    outputs.push(commit);

    outputs.push(controller.on_pointer_event(PointerEvent::move_to(120.0, Y)));
    let up = controller.on_pointer_event(PointerEvent::up(120.0, Y));
    assert!(effects(&up).contains(&HostEffect::AncestorGestureLock(false)));
    assert!(!effects(&up).contains(&HostEffect::PlayToggleFeedback));
    outputs.push(up);

    assert_eq!(checked_changes(&outputs), std::vec![true]);
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Default));
    assert_eq!(controller.touch_mode(), TouchMode::Idle);

    Clock::new().settle(&mut controller);
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
}

#[test]
fn commit_leaves_trailing_edge_stretched_until_release() {
    let mut controller = laid_out(false);
    let mut clock = Clock::new();
    controller.on_pointer_event(PointerEvent::down(20.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(40.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(100.0, Y));
    clock.settle(&mut controller);

    let thumb = controller.state().thumb_position();
    assert_eq!(thumb.right, 1.0);
    assert!((thumb.left - 0.67).abs() < 0.01, "left edge at {}", thumb.left);

    controller.on_pointer_event(PointerEvent::up(100.0, Y));
    clock.settle(&mut controller);
    assert!(controller.state().thumb_position().is_unified());
}

#[test]
fn release_in_cancel_band_taps_but_far_release_settles() {
    let mut controller = laid_out(false);
    controller.on_pointer_event(PointerEvent::down(20.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(35.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(-10.0, Y));
    let up = controller.on_pointer_event(PointerEvent::up(-10.0, Y));
    assert!(controller.is_checked());
    assert!(effects(&up).contains(&HostEffect::PlayToggleFeedback));

    let mut controller = laid_out(false);
    controller.on_pointer_event(PointerEvent::down(20.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(35.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(-100.0, Y));
    let up = controller.on_pointer_event(PointerEvent::up(-100.0, Y));
    assert!(!controller.is_checked());
    assert!(!effects(&up).contains(&HostEffect::PlayToggleFeedback));
    assert!(checked_changes(&[up]).is_empty());
}

#[test]
fn hold_timer_stretches_thumb_away_from_rest_side() {
    let mut controller = laid_out(false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");
    assert_eq!(controller.armed_hold(), Some(token));

    let fired = controller.on_hold_timer(token);
    assert!(fired.animating);
    assert!(checked_changes(&[fired]).is_empty());
    assert_eq!(controller.state().substate(), Substate::Unchecked(Press::Pressed));
    assert_eq!(controller.armed_hold(), None);

    Clock::new().settle(&mut controller);
    let thumb = controller.state().thumb_position();
    assert_eq!(thumb.left, 0.0);
    assert!((thumb.right - 0.33).abs() < 0.01, "right edge at {}", thumb.right);
}

#[test]
fn checked_hold_stretches_left_edge() {
    let mut controller = laid_out(true);
    let down = controller.on_pointer_event(PointerEvent::down(140.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");
    controller.on_hold_timer(token);
    Clock::new().settle(&mut controller);

    let thumb = controller.state().thumb_position();
    assert_eq!(thumb.right, 1.0);
    assert!((thumb.left - 0.67).abs() < 0.01, "left edge at {}", thumb.left);
}

#[test]
fn stale_hold_token_is_ignored() {
    let mut controller = laid_out(false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");
    controller.on_pointer_event(PointerEvent::up(20.0, Y));
    Clock::new().settle(&mut controller);
    let before = *controller.state();

    let late = controller.on_hold_timer(token);
    assert!(late.effects.is_empty());
    assert_eq!(*controller.state(), before);
}

#[test]
fn leaving_past_rest_edge_reaffirms_and_reentering_reapplies() {
    let mut controller = laid_out(false);
    let mut clock = Clock::new();
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");
    controller.on_hold_timer(token);
    controller.on_pointer_event(PointerEvent::move_to(35.0, Y));

    controller.on_pointer_event(PointerEvent::move_to(-5.0, Y));
    assert_eq!(controller.state().substate(), Substate::Unchecked(Press::Default));
    clock.settle(&mut controller);
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(0.0));

    controller.on_pointer_event(PointerEvent::move_to(10.0, Y));
    assert_eq!(controller.state().substate(), Substate::Unchecked(Press::Pressed));
    clock.settle(&mut controller);
    assert!(!controller.state().thumb_position().is_unified());
}

#[test]
fn set_checked_is_idempotent() {
    let mut controller = laid_out(false);
    let same = controller.set_checked(false);
    assert!(same.effects.is_empty());
    assert!(!same.animating);

    let flip = controller.set_checked(true);
    assert_eq!(checked_changes(&[flip.clone()]), std::vec![true]);
    assert!(flip.animating);
    assert!(!effects(&flip).contains(&HostEffect::PlayToggleFeedback));
    assert!(checked_changes(&[controller.set_checked(true)]).is_empty());
}

#[test]
fn changes_before_layout_snap() {
    let mut controller = ToggleController::with_defaults(false);
    assert!(!controller.is_laid_out());
    let output = controller.set_checked(true);
    assert!(!output.animating);
    assert!(output.requests_redraw());
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
    assert_eq!(controller.state().track_tint_fraction(), 1.0);
    assert_eq!(controller.thumb_bounds(), None);
}

#[test]
fn zero_animation_scale_snaps_and_fires_hold_immediately() {
    let mut controller = laid_out_with(HostEnvironment::new(1.0, 0.0), false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, delay) = down.scheduled_hold().expect("hold armed");
    assert_eq!(delay, Duration::ZERO);

    let fired = controller.on_hold_timer(token);
    assert!(!fired.animating);
    assert_eq!(controller.state().thumb_position().right, 0.33);

    let up = controller.on_pointer_event(PointerEvent::up(20.0, Y));
    assert!(!up.animating);
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
}

#[test]
fn animation_scale_stretches_hold_delay() {
    let mut controller = laid_out_with(HostEnvironment::new(1.0, 2.0), false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (_, delay) = down.scheduled_hold().expect("hold armed");
    assert_eq!(delay, Duration::from_millis(120));
}

#[test]
fn disabled_control_ignores_touches() {
    let mut controller = laid_out(false);
    let disable = controller.set_enabled(false);
    assert!(disable.requests_redraw());
    assert_eq!(controller.alpha(), 0.5);

    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    assert!(!down.handled);
    assert!(down.effects.is_empty());
    let up = controller.on_pointer_event(PointerEvent::up(20.0, Y));
    assert!(!up.handled);
    assert!(!controller.is_checked());

    assert!(controller.set_enabled(false).effects.is_empty());
    controller.set_enabled(true);
    assert_eq!(controller.alpha(), 1.0);
}

#[test]
fn second_down_restarts_session_with_new_hold() {
    let mut controller = laid_out(false);
    let first = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (old, _) = first.scheduled_hold().expect("hold armed");

    let second = controller.on_pointer_event(PointerEvent::down(30.0, Y));
    let (new, _) = second.scheduled_hold().expect("hold re-armed");
    assert_eq!(effects(&second)[0], HostEffect::CancelHold(old));
    assert_ne!(old, new);
    assert_eq!(controller.touch_mode(), TouchMode::Down);
    assert!(!controller.is_checked());
}

#[test]
fn disabling_mid_drag_releases_lock_and_settles() {
    let mut controller = laid_out(false);
    controller.on_pointer_event(PointerEvent::down(20.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(40.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(100.0, Y));
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Pressed));

    let disable = controller.set_enabled(false);
    assert!(effects(&disable).contains(&HostEffect::AncestorGestureLock(false)));
    assert!(checked_changes(&[disable]).is_empty());
    assert_eq!(controller.touch_mode(), TouchMode::Idle);
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Default));

    let up = controller.on_pointer_event(PointerEvent::up(100.0, Y));
    assert!(!up.handled);
}

#[test]
fn detach_cancels_hold_and_parks_springs() {
    let mut controller = laid_out(false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");

    let detached = controller.on_detached();
    assert!(effects(&detached).contains(&HostEffect::CancelHold(token)));
    assert_eq!(controller.armed_hold(), None);
    assert_eq!(controller.touch_mode(), TouchMode::Idle);

    let mut controller = laid_out(false);
    controller.toggle();
    assert!(controller.is_animating());
    let detached = controller.on_detached();
    assert!(!detached.animating);
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
    assert!(!controller.is_attached());
}

#[test]
fn detach_after_hold_fired_releases_the_stretch() {
    let mut controller = laid_out(false);
    let down = controller.on_pointer_event(PointerEvent::down(20.0, Y));
    let (token, _) = down.scheduled_hold().expect("hold armed");
    controller.on_hold_timer(token);
    Clock::new().settle(&mut controller);
    assert!(!controller.state().thumb_position().is_unified());

    let detached = controller.on_detached();
    assert!(!detached.animating);
    assert_eq!(controller.state().substate(), Substate::Unchecked(Press::Default));
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(0.0));
}

#[test]
fn detach_after_drag_commit_keeps_value_and_unifies_thumb() {
    let mut controller = laid_out(false);
    controller.on_pointer_event(PointerEvent::down(20.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(40.0, Y));
    controller.on_pointer_event(PointerEvent::move_to(100.0, Y));
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Pressed));

    let detached = controller.on_detached();
    assert!(effects(&detached).contains(&HostEffect::AncestorGestureLock(false)));
    assert!(checked_changes(&[detached]).is_empty());
    assert_eq!(controller.state().substate(), Substate::Checked(Press::Default));
    assert_eq!(controller.state().thumb_position(), ThumbPosition::at(1.0));
    assert_eq!(controller.state().track_tint_fraction(), 1.0);
}

#[test]
fn thumb_colors_fade_when_disabled() {
    let mut controller = laid_out(false);
    assert_eq!(controller.thumb_color(), Argb(0xFFFF_FFFF));
    assert_eq!(controller.thumb_shadow_color(), Argb(0x2600_0000));

    controller.set_enabled(false);
    assert_eq!(controller.thumb_color(), Argb(0x80FF_FFFF));
    assert_eq!(controller.thumb_shadow_color().alpha(), 0x13);
}

#[test]
fn thumb_bounds_follow_layout() {
    let controller = laid_out(false);
    assert_eq!(
        controller.thumb_bounds(),
        Some(ThumbBounds {
            left: 6,
            top: 6,
            right: 87,
            bottom: 87,
        })
    );
    let threshold = controller.commit_threshold_x().expect("laid out");
    assert!((threshold - 91.8).abs() < 1e-3);
    assert_eq!(controller.preferred_size(1.0), (51, 31));
}
