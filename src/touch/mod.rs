use statig::blocking::IntoStateMachineExt as _;

mod hsm;

use hsm::{State, TouchHsm};

use crate::{
    config::GestureConfig,
    geometry::dp,
    state::{HoldSide, Substate},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// Primary-pointer event in control-local pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub const fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self { kind, x, y }
    }

    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub const fn move_to(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    pub const fn cancel(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Cancel, x, y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchMode {
    Idle,
    Down,
    Dragging,
}

/// What a pointer event means for the switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Schedule the delayed stretch growing away from `side`.
    ArmHoldEffect(HoldSide),
    DragStarted,
    /// Drag crossed the commit line; flip to the given value now.
    CommitToggle(bool),
    /// Pointer left the track past the resting side; snap back fully.
    ReaffirmCurrentState,
    /// Pointer re-entered the track; stretch again.
    ReapplyHoldEffect,
    Tap,
    SettleToCurrentState,
    /// Session ended; any armed hold timer belongs to it.
    SessionClosed { was_dragging: bool },
}

pub const INTENT_CAPACITY: usize = 4;

pub type IntentBuffer = heapless::Vec<Intent, INTENT_CAPACITY>;

/// Pixel thresholds for one density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureThresholds {
    pub touch_slop: f32,
    pub drag_toggle_percent: f32,
    pub cancel_percent: f32,
}

impl GestureThresholds {
    pub fn from_config(gesture: &GestureConfig, density: f32) -> Self {
        Self {
            touch_slop: dp(density, gesture.touch_slop_dp),
            drag_toggle_percent: gesture.drag_toggle_threshold_percent,
            cancel_percent: gesture.cancel_threshold_percent,
        }
    }

    /// Smaller on the side the thumb rests on, so flipping back is as easy
    /// as flipping away.
    pub fn commit_threshold(&self, width: f32, checked: bool) -> f32 {
        let percent = if checked {
            1.0 - self.drag_toggle_percent
        } else {
            self.drag_toggle_percent
        };
        width * percent
    }

    pub fn cancel_threshold(&self, width: f32) -> f32 {
        width * self.cancel_percent
    }
}

/// Control state the classifier reads for one event.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierInput {
    pub enabled: bool,
    pub substate: Substate,
    pub width: f32,
    pub thresholds: GestureThresholds,
}

#[derive(Clone, Debug, Default)]
pub struct ClassifierOutput {
    pub intents: IntentBuffer,
    pub handled: bool,
}

#[derive(Clone, Copy, Debug)]
enum TouchHsmEvent {
    Pointer(PointerEvent),
    Abort,
}

#[derive(Clone, Debug)]
struct DispatchContext {
    input: ClassifierInput,
    intents: IntentBuffer,
    handled: bool,
}

impl DispatchContext {
    fn new(input: ClassifierInput) -> Self {
        Self {
            input,
            intents: IntentBuffer::new(),
            handled: false,
        }
    }

    fn emit(&mut self, intent: Intent) {
        if self.intents.push(intent).is_err() {
            log::warn!("switch intent_dropped intent={intent:?}");
        }
    }

    fn finish(self) -> ClassifierOutput {
        ClassifierOutput {
            intents: self.intents,
            handled: self.handled,
        }
    }
}

/// Turns the primary pointer stream into [`Intent`]s. One touch session
/// lives from `Down` to `Up`/`Cancel`.
pub struct GestureClassifier {
    machine: statig::blocking::StateMachine<TouchHsm>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            machine: TouchHsm::new().state_machine(),
        }
    }

    pub fn on_event(&mut self, event: PointerEvent, input: ClassifierInput) -> ClassifierOutput {
        let mut context = DispatchContext::new(input);
        self.machine
            .handle_with_context(&TouchHsmEvent::Pointer(event), &mut context);
        context.finish()
    }

    /// Closes an open session without a release decision.
    pub fn abort(&mut self, input: ClassifierInput) -> ClassifierOutput {
        let mut context = DispatchContext::new(input);
        self.machine
            .handle_with_context(&TouchHsmEvent::Abort, &mut context);
        context.finish()
    }

    pub fn mode(&self) -> TouchMode {
        match self.machine.state() {
            State::Idle {} => TouchMode::Idle,
            State::Down {} => TouchMode::Down,
            State::Dragging {} => TouchMode::Dragging,
        }
    }

    pub fn was_toggled_by_drag(&self) -> bool {
        self.machine.inner().was_toggled_by_drag
    }

    pub fn origin(&self) -> (f32, f32) {
        let inner = self.machine.inner();
        (inner.origin_x, inner.origin_y)
    }
}
