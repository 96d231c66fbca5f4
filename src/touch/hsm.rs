use super::*;
use crate::state::Press;
use statig::prelude::*;

pub(super) struct TouchHsm {
    pub(super) origin_x: f32,
    pub(super) origin_y: f32,
    pub(super) was_toggled_by_drag: bool,
}

#[state_machine(initial = "State::idle()")]
impl TouchHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &TouchHsmEvent) -> Outcome<State> {
        match event {
            TouchHsmEvent::Pointer(pointer) if pointer.kind == PointerKind::Down => {
                if self.begin_session(context, pointer) {
                    Transition(State::down())
                } else {
                    Handled
                }
            }
            // Move/Up without a session (e.g. the Down arrived while disabled).
            TouchHsmEvent::Pointer(_) | TouchHsmEvent::Abort => Handled,
        }
    }

    #[state]
    fn down(&mut self, context: &mut DispatchContext, event: &TouchHsmEvent) -> Outcome<State> {
        match event {
            TouchHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerKind::Down => self.restart_session(context, pointer, false),
                PointerKind::Move => {
                    context.handled = true;
                    let slop = context.input.thresholds.touch_slop;
                    if (pointer.x - self.origin_x).abs() > slop
                        || (pointer.y - self.origin_y).abs() > slop
                    {
                        self.origin_x = pointer.x;
                        self.origin_y = pointer.y;
                        context.emit(Intent::DragStarted);
                        log::trace!("switch touch_drag_started x={} y={}", pointer.x, pointer.y);
                        Transition(State::dragging())
                    } else {
                        Handled
                    }
                }
                PointerKind::Up | PointerKind::Cancel => {
                    context.handled = true;
                    self.close_session(context, false);
                    context.emit(Intent::Tap);
                    Transition(State::idle())
                }
            },
            TouchHsmEvent::Abort => {
                self.close_session(context, false);
                Transition(State::idle())
            }
        }
    }

    #[state]
    fn dragging(&mut self, context: &mut DispatchContext, event: &TouchHsmEvent) -> Outcome<State> {
        match event {
            TouchHsmEvent::Pointer(pointer) => match pointer.kind {
                PointerKind::Down => self.restart_session(context, pointer, true),
                PointerKind::Move => {
                    context.handled = true;
                    self.track_drag(context, pointer.x);
                    Handled
                }
                PointerKind::Up | PointerKind::Cancel => {
                    context.handled = true;
                    self.finish_drag(context, pointer.x);
                    Transition(State::idle())
                }
            },
            TouchHsmEvent::Abort => {
                self.close_session(context, true);
                Transition(State::idle())
            }
        }
    }
}

impl TouchHsm {
    pub(super) fn new() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            was_toggled_by_drag: false,
        }
    }

    /// Opens a session at the pointer unless the control is disabled.
    fn begin_session(&mut self, context: &mut DispatchContext, pointer: &PointerEvent) -> bool {
        if !context.input.enabled {
            return false;
        }
        context.handled = true;
        self.origin_x = pointer.x;
        self.origin_y = pointer.y;
        self.was_toggled_by_drag = false;
        let side = HoldSide::for_checked(context.input.substate.is_checked());
        context.emit(Intent::ArmHoldEffect(side));
        true
    }

    /// A second `Down` force-closes the open session before starting over.
    fn restart_session(
        &mut self,
        context: &mut DispatchContext,
        pointer: &PointerEvent,
        was_dragging: bool,
    ) -> Outcome<State> {
        self.close_session(context, was_dragging);
        if self.begin_session(context, pointer) {
            Transition(State::down())
        } else {
            Transition(State::idle())
        }
    }

    fn close_session(&mut self, context: &mut DispatchContext, was_dragging: bool) {
        context.emit(Intent::SessionClosed { was_dragging });
        self.was_toggled_by_drag = false;
    }

    fn track_drag(&mut self, context: &mut DispatchContext, x: f32) {
        let input = context.input;
        let width = input.width;
        let checked = input.substate.is_checked();
        let press = input.substate.press();
        let threshold = input.thresholds.commit_threshold(width, checked);

        let crossed = if checked { x < threshold } else { x > threshold };
        let beyond_rest_edge = if checked { x > width } else { x < 0.0 };
        let inside = if checked { x < width } else { x > 0.0 };

        if crossed {
            self.was_toggled_by_drag = true;
            context.emit(Intent::CommitToggle(!checked));
        } else if beyond_rest_edge && press != Press::Default {
            context.emit(Intent::ReaffirmCurrentState);
        } else if inside && press != Press::Pressed {
            context.emit(Intent::ReapplyHoldEffect);
        }
    }

    fn finish_drag(&mut self, context: &mut DispatchContext, x: f32) {
        let input = context.input;
        let width = input.width;
        let checked = input.substate.is_checked();
        let cancel = input.thresholds.cancel_threshold(width);
        let abandoned = if checked {
            x > width + cancel
        } else {
            x < -cancel
        };
        let toggled = self.was_toggled_by_drag;

        self.close_session(context, true);
        if toggled || abandoned {
            context.emit(Intent::SettleToCurrentState);
        } else {
            context.emit(Intent::Tap);
        }
    }
}
