use core::time::Duration;

use crate::{
    host::{ControllerOutput, HoldToken, HostEffect},
    state::HoldSide,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct ArmedHold {
    pub(super) token: HoldToken,
    pub(super) side: HoldSide,
}

/// Single slot for the delayed stretch. Arming always cancels whatever the
/// slot held, so a callback from an earlier session can never match.
#[derive(Debug, Default)]
pub(super) struct HoldTimer {
    armed: Option<ArmedHold>,
    next_id: u32,
}

impl HoldTimer {
    pub(super) fn armed(&self) -> Option<ArmedHold> {
        self.armed
    }

    pub(super) fn arm(&mut self, side: HoldSide, delay: Duration, output: &mut ControllerOutput) {
        self.cancel(output);
        let token = HoldToken::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.armed = Some(ArmedHold { token, side });
        output.push(HostEffect::ScheduleHold { token, delay });
        log::debug!(
            "switch hold_armed token={} side={:?} delay_ms={}",
            token.id(),
            side,
            delay.as_millis()
        );
    }

    /// No-op when nothing is armed.
    pub(super) fn cancel(&mut self, output: &mut ControllerOutput) {
        if let Some(armed) = self.armed.take() {
            output.push(HostEffect::CancelHold(armed.token));
            log::debug!("switch hold_cancelled token={}", armed.token.id());
        }
    }

    /// Disarms and returns the side when `token` is the armed one.
    pub(super) fn fire(&mut self, token: HoldToken) -> Option<HoldSide> {
        match self.armed {
            Some(armed) if armed.token == token => {
                self.armed = None;
                Some(armed.side)
            }
            _ => None,
        }
    }
}
