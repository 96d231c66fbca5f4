/// Whether a pointer currently holds the thumb in its stretched, pressed look.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press {
    Default,
    Pressed,
}

/// Logical value crossed with the press sub-state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Substate {
    Checked(Press),
    Unchecked(Press),
}

impl Substate {
    pub const fn settled(checked: bool) -> Self {
        Self::with_press(checked, Press::Default)
    }

    pub const fn pressed(checked: bool) -> Self {
        Self::with_press(checked, Press::Pressed)
    }

    pub const fn with_press(checked: bool, press: Press) -> Self {
        if checked {
            Self::Checked(press)
        } else {
            Self::Unchecked(press)
        }
    }

    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked(_))
    }

    pub const fn press(self) -> Press {
        match self {
            Self::Checked(press) | Self::Unchecked(press) => press,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Checked(Press::Default) => "checked",
            Self::Checked(Press::Pressed) => "checked_pressed",
            Self::Unchecked(Press::Default) => "unchecked",
            Self::Unchecked(Press::Pressed) => "unchecked_pressed",
        }
    }
}

/// Side the thumb rests on when a hold effect is armed; the stretch grows
/// away from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldSide {
    Left,
    Right,
}

impl HoldSide {
    pub const fn for_checked(checked: bool) -> Self {
        if checked {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Right)
    }
}

/// Fractional positions of the thumb's two edges along the rail.
///
/// `left > right` is allowed transiently while springs chase the stretch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThumbPosition {
    pub left: f32,
    pub right: f32,
}

impl ThumbPosition {
    pub const fn at(fraction: f32) -> Self {
        Self {
            left: fraction,
            right: fraction,
        }
    }

    pub fn is_unified(&self) -> bool {
        self.left == self.right
    }
}

/// Rest target for a logical value.
pub const fn target_for(checked: bool) -> f32 {
    if checked {
        1.0
    } else {
        0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToggleState {
    substate: Substate,
    thumb: ThumbPosition,
    track_tint_fraction: f32,
}

impl ToggleState {
    pub fn new(checked: bool) -> Self {
        Self {
            substate: Substate::settled(checked),
            thumb: ThumbPosition::at(target_for(checked)),
            track_tint_fraction: target_for(checked),
        }
    }

    pub fn checked(&self) -> bool {
        self.substate.is_checked()
    }

    pub fn substate(&self) -> Substate {
        self.substate
    }

    pub fn thumb_position(&self) -> ThumbPosition {
        self.thumb
    }

    pub fn track_tint_fraction(&self) -> f32 {
        self.track_tint_fraction
    }

    /// Returns the previous sub-state.
    pub(crate) fn set_substate(&mut self, substate: Substate) -> Substate {
        core::mem::replace(&mut self.substate, substate)
    }

    /// Stores animated values, clamped to `[0, 1]`. Returns `true` when
    /// anything visible changed.
    pub(crate) fn set_animated(&mut self, thumb: ThumbPosition, tint: f32) -> bool {
        let thumb = ThumbPosition {
            left: unit_clamp(thumb.left, self.thumb.left),
            right: unit_clamp(thumb.right, self.thumb.right),
        };
        let tint = unit_clamp(tint, self.track_tint_fraction);
        let changed = thumb != self.thumb || tint != self.track_tint_fraction;
        self.thumb = thumb;
        self.track_tint_fraction = tint;
        changed
    }
}

fn unit_clamp(value: f32, previous: f32) -> f32 {
    if value.is_nan() {
        previous
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_rests_on_its_side() {
        let on = ToggleState::new(true);
        assert!(on.checked());
        assert_eq!(on.substate(), Substate::Checked(Press::Default));
        assert_eq!(on.thumb_position(), ThumbPosition::at(1.0));
        assert_eq!(on.track_tint_fraction(), 1.0);

        let off = ToggleState::new(false);
        assert_eq!(off.substate(), Substate::Unchecked(Press::Default));
        assert_eq!(off.thumb_position(), ThumbPosition::at(0.0));
    }

    #[test]
    fn animated_values_stay_in_unit_range() {
        let mut state = ToggleState::new(false);
        assert!(state.set_animated(
            ThumbPosition {
                left: -0.2,
                right: 1.4
            },
            f32::NAN
        ));
        assert_eq!(
            state.thumb_position(),
            ThumbPosition {
                left: 0.0,
                right: 1.0
            }
        );
        assert_eq!(state.track_tint_fraction(), 0.0);
        assert!(!state.set_animated(state.thumb_position(), 0.0));
    }

    #[test]
    fn substate_carries_checked_value() {
        assert!(Substate::pressed(true).is_checked());
        assert_eq!(Substate::pressed(false).press(), Press::Pressed);
        assert_eq!(HoldSide::for_checked(true), HoldSide::Right);
        assert!(!HoldSide::Left.is_checked());
    }
}
