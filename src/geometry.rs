use crate::{config::LayoutConfig, state::ThumbPosition};

pub fn dp(density: f32, value: f32) -> f32 {
    value * density
}

/// Whole-pixel conversion, rounded up so small sizes never collapse to zero.
pub fn dp_ceil(density: f32, value: u32) -> u32 {
    (value as f32 * density).ceil() as u32
}

/// Measured size for a control drawn at `scale` times its nominal size.
pub fn preferred_size(layout: &LayoutConfig, density: f32, scale: f32) -> (u32, u32) {
    let width = (scale * dp_ceil(density, layout.width_dp) as f32).round();
    let height = (scale * dp_ceil(density, layout.height_dp) as f32).round();
    (width.max(0.0) as u32, height.max(0.0) as u32)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThumbBounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Thumb rail derived from the laid-out track size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchGeometry {
    width: f32,
    height: f32,
    thumb_radius: f32,
    thumb_min: f32,
    thumb_max: f32,
}

impl SwitchGeometry {
    /// `None` until the host reports a non-empty size.
    pub fn new(width: f32, height: f32, thumb_offset_percent: f32) -> Option<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return None;
        }
        let thumb_offset = height * thumb_offset_percent;
        let thumb_radius = height / 2.0 - thumb_offset;
        Some(Self {
            width,
            height,
            thumb_radius,
            thumb_min: thumb_offset + thumb_radius,
            thumb_max: width - thumb_offset - thumb_radius,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn thumb_radius(&self) -> f32 {
        self.thumb_radius
    }

    pub fn thumb_min(&self) -> f32 {
        self.thumb_min
    }

    pub fn thumb_max(&self) -> f32 {
        self.thumb_max
    }

    pub fn rail_length(&self) -> f32 {
        self.thumb_max - self.thumb_min
    }

    pub fn thumb_center(&self, fraction: f32) -> f32 {
        self.thumb_min + self.rail_length() * fraction
    }

    pub fn thumb_bounds(&self, position: ThumbPosition) -> ThumbBounds {
        let center_y = self.height / 2.0;
        ThumbBounds {
            left: (self.thumb_center(position.left) - self.thumb_radius).round() as i32,
            top: (center_y - self.thumb_radius).round() as i32,
            right: (self.thumb_center(position.right) + self.thumb_radius).round() as i32,
            bottom: (center_y + self.thumb_radius).round() as i32,
        }
    }

    /// One pixel of thumb travel expressed as a position fraction.
    pub fn thumb_min_visible_change(&self, fallback: f32) -> f32 {
        let rail = self.rail_length();
        if rail >= 1.0 {
            1.0 / rail
        } else {
            fallback
        }
    }

    /// X coordinate a drag has to cross to flip away from `checked`.
    pub fn commit_threshold_x(&self, checked: bool, drag_toggle_percent: f32) -> f32 {
        let percent = if checked {
            1.0 - drag_toggle_percent
        } else {
            drag_toggle_percent
        };
        self.width * percent
    }
}
