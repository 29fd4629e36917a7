use serde::{Deserialize, Serialize};

/// Logical play field shared by every game.
pub const FIELD_WIDTH: f32 = 320.0;
pub const FIELD_HEIGHT: f32 = 480.0;

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Clamp a horizontally controlled centre so the body stays on the field.
pub fn clamp_center(x: f32, half_width: f32, field_width: f32) -> f32 {
    if !x.is_finite() {
        return field_width / 2.0;
    }
    x.clamp(half_width, field_width - half_width)
}
