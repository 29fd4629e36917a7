use serde::{Deserialize, Serialize};

use arcade_core::geometry::Aabb;

/// Fall speed of a dropped capsule (px per frame).
pub const ITEM_FALL_SPEED: f32 = 2.0;
pub const ITEM_WIDTH: f32 = 16.0;
pub const ITEM_HEIGHT: f32 = 8.0;

/// Power-up capsules dropped by destroyed bricks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Expand,
    Shrink,
    Slow,
    Fast,
    Multi,
    Laser,
    Catch,
    Life,
    Barrier,
    Penetrate,
}

impl ItemKind {
    pub const ALL: [ItemKind; 10] = [
        ItemKind::Expand,
        ItemKind::Shrink,
        ItemKind::Slow,
        ItemKind::Fast,
        ItemKind::Multi,
        ItemKind::Laser,
        ItemKind::Catch,
        ItemKind::Life,
        ItemKind::Barrier,
        ItemKind::Penetrate,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub x: f32,
    pub y: f32,
    pub kind: ItemKind,
    pub active: bool,
}

impl Item {
    /// Spawn centred on a point.
    pub fn dropped_at(cx: f32, cy: f32, kind: ItemKind) -> Self {
        Self {
            x: cx - ITEM_WIDTH / 2.0,
            y: cy - ITEM_HEIGHT / 2.0,
            kind,
            active: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, ITEM_WIDTH, ITEM_HEIGHT)
    }
}

/// Upward laser bolt fired from the paddle edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

pub const LASER_SPEED: f32 = 6.0;
pub const LASER_WIDTH: f32 = 2.0;
pub const LASER_HEIGHT: f32 = 8.0;

impl Laser {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x - LASER_WIDTH / 2.0, self.y, LASER_WIDTH, LASER_HEIGHT)
    }
}
