//! Pixel-exact collision between the avatar and the live obstacle set
//!
//! Masks, not bounding boxes: pipe heads are rounded and the avatar
//! silhouette rotates, so rectangle tests would report phantom hits at the
//! corners. Any mask overlap ends the run unconditionally.

use super::state::{Avatar, ObstacleSet};
use crate::Tuning;

/// What the avatar hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Pipe { serial: u32 },
    Ground,
}

/// Test the avatar mask against every live pipe half and the ground band
pub fn detect_collision(
    avatar: &Avatar,
    obstacles: &ObstacleSet,
    tuning: &Tuning,
) -> Option<Collision> {
    let mask = avatar.mask();
    let pos = avatar.mask_pos(tuning);

    for pair in &obstacles.pipes {
        let (top_mask, top_pos) = pair.top_mask();
        let (bottom_mask, bottom_pos) = pair.bottom_mask(tuning);
        if mask.overlaps(pos, top_mask, top_pos) || mask.overlaps(pos, bottom_mask, bottom_pos) {
            return Some(Collision::Pipe {
                serial: pair.serial,
            });
        }
    }

    let (ground_mask, ground_pos) = obstacles.ground.mask();
    if mask.overlaps(pos, ground_mask, ground_pos) {
        return Some(Collision::Ground);
    }

    None
}
