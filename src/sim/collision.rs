//! Pointer hit testing against the rotated actor
//!
//! The sprite is treated as an oriented box: the pointer is moved into the
//! actor's local frame and compared against the half extents. The heart's
//! cut-out corners therefore still count as hits.

use glam::Vec2;

use super::actor::Actor;

/// Pointer position in the actor's local (unrotated, centered) frame
#[inline]
pub fn to_local(actor: &Actor, point: Vec2) -> Vec2 {
    Vec2::from_angle(-actor.orientation).rotate(point - actor.pos)
}

/// Oriented-bounding-box test of a pointer against the actor.
///
/// Pure geometry: callers must only act on the result while the actor is
/// alive and the game is in `Playing`.
pub fn hits(actor: &Actor, point: Vec2) -> bool {
    let local = to_local(actor, point);
    let half = actor.half_size();
    local.x.abs() <= half.x && local.y.abs() <= half.y
}
