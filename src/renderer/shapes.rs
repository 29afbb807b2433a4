//! Shape generation for 2D primitives
//!
//! Everything is emitted as a plain triangle list in viewport pixels.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;

/// Raw extents of the parametric heart curve below
const HEART_RAW_WIDTH: f32 = 32.0;
const HEART_RAW_HEIGHT: f32 = 29.0;
/// Shift that puts the curve's bounding box center at the origin
const HEART_RAW_CENTER_Y: f32 = -2.5;

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to RGBA
pub fn hsl_to_rgba(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> [f32; 4] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c * 0.5;
    [r + m, g + m, b + m, alpha]
}

/// Point on the heart outline for `t` in [0, 2π), screen orientation (tip down)
fn heart_point(t: f32) -> Vec2 {
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    Vec2::new(x / HEART_RAW_WIDTH, -(y - HEART_RAW_CENTER_Y) / HEART_RAW_HEIGHT)
}

/// Filled heart fitting `size`, rotated by `rotation` radians about `center`
pub fn heart(center: Vec2, size: Vec2, rotation: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(8);
    let rot = Vec2::from_angle(rotation);
    let outline = |i: u32| {
        let t = (i as f32 / segments as f32) * TAU;
        center + rot.rotate(heart_point(t) * size)
    };

    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    for i in 0..segments {
        let a = outline(i);
        let b = outline(i + 1);
        // Fan from the center
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
    }

    vertices
}

/// Rectangle of `size` centered on `center`, rotated by `rotation` radians
pub fn oriented_quad(center: Vec2, size: Vec2, rotation: f32, color: [f32; 4]) -> [Vertex; 6] {
    let rot = Vec2::from_angle(rotation);
    let half = size * 0.5;
    let corner = |sx: f32, sy: f32| {
        let p = center + rot.rotate(Vec2::new(half.x * sx, half.y * sy));
        Vertex::new(p.x, p.y, color)
    };
    let (tl, tr, br, bl) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));
    [tl, tr, br, tl, br, bl]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(hsl_to_rgba(0.0, 1.0, 0.5, 1.0), [1.0, 0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgba(120.0, 1.0, 0.5, 1.0), [0.0, 1.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgba(240.0, 1.0, 0.5, 0.5), [0.0, 0.0, 1.0, 0.5]));
        // Hue wraps
        assert!(close(hsl_to_rgba(360.0, 1.0, 0.5, 1.0), hsl_to_rgba(0.0, 1.0, 0.5, 1.0)));
        // No saturation is grey
        assert!(close(hsl_to_rgba(200.0, 0.0, 0.3, 1.0), [0.3, 0.3, 0.3, 1.0]));
    }

    #[test]
    fn test_heart_fits_its_box() {
        let center = Vec2::new(100.0, 100.0);
        let size = Vec2::new(60.0, 54.0);
        let verts = heart(center, size, 0.0, [1.0; 4], 24);
        assert_eq!(verts.len(), 24 * 3);
        for v in &verts {
            let d = Vec2::from(v.position) - center;
            assert!(d.x.abs() <= size.x * 0.5 + 0.01, "x out of box: {d:?}");
            assert!(d.y.abs() <= size.y * 0.5 + 0.01, "y out of box: {d:?}");
        }
    }

    #[test]
    fn test_heart_tip_points_down() {
        // t = π is the bottom tip of the curve
        let tip = heart_point(PI);
        assert!(tip.y > 0.4);
        assert!(tip.x.abs() < 1e-4);
    }

    #[test]
    fn test_quad_rotation() {
        let quad = oriented_quad(Vec2::ZERO, Vec2::new(4.0, 2.0), PI / 2.0, [1.0; 4]);
        // Top-left corner (-2, -1) rotated a quarter turn lands at (1, -2)
        assert!((quad[0].position[0] - 1.0).abs() < 1e-5);
        assert!((quad[0].position[1] + 2.0).abs() < 1e-5);
    }
}
