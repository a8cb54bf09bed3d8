//! Display colour carried by every actor.
//!
//! Rendering is owned by the application shell; the course only records which
//! colour each actor should be drawn with so a renderer (or a snapshot dump)
//! can pick it up.

use serde::Serialize;

/// Normalised RGB colour (`0.0..=1.0` per channel).
#[derive(Clone, Debug, Copy, PartialEq, Serialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Tint {
    /// Create a tint from normalised channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a tint from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// "Circus" palette used by the course.
pub const CIRCUS_PALETTE: [Tint; 5] = [
    Tint::new(46.0 / 255.0, 9.0 / 255.0, 39.0 / 255.0),
    Tint::new(217.0 / 255.0, 0.0, 0.0),
    Tint::new(1.0, 45.0 / 255.0, 0.0),
    Tint::new(1.0, 140.0 / 255.0, 54.0 / 255.0),
    Tint::new(4.0 / 255.0, 117.0 / 255.0, 111.0 / 255.0),
];

/// Light grey used for the ground plane.
pub const GROUND_GREY: Tint = Tint::new(210.0 / 255.0, 210.0 / 255.0, 210.0 / 255.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white() {
        let t = Tint::default();
        assert_eq!(t, Tint::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_from_rgb8_normalises() {
        let t = Tint::from_rgb8(255, 0, 51);
        assert!((t.r - 1.0).abs() < 1e-6);
        assert!(t.g.abs() < 1e-6);
        assert!((t.b - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_palette_matches_rgb8() {
        assert_eq!(CIRCUS_PALETTE[1], Tint::from_rgb8(217, 0, 0));
        assert_eq!(CIRCUS_PALETTE[4], Tint::from_rgb8(4, 117, 111));
    }
}
