//! Utility functions for vision processing

/// Convert an 8-bit RGB pixel to 8-bit HSV.
///
/// Hue is in degrees halved (0..180) so it fits a byte; saturation and value
/// are scaled to 0..=255. This matches the convention the HSV bounds in the
/// configuration are written in.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let saturation = if max > 0.0 { diff * 255.0 / max } else { 0.0 };

    let mut hue = if diff == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / diff
    } else if max == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    let mut h = (hue / 2.0).round() as u16;
    if h >= 180 {
        h -= 180;
    }

    [h as u8, saturation.round().min(255.0) as u8, max as u8]
}

/// Euclidean distance between two points
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}
