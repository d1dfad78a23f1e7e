//! Flat tint colour for faces with a `tintindex`.
//!
//! Biome colours are not modelled: every tinted face (grass tops, leaves,
//! vines) gets the same green.

/// Hue, saturation and lightness of the default foliage green.
pub const DEFAULT_TINT_HSL: (f32, f32, f32) = (113.0, 1.0, 0.4);

/// The default foliage green as opaque RGBA.
pub fn default_tint() -> [f32; 4] {
    let (hue, saturation, lightness) = DEFAULT_TINT_HSL;
    let [r, g, b] = hsl_to_rgb(hue, saturation, lightness);
    [r, g, b, 1.0]
}

/// Convert HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_default_tint_is_foliage_green() {
        let [r, g, b, a] = default_tint();
        assert!(close([r, g, b], [0.093_333, 0.8, 0.0]));
        assert_eq!(a, 1.0);
    }

    #[test]
    fn test_primary_colors() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(360.0, 0.0, 1.0), [1.0, 1.0, 1.0]));
    }
}
