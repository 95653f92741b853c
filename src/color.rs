use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Genre colours: genre name → Color32
// ---------------------------------------------------------------------------

/// Maps every genre of the dataset to a distinct colour, so a genre keeps
/// its colour whichever one is selected.
#[derive(Debug, Clone, Default)]
pub struct GenreColors {
    mapping: BTreeMap<String, Color32>,
}

impl GenreColors {
    pub fn new(genres: &BTreeSet<String>) -> Self {
        let palette = generate_palette(genres.len());
        GenreColors {
            mapping: genres.iter().cloned().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping.get(genre).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Correlation heatmap scale
// ---------------------------------------------------------------------------

/// Viridis control points, dark purple (-1) to yellow (+1).
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Heatmap colour for a correlation in `[-1, 1]`. Degenerate cells (`None`)
/// take the colour of 0.
pub fn correlation_color(value: Option<f64>) -> Color32 {
    let t = ((value.unwrap_or(0.0).clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let scaled = t * (VIRIDIS.len() - 1) as f32;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - i as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(VIRIDIS[i]).mix(stop(VIRIDIS[i + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn contrast_text(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn genre_colours_are_stable() {
        let genres: BTreeSet<String> = ["pop", "rock", "edm"].iter().map(|s| s.to_string()).collect();
        let colors = GenreColors::new(&genres);
        assert_eq!(colors.color_for("pop"), colors.color_for("pop"));
        assert_ne!(colors.color_for("pop"), colors.color_for("rock"));
        assert_eq!(colors.color_for("polka"), Color32::GRAY);
    }

    #[test]
    fn correlation_scale_endpoints() {
        assert_eq!(correlation_color(Some(-1.0)), Color32::from_rgb(68, 1, 84));
        assert_eq!(correlation_color(Some(1.0)), Color32::from_rgb(253, 231, 37));
        assert_eq!(correlation_color(None), correlation_color(Some(0.0)));
        assert_eq!(contrast_text(Color32::from_rgb(253, 231, 37)), Color32::BLACK);
        assert_eq!(contrast_text(Color32::from_rgb(68, 1, 84)), Color32::WHITE);
    }
}
