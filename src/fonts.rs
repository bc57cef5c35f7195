//! Font metrics and text wrapping.
//!
//! Rendering uses the PDF builtin Helvetica faces, so by default we measure
//! with Helvetica-like heuristic advances. A TTF/OTF face can be loaded per
//! variant to measure real glyph advances via `ttf-parser`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The two faces the renderer draws with.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    Regular,
    Bold,
}

/// Anything that can tell how wide a run of text is.
pub trait TextMeasure {
    /// Width in points of `text` set in `font` at `font_size`.
    fn text_width(&self, text: &str, font: FontVariant, font_size: f32) -> f32;
}

/// A loaded font face with the metrics we need for measurement.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes (kept alive for ttf-parser's zero-copy API).
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
}

/// Manages the faces used for measurement.
pub struct FontManager {
    fonts: HashMap<FontVariant, FontData>,
}

impl FontManager {
    /// A manager with no loaded faces; every variant uses heuristic metrics.
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Load a TTF/OTF face for `variant` from bytes.
    pub fn load_font(&mut self, variant: FontVariant, bytes: Vec<u8>) -> Result<()> {
        let face = ttf_parser::Face::parse(&bytes, 0).map_err(|e| Error::FontParse(e.to_string()))?;
        let units_per_em = face.units_per_em() as f32;
        log::debug!("loaded {variant:?} face ({units_per_em} units/em)");
        self.fonts.insert(variant, FontData { bytes, units_per_em });
        Ok(())
    }

    /// Whether real font bytes are loaded for `variant`.
    pub fn has_real_font(&self, variant: FontVariant) -> bool {
        self.fonts.contains_key(&variant)
    }

    fn heuristic_width(text: &str, font: FontVariant, font_size: f32) -> f32 {
        // Average Helvetica advance ≈ 0.5 em; bold is ~10 % wider.
        let avg = match font {
            FontVariant::Regular => 0.5,
            FontVariant::Bold => 0.55,
        };
        text.chars().count() as f32 * font_size * avg
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for FontManager {
    fn text_width(&self, text: &str, font: FontVariant, font_size: f32) -> f32 {
        let Some(data) = self.fonts.get(&font) else {
            return Self::heuristic_width(text, font, font_size);
        };

        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        // Fallback for missing glyph
                        None => font_size * 0.5,
                    })
                    .sum()
            }
            Err(_) => Self::heuristic_width(text, font, font_size),
        }
    }
}

/// Word-wrap `text` to fit within `max_width` points.
///
/// Each `'\n'`-separated unit wraps on its own; a unit without words yields
/// exactly one empty line. A word wider than `max_width` is kept whole on
/// its own line.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    font: FontVariant,
    font_size: f32,
    max_width: f32,
    fonts: &M,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for unit in text.split('\n') {
        if max_width <= 0.0 {
            lines.push(unit.split_whitespace().collect::<Vec<_>>().join(" "));
            continue;
        }

        let mut current_line = String::new();
        for word in unit.split_whitespace() {
            if current_line.is_empty() {
                current_line.push_str(word);
                continue;
            }
            let candidate = format!("{current_line} {word}");
            if fonts.text_width(&candidate, font, font_size) < max_width {
                current_line = candidate;
            } else {
                lines.push(std::mem::replace(&mut current_line, word.to_string()));
            }
        }
        // An empty unit still contributes its (empty) line.
        lines.push(current_line);
    }

    lines
}
