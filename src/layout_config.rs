//! Layout config – the intermediate representation between page flow and PDF
//! rendering. This is the "frozen" structure that encodes exactly what goes
//! on each page.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner of
//! the page.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::FontVariant;
use crate::style::Color;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of draw instructions, in paint order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub width_pt: f32,
    pub height_pt: f32,
    pub ops: Vec<DrawOp>,
}

/// A single draw instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// A run of text whose baseline starts at `(x, y)`.
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontVariant,
        font_size: f32,
        color: Color,
    },
    /// A filled rectangle with its bottom-left corner at `(x, y)`.
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// A stroked straight line.
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Color,
    },
}

impl LayoutConfig {
    /// Create an empty A4 layout config.
    pub fn a4() -> Self {
        Self {
            title: Self::default_title(),
            // A4: 210mm × 297mm = 595.28 × 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "docpress output".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All text runs in document order, with the page each is on.
    pub fn text_runs(&self) -> impl Iterator<Item = (usize, &DrawOp)> + '_ {
        self.pages.iter().flat_map(|page| {
            page.ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Text { .. }))
                .map(move |op| (page.page_index, op))
        })
    }
}

impl PageLayout {
    pub fn new(page_index: usize, width_pt: f32, height_pt: f32) -> Self {
        Self {
            page_index,
            width_pt,
            height_pt,
            ops: Vec::new(),
        }
    }

    /// The text of every text run on this page.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
