//! Block kinds and the style table that maps each kind to its typography.

use serde::{Deserialize, Serialize};

use crate::dom::Tag;
use crate::fonts::FontVariant;

/// Horizontal indent of list item text from the left margin, in points.
pub const LIST_INDENT: f32 = 15.0;

/// Glyph drawn in front of the first line of each list item.
pub const BULLET: &str = "\u{2022}";

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Headings and emphasised text.
    pub const DARK: Color = Color::rgb(0.12, 0.16, 0.22);
    /// Body text, list items and footer captions.
    pub const GRAY: Color = Color::rgb(0.29, 0.33, 0.39);
    /// Header banner fill.
    pub const BRAND: Color = Color::rgb(0.15, 0.39, 0.92);
    /// Footer divider.
    pub const RULE: Color = Color::rgb(0.82, 0.84, 0.86);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |h: &str| u8::from_str_radix(h, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }
}

/// What a block is, which decides how it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// The document title, flowed ahead of the body.
    Title,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Body,
    /// A paragraph whose whole content is emphasised.
    Emphasis,
    ListItem,
}

/// Resolved typography for one block kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockStyle {
    pub font: FontVariant,
    pub font_size: f32,
    pub color: Color,
    pub line_height: f32,
    /// Vertical space left after the block's last line.
    pub space_after: f32,
    /// Draw a bullet and indent the text (list items only).
    pub bullet: bool,
}

const fn bold(font_size: f32, line_height: f32, space_after: f32) -> BlockStyle {
    BlockStyle {
        font: FontVariant::Bold,
        font_size,
        color: Color::DARK,
        line_height,
        space_after,
        bullet: false,
    }
}

const fn regular(font_size: f32, line_height: f32, space_after: f32) -> BlockStyle {
    BlockStyle {
        font: FontVariant::Regular,
        font_size,
        color: Color::GRAY,
        line_height,
        space_after,
        bullet: false,
    }
}

impl BlockKind {
    /// Default kind for tags without a row of their own.
    pub const DEFAULT: BlockKind = BlockKind::Body;

    /// Kind for a block element's tag. Paragraph emphasis is decided by the
    /// classifier, which can see the element's content.
    pub fn for_tag(tag: &Tag) -> BlockKind {
        match tag {
            Tag::H1 => BlockKind::Heading1,
            Tag::H2 => BlockKind::Heading2,
            Tag::H3 => BlockKind::Heading3,
            Tag::H4 | Tag::Strong | Tag::B => BlockKind::Heading4,
            Tag::H5 => BlockKind::Heading5,
            Tag::H6 => BlockKind::Heading6,
            Tag::Li => BlockKind::ListItem,
            Tag::P => BlockKind::Body,
            _ => Self::DEFAULT,
        }
    }

    pub fn style(self) -> BlockStyle {
        match self {
            BlockKind::Title => bold(20.0, 24.0, 18.0),
            BlockKind::Heading1 => bold(18.0, 22.0, 15.0),
            BlockKind::Heading2 => bold(16.0, 20.0, 12.0),
            BlockKind::Heading3 => bold(14.0, 18.0, 10.0),
            BlockKind::Heading4 | BlockKind::Emphasis => bold(12.0, 16.0, 8.0),
            BlockKind::Heading5 => bold(11.0, 15.0, 7.0),
            BlockKind::Heading6 => bold(10.0, 14.0, 6.0),
            BlockKind::Body => regular(10.0, 14.0, 10.0),
            BlockKind::ListItem => BlockStyle {
                bullet: true,
                ..regular(10.0, 14.0, 5.0)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_table() {
        let h1 = BlockKind::Heading1.style();
        assert_eq!(h1.font, FontVariant::Bold);
        assert_eq!((h1.font_size, h1.line_height, h1.space_after), (18.0, 22.0, 15.0));
        assert_eq!(h1.color, Color::DARK);

        let h6 = BlockKind::Heading6.style();
        assert_eq!((h6.font_size, h6.line_height, h6.space_after), (10.0, 14.0, 6.0));
    }

    #[test]
    fn strong_maps_to_heading4() {
        assert_eq!(BlockKind::for_tag(&Tag::Strong), BlockKind::Heading4);
        assert_eq!(BlockKind::Emphasis.style(), BlockKind::Heading4.style());
    }

    #[test]
    fn unknown_tags_fall_back_to_body() {
        assert_eq!(BlockKind::for_tag(&Tag::Unknown("blockquote".into())), BlockKind::Body);
        assert_eq!(BlockKind::for_tag(&Tag::Span), BlockKind::Body);
        let body = BlockKind::Body.style();
        assert_eq!(body.font, FontVariant::Regular);
        assert_eq!(body.color, Color::GRAY);
        assert!(!body.bullet);
    }

    #[test]
    fn list_items_have_bullets() {
        let li = BlockKind::ListItem.style();
        assert!(li.bullet);
        assert_eq!(li.space_after, 5.0);
    }

    #[test]
    fn hex_colors() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert!((c.r - 1.0).abs() < 1e-6 && (c.g - 0.502).abs() < 0.01 && c.b == 0.0);
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("blue"), None);
    }
}
