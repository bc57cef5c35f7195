//! Pagination – flows classified blocks down fixed-size pages.
//!
//! Handles:
//! - Greedy line wrapping per block at the content width
//! - Page breaks whenever the cursor drops below the bottom margin
//! - The first-page header banner and the per-page footer
//!
//! All positions are PDF points with the origin at the bottom-left, so the
//! cursor starts near the top of the page and moves down by decreasing `y`.

use chrono::Datelike;

use crate::document::{Block, Document};
use crate::fonts::{wrap_text, FontVariant, TextMeasure};
use crate::layout_config::{DrawOp, LayoutConfig, PageLayout};
use crate::style::{BlockKind, Color, BULLET, LIST_INDENT};

/// Default page margin: 20 mm in points.
pub const PAGE_MARGIN_PT: f32 = 56.69;

/// Height of the banner across the top of the first page.
pub const HEADER_HEIGHT: f32 = 60.0;
/// Gap between the banner and the first line of content.
pub const HEADER_GAP: f32 = 30.0;
const HEADER_FONT_SIZE: f32 = 20.0;

const FOOTER_FONT_SIZE: f32 = 8.0;
/// Footer elements sit at fixed offsets below the bottom margin.
const FOOTER_RULE_OFFSET: f32 = 10.0;
const FOOTER_COPYRIGHT_OFFSET: f32 = 22.0;
const FOOTER_CREDIT_OFFSET: f32 = 32.0;

/// Page size and uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: PAGE_MARGIN_PT,
        }
    }

    /// Width available for wrapped text.
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Names and colours printed in the header and footer.
#[derive(Debug, Clone, PartialEq)]
pub struct Branding {
    pub site_name: String,
    pub company_name: String,
    /// Year printed in the copyright caption.
    pub year: i32,
    pub banner_color: Color,
}

impl Branding {
    /// Branding for the current year with the default banner colour.
    pub fn new(site_name: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            company_name: company_name.into(),
            year: chrono::Local::now().year(),
            banner_color: Color::BRAND,
        }
    }

    fn copyright_line(&self) -> String {
        if self.site_name.is_empty() {
            format!("\u{00A9} {}. All rights reserved.", self.year)
        } else {
            format!("\u{00A9} {} {}. All rights reserved.", self.year, self.site_name)
        }
    }

    fn credit_line(&self) -> Option<String> {
        (!self.company_name.is_empty()).then(|| format!("Generated by {}", self.company_name))
    }
}

/// The write position. Only the flow that owns it moves it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    page: usize,
    /// Baseline of the next line.
    y: f32,
}

struct PageFlow<'a, M: TextMeasure + ?Sized> {
    geometry: PageGeometry,
    branding: &'a Branding,
    fonts: &'a M,
    pages: Vec<PageLayout>,
    cursor: Cursor,
}

impl<'a, M: TextMeasure + ?Sized> PageFlow<'a, M> {
    /// Start a flow with the first page open and its banner drawn.
    fn new(geometry: PageGeometry, branding: &'a Branding, fonts: &'a M) -> Self {
        let mut flow = Self {
            geometry,
            branding,
            fonts,
            pages: Vec::new(),
            cursor: Cursor { page: 0, y: 0.0 },
        };
        flow.open_page();
        flow.draw_header();
        flow.cursor.y = geometry.height - HEADER_HEIGHT - HEADER_GAP;
        flow
    }

    /// Append a page, give it a footer and move the cursor to its top.
    fn open_page(&mut self) {
        let index = self.pages.len();
        self.pages
            .push(PageLayout::new(index, self.geometry.width, self.geometry.height));
        self.cursor = Cursor {
            page: index,
            y: self.geometry.height - self.geometry.margin,
        };
        self.draw_footer();
    }

    fn ensure_room(&mut self) {
        if self.cursor.y < self.geometry.margin {
            log::debug!(
                "page {} full at y={:.1}, starting page {}",
                self.cursor.page,
                self.cursor.y,
                self.pages.len()
            );
            self.open_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        self.pages[self.cursor.page].ops.push(op);
    }

    fn flow_block(&mut self, block: &Block) {
        let style = block.kind.style();
        let indent = if style.bullet { LIST_INDENT } else { 0.0 };
        let max_width = self.geometry.content_width() - indent;
        let lines = wrap_text(&block.text, style.font, style.font_size, max_width, self.fonts);
        let x = self.geometry.margin;

        for (i, line) in lines.into_iter().enumerate() {
            self.ensure_room();
            let y = self.cursor.y;

            if style.bullet && i == 0 {
                self.push(DrawOp::Text {
                    x,
                    y,
                    text: BULLET.to_string(),
                    font: style.font,
                    font_size: style.font_size,
                    color: style.color,
                });
            }
            if !line.is_empty() {
                if self.fonts.text_width(&line, style.font, style.font_size) > max_width {
                    log::warn!("line of {} chars overflows the content width", line.chars().count());
                }
                self.push(DrawOp::Text {
                    x: x + indent,
                    y,
                    text: line,
                    font: style.font,
                    font_size: style.font_size,
                    color: style.color,
                });
            }

            self.cursor.y -= style.line_height;
        }

        // May leave the cursor below the margin; the next line breaks.
        self.cursor.y -= style.space_after;
    }

    fn centered_text(&self, text: String, font: FontVariant, font_size: f32, y: f32, color: Color) -> DrawOp {
        let width = self.fonts.text_width(&text, font, font_size);
        DrawOp::Text {
            x: (self.geometry.width - width) / 2.0,
            y,
            text,
            font,
            font_size,
            color,
        }
    }

    fn draw_header(&mut self) {
        let g = self.geometry;
        self.push(DrawOp::Rect {
            x: 0.0,
            y: g.height - HEADER_HEIGHT,
            width: g.width,
            height: HEADER_HEIGHT,
            color: self.branding.banner_color,
        });
        if !self.branding.site_name.is_empty() {
            // Baseline offset that roughly centres cap height in the banner.
            let y = g.height - HEADER_HEIGHT / 2.0 - HEADER_FONT_SIZE * 0.35;
            let op = self.centered_text(
                self.branding.site_name.clone(),
                FontVariant::Bold,
                HEADER_FONT_SIZE,
                y,
                Color::WHITE,
            );
            self.push(op);
        }
    }

    fn draw_footer(&mut self) {
        let g = self.geometry;
        self.push(DrawOp::Line {
            x1: g.margin,
            y1: g.margin - FOOTER_RULE_OFFSET,
            x2: g.width - g.margin,
            y2: g.margin - FOOTER_RULE_OFFSET,
            thickness: 0.5,
            color: Color::RULE,
        });

        let copyright = self.centered_text(
            self.branding.copyright_line(),
            FontVariant::Regular,
            FOOTER_FONT_SIZE,
            g.margin - FOOTER_COPYRIGHT_OFFSET,
            Color::GRAY,
        );
        self.push(copyright);

        if let Some(credit) = self.branding.credit_line() {
            let op = self.centered_text(
                credit,
                FontVariant::Regular,
                FOOTER_FONT_SIZE,
                g.margin - FOOTER_CREDIT_OFFSET,
                Color::GRAY,
            );
            self.push(op);
        }
    }
}

/// Lay out `doc` onto pages of `geometry`.
///
/// The title (when present) flows first, then every block in order. This
/// never fails; callers reject empty documents beforehand with
/// [`Document::validate`].
pub fn paginate<M: TextMeasure + ?Sized>(
    doc: &Document,
    geometry: &PageGeometry,
    branding: &Branding,
    fonts: &M,
) -> LayoutConfig {
    let mut flow = PageFlow::new(*geometry, branding, fonts);

    if !doc.title.is_empty() {
        flow.flow_block(&Block::new(BlockKind::Title, doc.title.clone()));
    }
    for block in &doc.blocks {
        flow.flow_block(block);
    }

    log::debug!(
        "laid out {} blocks on {} page(s)",
        doc.blocks.len(),
        flow.pages.len()
    );

    LayoutConfig {
        title: if doc.title.is_empty() {
            "docpress output".to_string()
        } else {
            doc.title.clone()
        },
        page_width_pt: geometry.width,
        page_height_pt: geometry.height,
        pages: flow.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;

    fn branding() -> Branding {
        Branding {
            site_name: "QuickCover".to_string(),
            company_name: "Acme Ltd".to_string(),
            year: 2024,
            banner_color: Color::BRAND,
        }
    }

    fn small_page() -> PageGeometry {
        PageGeometry {
            width: 300.0,
            height: 200.0,
            margin: 20.0,
        }
    }

    fn text_position(config: &LayoutConfig, needle: &str) -> Option<(usize, f32, f32)> {
        config.pages.iter().find_map(|page| {
            page.ops.iter().find_map(|op| match op {
                DrawOp::Text { x, y, text, .. } if text == needle => Some((page.page_index, *x, *y)),
                _ => None,
            })
        })
    }

    fn body(texts: &[&str]) -> Document {
        Document {
            title: String::new(),
            blocks: texts.iter().map(|t| Block::new(BlockKind::Body, *t)).collect(),
        }
    }

    #[test]
    fn single_page() {
        let fonts = FontManager::default();
        let doc = Document::from_markup("Report", "<p>Short text</p>");
        let config = paginate(&doc, &PageGeometry::a4(), &branding(), &fonts);
        assert_eq!(config.pages.len(), 1);
    }

    #[test]
    fn header_only_on_first_page_footer_on_all() {
        let fonts = FontManager::default();
        let texts: Vec<String> = (0..80).map(|i| format!("Paragraph {i}")).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let config = paginate(&body(&refs), &PageGeometry::a4(), &branding(), &fonts);
        assert!(config.pages.len() > 1);

        for page in &config.pages {
            let rects = page.ops.iter().filter(|op| matches!(op, DrawOp::Rect { .. })).count();
            let lines = page.ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count();
            assert_eq!(rects, usize::from(page.page_index == 0));
            assert_eq!(lines, 1);
            let texts = page.texts();
            assert!(texts.contains(&"\u{00A9} 2024 QuickCover. All rights reserved."));
            assert!(texts.contains(&"Generated by Acme Ltd"));
            assert_eq!(texts.contains(&"QuickCover"), page.page_index == 0);
        }
    }

    #[test]
    fn space_after_may_cross_margin_and_next_block_breaks() {
        let fonts = FontManager::default();
        let config = paginate(&body(&["b1", "b2", "b3", "b4", "b5"]), &small_page(), &branding(), &fonts);

        // First page starts at 200 - 60 - 30 = 110; each body block uses 14 + 10.
        assert_eq!(text_position(&config, "b1"), Some((0, 20.0, 110.0)));
        assert_eq!(text_position(&config, "b4"), Some((0, 20.0, 38.0)));
        // b4 leaves the cursor at 14 (< margin); b5 opens a page at 200 - 20.
        assert_eq!(text_position(&config, "b5"), Some((1, 20.0, 180.0)));
        assert_eq!(config.pages.len(), 2);
    }

    #[test]
    fn explicit_blank_line_advances_cursor() {
        let fonts = FontManager::default();
        let config = paginate(&body(&["a\n\nb"]), &small_page(), &branding(), &fonts);
        assert_eq!(text_position(&config, "a").map(|p| p.2), Some(110.0));
        assert_eq!(text_position(&config, "b").map(|p| p.2), Some(82.0));
        // The blank line draws nothing.
        assert!(!config.pages[0].texts().contains(&""));
    }

    #[test]
    fn empty_blocks_take_no_space() {
        let fonts = FontManager::default();
        let with_empty = Document::from_markup("", "<p>a</p><p> </p><h2></h2><p>b</p>");
        let without = Document::from_markup("", "<p>a</p><p>b</p>");
        let c1 = paginate(&with_empty, &small_page(), &branding(), &fonts);
        let c2 = paginate(&without, &small_page(), &branding(), &fonts);
        assert_eq!(c1.pages[0].ops, c2.pages[0].ops);
    }

    #[test]
    fn list_items_get_bullet_and_indent() {
        let fonts = FontManager::default();
        let doc = Document {
            title: String::new(),
            // Wraps at 260 - 15 = 245pt, i.e. 49 chars at 10pt.
            blocks: vec![Block::new(
                BlockKind::ListItem,
                "first line of a list item that is long enough to wrap onto a second line",
            )],
        };
        let config = paginate(&doc, &small_page(), &branding(), &fonts);
        let page = &config.pages[0];

        let bullets: Vec<&DrawOp> = page
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Text { text, .. } if text == BULLET))
            .collect();
        assert_eq!(bullets.len(), 1);
        assert!(matches!(bullets[0], DrawOp::Text { x, y, .. } if *x == 20.0 && *y == 110.0));

        let item_lines: Vec<(f32, f32)> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, .. } if *x == 35.0 && text != BULLET => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(item_lines, vec![(35.0, 110.0), (35.0, 96.0)]);
    }

    #[test]
    fn list_item_narrower_than_indent_is_not_wrapped() {
        let fonts = FontManager::default();
        // Content width 10pt, so list text gets 10 - 15 = -5pt.
        let narrow = PageGeometry {
            width: 50.0,
            height: 200.0,
            margin: 20.0,
        };
        let doc = Document {
            title: String::new(),
            blocks: vec![Block::new(BlockKind::ListItem, "two words")],
        };
        let config = paginate(&doc, &narrow, &branding(), &fonts);
        assert_eq!(text_position(&config, "two words"), Some((0, 35.0, 110.0)));
        assert_eq!(text_position(&config, BULLET), Some((0, 20.0, 110.0)));
    }

    #[test]
    fn title_flows_before_body() {
        let fonts = FontManager::default();
        let doc = Document::from_markup("Policy Summary", "<p>Body</p>");
        let config = paginate(&doc, &small_page(), &branding(), &fonts);
        let (_, _, title_y) = text_position(&config, "Policy Summary").unwrap();
        let (_, _, body_y) = text_position(&config, "Body").unwrap();
        assert_eq!(title_y, 110.0);
        // Title line height 24 + space after 18.
        assert_eq!(body_y, 68.0);
        assert_eq!(config.title, "Policy Summary");
    }

    #[test]
    fn footer_captions_are_centered() {
        let fonts = FontManager::default();
        let config = paginate(&body(&["x"]), &small_page(), &branding(), &fonts);
        let credit = "Generated by Acme Ltd";
        let (_, x, y) = text_position(&config, credit).unwrap();
        let width = fonts.text_width(credit, FontVariant::Regular, FOOTER_FONT_SIZE);
        assert!((x - (300.0 - width) / 2.0).abs() < 1e-3);
        assert_eq!(y, 20.0 - FOOTER_CREDIT_OFFSET);
    }

    #[test]
    fn empty_branding_omits_optional_text() {
        let fonts = FontManager::default();
        let bare = Branding {
            site_name: String::new(),
            company_name: String::new(),
            year: 2030,
            banner_color: Color::BRAND,
        };
        let config = paginate(&body(&["x"]), &small_page(), &bare, &fonts);
        let texts = config.pages[0].texts();
        assert_eq!(texts, vec!["\u{00A9} 2030. All rights reserved.", "x"]);
    }
}
