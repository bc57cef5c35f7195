//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Layout coordinates are already PDF points with a bottom-left origin, so
//! draw ops map one-to-one onto printpdf ops.

use printpdf::*;

use crate::error::Result;
use crate::fonts::FontVariant;
use crate::layout_config::{DrawOp, LayoutConfig};
use crate::style;

/// Render a LayoutConfig into PDF bytes.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    let mut doc = PdfDocument::new(&config.title);

    let mut pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page_layout| {
            let mut ops = Vec::new();
            for op in &page_layout.ops {
                render_op(&mut ops, op);
            }
            PdfPage::new(pt_to_mm(page_layout.width_pt), pt_to_mm(page_layout.height_pt), ops)
        })
        .collect();

    // Ensure at least one page.
    if pages.is_empty() {
        pages.push(PdfPage::new(
            pt_to_mm(config.page_width_pt),
            pt_to_mm(config.page_height_pt),
            Vec::new(),
        ));
    }

    log::debug!("serialising {} page(s) for {:?}", pages.len(), config.title);
    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 0.352778)
}

fn rgb(c: &style::Color) -> Color {
    Color::Rgb(Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
        icc_profile: None,
    })
}

fn builtin(font: FontVariant) -> BuiltinFont {
    match font {
        FontVariant::Regular => BuiltinFont::Helvetica,
        FontVariant::Bold => BuiltinFont::HelveticaBold,
    }
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{201A}' => 0x82, // single low-9 quote
            '\u{201E}' => 0x84, // double low-9 quote
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{2122}' => 0x99, // trademark
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for 0x80-0x9F range; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}

fn render_op(ops: &mut Vec<Op>, op: &DrawOp) {
    match op {
        DrawOp::Text {
            x,
            y,
            text,
            font,
            font_size,
            color,
        } => {
            let font = builtin(*font);
            ops.push(Op::StartTextSection);
            ops.push(Op::SetTextCursor {
                pos: Point { x: Pt(*x), y: Pt(*y) },
            });
            ops.push(Op::SetFontSizeBuiltinFont {
                size: Pt(*font_size),
                font,
            });
            ops.push(Op::SetFillColor { col: rgb(color) });
            ops.push(Op::WriteTextBuiltinFont {
                items: vec![TextItem::Text(to_winlatin(text))],
                font,
            });
            ops.push(Op::EndTextSection);
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        } => {
            let (x1, y1, x2, y2) = (*x, *y, x + width, y + height);
            ops.push(Op::SetFillColor { col: rgb(color) });
            ops.push(Op::DrawPolygon {
                polygon: Polygon {
                    rings: vec![PolygonRing {
                        points: vec![point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)],
                    }],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                },
            });
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
            color,
        } => {
            ops.push(Op::SetOutlineColor { col: rgb(color) });
            ops.push(Op::SetOutlineThickness { pt: Pt(*thickness) });
            ops.push(Op::DrawLine {
                line: Line {
                    points: vec![point(*x1, *y1), point(*x2, *y2)],
                    is_closed: false,
                },
            });
        }
    }
}
