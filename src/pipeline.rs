//! Pipeline – ties together markup classification, pagination, and rendering
//! into a single function call.

use std::fs;
use std::path::Path;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::fonts::{FontManager, TextMeasure};
use crate::invoice::Invoice;
use crate::layout_config::LayoutConfig;
use crate::pagination::{paginate, Branding, PageGeometry, PAGE_MARGIN_PT};
use crate::render::render_pdf;
use crate::style::Color;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height (short-edge binding).
    Landscape,
}

/// Configuration for the PDF generation pipeline.
///
/// Every field has a default, so a JSON config file only needs the keys it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Uniform page margin in points (default: 20 mm).
    pub page_margin: f32,
    /// Page orientation; swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Shown in the header banner and the copyright caption.
    pub site_name: String,
    /// Shown in the "Generated by" caption.
    pub company_name: String,
    /// Copyright year; the current year when unset.
    pub year: Option<i32>,
    /// Banner fill as `#rrggbb`; the brand blue when unset.
    pub banner_color: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            page_margin: PAGE_MARGIN_PT,
            orientation: PageOrientation::Portrait,
            site_name: String::new(),
            company_name: String::new(),
            year: None,
            banner_color: None,
        }
    }
}

impl PipelineConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    /// Load a config from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.effective_width(),
            height: self.effective_height(),
            margin: self.page_margin,
        }
    }

    pub fn branding(&self) -> Result<Branding> {
        let mut branding = Branding::new(self.site_name.clone(), self.company_name.clone());
        if let Some(year) = self.year {
            branding.year = year;
        }
        if let Some(hex) = &self.banner_color {
            branding.banner_color = Color::from_hex(hex)
                .ok_or_else(|| Error::Config(format!("banner_color {hex:?} is not #rrggbb")))?;
        }
        Ok(branding)
    }

    /// Check that the page leaves room for content.
    pub fn validate(&self) -> Result<()> {
        let g = self.geometry();
        if !(g.width.is_finite() && g.height.is_finite() && g.width > 0.0 && g.height > 0.0) {
            return Err(Error::Config(format!(
                "page size must be positive, got {}x{}",
                g.width, g.height
            )));
        }
        if !(g.margin.is_finite() && g.margin >= 0.0) {
            return Err(Error::Config(format!("page margin must be non-negative, got {}", g.margin)));
        }
        if g.content_width() <= 0.0 || 2.0 * g.margin >= g.height {
            return Err(Error::Config(format!(
                "margin {} leaves no content area on a {}x{} page",
                g.margin, g.width, g.height
            )));
        }
        if let Some(year) = self.year {
            let current = chrono::Local::now().year();
            if year > current + 1 {
                log::warn!("copyright year {year} is in the future");
            }
        }
        Ok(())
    }
}

/// Validate and lay out an already classified document with caller-supplied
/// font metrics.
pub fn layout_document<M: TextMeasure + ?Sized>(
    doc: &Document,
    config: &PipelineConfig,
    fonts: &M,
) -> Result<LayoutConfig> {
    config.validate()?;
    doc.validate()?;
    let branding = config.branding()?;
    Ok(paginate(doc, &config.geometry(), &branding, fonts))
}

/// Markup → layout, measured with the builtin font metrics.
pub fn compute_layout_config(title: &str, body: &str, config: &PipelineConfig) -> Result<LayoutConfig> {
    let doc = Document::from_markup(title, body);
    layout_document(&doc, config, &FontManager::default())
}

/// Full pipeline: markup → PDF bytes.
///
/// Returns `(pdf_bytes, layout)`.
pub fn generate_pdf(title: &str, body: &str, config: &PipelineConfig) -> Result<(Vec<u8>, LayoutConfig)> {
    let layout = compute_layout_config(title, body, config)?;
    let pdf_bytes = render_pdf(&layout)?;
    Ok((pdf_bytes, layout))
}

/// Lay out a document on A4 with the given header/footer names.
pub fn render_document(
    title: &str,
    body: &str,
    site_name: &str,
    company_name: &str,
) -> Result<LayoutConfig> {
    let config = PipelineConfig {
        site_name: site_name.to_string(),
        company_name: company_name.to_string(),
        ..PipelineConfig::default()
    };
    compute_layout_config(title, body, &config)
}

/// Validate an invoice and render it to PDF.
pub fn generate_invoice_pdf(invoice: &Invoice, config: &PipelineConfig) -> Result<(Vec<u8>, LayoutConfig)> {
    invoice.validate()?;
    generate_pdf(&invoice.title(), &invoice.to_markup()?, config)
}
