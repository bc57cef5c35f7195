//! # docpress – markup documents → paginated PDF
//!
//! This crate lays out generated documents (guides, policy summaries,
//! invoices) onto fixed-size pages. The pipeline stages are:
//!
//! 1. **Scan** – markup string → node tree → flat blocks ([`dom`])
//! 2. **Classify** – blocks → typed plain-text blocks ([`document`], [`style`])
//! 3. **Paginate** – wrap lines and flow them down pages ([`pagination`], [`fonts`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])
//!
//! [`pipeline`] runs all of them in one call; a C-compatible FFI surface is
//! exposed via the [`ffi`] module.

pub mod document;
pub mod dom;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod invoice;
pub mod layout_config;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod templates;

// Re-exports for convenience
pub use error::{Error, Result};
pub use pipeline::{compute_layout_config, generate_pdf, render_document, PageOrientation, PipelineConfig};
