//! Document model – classifies markup blocks into typed, plain-text blocks.

use serde::{Deserialize, Serialize};

use crate::dom::{collect_blocks, parse_html, ElementNode, Tag};
use crate::error::{Error, Result};
use crate::style::BlockKind;

/// One semantic unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Plain text; `'\n'` marks an explicit line break.
    pub text: String,
}

impl Block {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A title plus the ordered body blocks to lay out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Build a document from a title and a markup body.
    ///
    /// Blocks with no text are dropped. When the first block repeats the
    /// title (case-insensitively) it is dropped too, since the title is
    /// already drawn above the body.
    pub fn from_markup(title: &str, body: &str) -> Self {
        let nodes = parse_html(body);
        let mut blocks: Vec<Block> = collect_blocks(&nodes).iter().filter_map(classify).collect();

        let title = title.trim();
        if !title.is_empty()
            && blocks
                .first()
                .is_some_and(|b| b.text.to_lowercase() == title.to_lowercase())
        {
            log::debug!("dropping leading block that repeats the title {title:?}");
            blocks.remove(0);
        }

        Self {
            title: title.to_string(),
            blocks,
        }
    }

    /// Reject documents with nothing to draw in the body.
    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(())
    }
}

/// Map one block element to its kind and plain text.
///
/// A paragraph whose whole content is one `<strong>`/`<b>` pair becomes
/// [`BlockKind::Emphasis`]; this is checked on the element's children before
/// the markup is reduced to text. Returns `None` for blocks without text.
pub fn classify(elem: &ElementNode) -> Option<Block> {
    let kind = if elem.tag == Tag::P && elem.is_wholly_emphasized() {
        BlockKind::Emphasis
    } else {
        BlockKind::for_tag(&elem.tag)
    };

    let text = elem.plain_text();
    if text.trim().is_empty() {
        return None;
    }
    Some(Block { kind, text })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(doc: &Document) -> Vec<BlockKind> {
        doc.blocks.iter().map(|b| b.kind).collect()
    }

    #[test]
    fn classifies_table_rows() {
        let body = "<h1>a</h1><h2>b</h2><h3>c</h3><h4>d</h4><h5>e</h5><h6>f</h6>\
                    <strong>g</strong><p>h</p><p><strong>i</strong></p><li>j</li><blockquote>k</blockquote>";
        let doc = Document::from_markup("", body);
        assert_eq!(
            kinds(&doc),
            vec![
                BlockKind::Heading1,
                BlockKind::Heading2,
                BlockKind::Heading3,
                BlockKind::Heading4,
                BlockKind::Heading5,
                BlockKind::Heading6,
                BlockKind::Heading4,
                BlockKind::Body,
                BlockKind::Emphasis,
                BlockKind::ListItem,
                BlockKind::Body,
            ]
        );
        assert_eq!(doc.blocks[8].text, "i");
    }

    #[test]
    fn partial_emphasis_stays_body() {
        let doc = Document::from_markup("", "<p><strong>Note:</strong> details follow</p>");
        assert_eq!(doc.blocks, vec![Block::new(BlockKind::Body, "Note: details follow")]);
    }

    #[test]
    fn empty_blocks_are_dropped() {
        let doc = Document::from_markup("", "<p>  </p><h2><span></span></h2><p><br></p><p>kept</p>");
        assert_eq!(doc.blocks, vec![Block::new(BlockKind::Body, "kept")]);
    }

    #[test]
    fn leading_title_duplicate_is_suppressed() {
        let doc = Document::from_markup("Report", "<h1>REPORT</h1><p>Hello world</p>");
        assert_eq!(doc.title, "Report");
        assert_eq!(doc.blocks, vec![Block::new(BlockKind::Body, "Hello world")]);
    }

    #[test]
    fn only_the_first_block_is_checked_for_duplication() {
        let doc = Document::from_markup("Report", "<p>Intro</p><h1>Report</h1>");
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn near_duplicates_are_kept() {
        let doc = Document::from_markup("Report", "<h1>Report 2024</h1>");
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn empty_body_fails_validation() {
        let doc = Document::from_markup("Title", "<p></p>");
        assert!(matches!(doc.validate(), Err(Error::EmptyDocument)));

        // A body that only repeats the title has nothing left to draw.
        let doc = Document::from_markup("Title", "<h1>Title</h1>");
        assert!(doc.validate().is_err());
    }

    #[test]
    fn list_items_keep_source_order() {
        let doc = Document::from_markup("", "<ol><li>one</li><li>two</li><li>three</li></ol>");
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }
}
