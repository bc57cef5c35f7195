//! Markup scanner – converts an HTML-like body string into a small node tree
//! and flattens it into the top-level blocks the renderer lays out.
//!
//! The input is generated content (AI documents, invoices), so we support a
//! controlled subset:
//! - Blocks: h1-h6, p, li, and a top-level strong/b
//! - Containers that are descended into: ul, ol, div, section, article, ...
//! - Inline markup inside blocks is reduced to plain text; `<br>` is a line break
//!
//! Attributes are parsed and discarded.

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    P,
    Li,
    Strong,
    B,
    Em,
    I,
    Span,
    A,
    Br,
    Hr,
    Img,
    Ul,
    Ol,
    Div,
    Section,
    Article,
    Main,
    Header,
    Footer,
    Body,
    Html,
    Head,
    Title,
    Style,
    Script,
    /// Catch-all for unknown tags – they classify as body text.
    Unknown(String),
}

impl Tag {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "h5" => Tag::H5,
            "h6" => Tag::H6,
            "p" => Tag::P,
            "li" => Tag::Li,
            "strong" => Tag::Strong,
            "b" => Tag::B,
            "em" => Tag::Em,
            "i" => Tag::I,
            "span" => Tag::Span,
            "a" => Tag::A,
            "br" => Tag::Br,
            "hr" => Tag::Hr,
            "img" => Tag::Img,
            "ul" => Tag::Ul,
            "ol" => Tag::Ol,
            "div" => Tag::Div,
            "section" => Tag::Section,
            "article" => Tag::Article,
            "main" => Tag::Main,
            "header" => Tag::Header,
            "footer" => Tag::Footer,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            "title" => Tag::Title,
            "style" => Tag::Style,
            "script" => Tag::Script,
            other => Tag::Unknown(other.to_string()),
        }
    }

    /// Wrapper elements whose children are blocks of their own.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Tag::Ul
                | Tag::Ol
                | Tag::Div
                | Tag::Section
                | Tag::Article
                | Tag::Main
                | Tag::Header
                | Tag::Footer
                | Tag::Body
                | Tag::Html
        )
    }

    /// Elements that never have content or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br | Tag::Hr | Tag::Img)
            || matches!(self, Tag::Unknown(name) if matches!(name.as_str(), "meta" | "link" | "input" | "wbr"))
    }

    /// Subtrees that never contribute visible text.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Tag::Head | Tag::Title | Tag::Style | Tag::Script)
    }

    pub fn is_emphasis(&self) -> bool {
        matches!(self, Tag::Strong | Tag::B)
    }

    fn is_block_level(&self) -> bool {
        self.is_container()
            || matches!(
                self,
                Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6 | Tag::P | Tag::Li
            )
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying its tag and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// True when the element's entire content is exactly one `<strong>` or
    /// `<b>` pair (surrounding whitespace aside).
    pub fn is_wholly_emphasized(&self) -> bool {
        let mut significant = self.children.iter().filter(|c| match c {
            DomNode::Text(t) => !t.trim().is_empty(),
            DomNode::Element(_) => true,
        });
        matches!(
            (significant.next(), significant.next()),
            (Some(DomNode::Element(e)), None) if e.tag.is_emphasis()
        )
    }

    /// Reduce the element's content to plain text.
    ///
    /// Whitespace runs collapse to one space, `<br>` becomes `'\n'`, and
    /// each resulting line is trimmed. Leading and trailing blank lines are
    /// removed; interior blank lines are kept.
    pub fn plain_text(&self) -> String {
        let mut raw = String::new();
        collect_text(&self.children, &mut raw);
        let lines: Vec<String> = raw
            .split('\n')
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        lines.join("\n").trim_matches('\n').to_string()
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(t) => {
                out.extend(t.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c }));
            }
            DomNode::Element(e) if e.tag == Tag::Br => out.push('\n'),
            DomNode::Element(e) if e.tag.is_ignored() => {}
            DomNode::Element(e) => {
                // Keep words in adjacent nested blocks apart.
                let spaced = e.tag.is_block_level();
                if spaced {
                    out.push(' ');
                }
                collect_text(&e.children, out);
                if spaced {
                    out.push(' ');
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent over HTML-like markup
// ---------------------------------------------------------------------------

/// Parse a markup string into a list of DOM nodes.
///
/// Stray closing tags are skipped, and an element only consumes a closing tag
/// whose name matches its own, so malformed input degrades gracefully instead
/// of truncating the document.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    let mut nodes = Vec::new();
    loop {
        nodes.extend(parser.parse_nodes());
        if parser.eof() {
            break;
        }
        // A closing tag nobody opened.
        parser.skip_closing_tag();
    }
    nodes
}

/// Elements nested deeper than this are flattened: their tags are dropped
/// and their content joins the enclosing element.
pub const MAX_DEPTH: usize = 256;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    /// Open elements enclosing the current position.
    depth: usize,
    flattened: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
            flattened: false,
        }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Skip doctype / processing instructions
            self.skip_past('>');
            return None;
        }
        if self.starts_with("<") && self.peek_tag_start() {
            self.parse_element()
        } else {
            Some(self.parse_text())
        }
    }

    /// `<` followed by a letter opens a tag; anything else is literal text.
    fn peek_tag_start(&self) -> bool {
        self.input[self.pos + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        // The first char may be a literal '<'.
        self.advance(1);
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> Option<DomNode> {
        // Consume '<'
        self.advance(1);
        let tag_name = self.parse_tag_name();
        let tag = Tag::from_str(&tag_name);
        let mut elem = ElementNode::new(tag.clone());

        let self_closed = self.skip_attributes();
        if self_closed || tag.is_void() {
            return Some(DomNode::Element(elem));
        }

        let raw_text = matches!(tag, Tag::Style | Tag::Script);
        if self.depth >= MAX_DEPTH && !raw_text {
            if !self.flattened {
                log::warn!("markup nests deeper than {MAX_DEPTH} elements, flattening the rest");
                self.flattened = true;
            }
            return None;
        }

        if raw_text {
            // Raw text content; never parsed as markup.
            let close = format!("</{tag_name}");
            let end = find_ascii_ci(&self.input[self.pos..], &close)
                .map(|i| self.pos + i)
                .unwrap_or(self.input.len());
            self.pos = end;
        } else {
            self.depth += 1;
            elem.children = self.parse_nodes();
            self.depth -= 1;
        }

        // Consume our closing tag; leave someone else's for an ancestor.
        if self.starts_with("</") {
            let saved = self.pos;
            self.advance(2);
            let closing = self.parse_tag_name();
            if closing.eq_ignore_ascii_case(&tag_name) {
                self.skip_past('>');
            } else {
                self.pos = saved;
            }
        }

        Some(DomNode::Element(elem))
    }

    fn parse_tag_name(&mut self) -> String {
        let start = self.pos;
        while !self.eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    /// Skip to the end of the start tag. Returns true for `/>`.
    fn skip_attributes(&mut self) -> bool {
        let mut quote: Option<char> = None;
        while !self.eof() {
            let c = self.current_char();
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '"' || c == '\'' => quote = Some(c),
                None if self.starts_with("/>") => {
                    self.advance(2);
                    return true;
                }
                None if c == '>' => {
                    self.advance(1);
                    return false;
                }
                None => {}
            }
            self.advance(1);
        }
        false
    }

    fn skip_closing_tag(&mut self) {
        self.advance(2);
        self.skip_past('>');
    }

    fn skip_past(&mut self, end: char) {
        while !self.eof() && self.current_char() != end {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(1);
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4); // skip <!--
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, n: usize) {
        // Advance by `n` characters (not bytes).
        for _ in 0..n {
            if let Some(c) = self.input[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .to_ascii_lowercase()
        .find(&needle.to_ascii_lowercase())
}

/// Byte offset of the `;` ending the longest reference we recognise.
const MAX_ENTITY_LEN: usize = 10;

/// Decode named and numeric character references in a single pass.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        // Only look as far as the longest reference we decode.
        let decoded = tail
            .char_indices()
            .take(MAX_ENTITY_LEN + 1)
            .find(|&(_, c)| c == ';')
            .map(|(semi, _)| semi)
            .filter(|&semi| semi <= MAX_ENTITY_LEN)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '\u{00A9}',
        "euro" => '\u{20AC}',
        "pound" => '\u{00A3}',
        "times" => '\u{00D7}',
        "middot" => '\u{00B7}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bull" => '\u{2022}',
        _ => return None,
    })
}

/// Escape text for embedding in generated markup.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// ---------------------------------------------------------------------------
// Block extraction
// ---------------------------------------------------------------------------

/// Flatten a parsed tree into the ordered list of block elements.
///
/// Container elements are descended into; every other element is one block.
/// Stray non-blank text between blocks becomes a paragraph.
pub fn collect_blocks(nodes: &[DomNode]) -> Vec<ElementNode> {
    let mut blocks = Vec::new();
    collect_blocks_into(nodes, &mut blocks);
    blocks
}

fn collect_blocks_into(nodes: &[DomNode], blocks: &mut Vec<ElementNode>) {
    for node in nodes {
        match node {
            DomNode::Element(e) if e.tag.is_ignored() => {}
            DomNode::Element(e) if e.tag.is_container() => collect_blocks_into(&e.children, blocks),
            DomNode::Element(e) if e.tag.is_void() => {}
            DomNode::Element(e) => blocks.push(e.clone()),
            DomNode::Text(t) if t.trim().is_empty() => {}
            DomNode::Text(t) => {
                let mut p = ElementNode::new(Tag::P);
                p.children.push(DomNode::Text(t.clone()));
                blocks.push(p);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_element(nodes: &[DomNode]) -> &ElementNode {
        assert_eq!(nodes.len(), 1, "expected one node, got {nodes:?}");
        match &nodes[0] {
            DomNode::Element(e) => e,
            other => panic!("Expected element, got {other:?}"),
        }
    }

    #[test]
    fn parse_heading_with_attributes() {
        let nodes = parse_html(r#"<h2 class="title" data-x='a>b'>Coverage</h2>"#);
        let e = only_element(&nodes);
        assert_eq!(e.tag, Tag::H2);
        assert_eq!(e.plain_text(), "Coverage");
    }

    #[test]
    fn nested_inline_markup_reduces_to_text() {
        let nodes = parse_html("<p>Hello <span>big <em>wide</em></span> world</p>");
        let e = only_element(&nodes);
        assert_eq!(e.plain_text(), "Hello big wide world");
    }

    #[test]
    fn br_becomes_line_break() {
        let nodes = parse_html("<p>line one<br>line two<br/><br />line four</p>");
        let e = only_element(&nodes);
        assert_eq!(e.plain_text(), "line one\nline two\n\nline four");
    }

    #[test]
    fn source_newlines_are_whitespace() {
        let nodes = parse_html("<p>\n  wrapped\n  source text\n</p>");
        assert_eq!(only_element(&nodes).plain_text(), "wrapped source text");
    }

    #[test]
    fn entities_decode_once() {
        assert_eq!(decode_entities("a &amp;lt; b &#8217; &#x41; &bogus; &"), "a &lt; b \u{2019} A &bogus; &");
    }

    #[test]
    fn emphasis_detection() {
        let whole = parse_html("<p> <strong>Important</strong> </p>");
        assert!(only_element(&whole).is_wholly_emphasized());

        let partial = parse_html("<p><strong>Note:</strong> read this</p>");
        assert!(!only_element(&partial).is_wholly_emphasized());

        let two = parse_html("<p><b>a</b><b>b</b></p>");
        assert!(!only_element(&two).is_wholly_emphasized());
    }

    #[test]
    fn lists_flatten_into_items() {
        let nodes = parse_html("<h1>T</h1><ul><li>A</li><li>B</li></ul><div><p>C</p></div>");
        let blocks = collect_blocks(&nodes);
        let tags: Vec<&Tag> = blocks.iter().map(|b| &b.tag).collect();
        assert_eq!(tags, vec![&Tag::H1, &Tag::Li, &Tag::Li, &Tag::P]);
    }

    #[test]
    fn head_and_scripts_are_ignored() {
        let html = "<html><head><title>x</title><style>p{}</style></head>\
                    <body><script>if (a < b) {}</script><p>Visible</p></body></html>";
        let blocks = collect_blocks(&parse_html(html));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "Visible");
    }

    #[test]
    fn stray_closing_tags_do_not_truncate() {
        let blocks = collect_blocks(&parse_html("<p>a</p></div><p>b</p>"));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn mismatched_close_is_left_for_ancestor() {
        let blocks = collect_blocks(&parse_html("<p>a <span>b</p><p>c</p>"));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].plain_text(), "a b");
        assert_eq!(blocks[1].plain_text(), "c");
    }

    #[test]
    fn stray_text_becomes_paragraph() {
        let blocks = collect_blocks(&parse_html("Intro text <p>Body</p>"));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].tag, Tag::P);
        assert_eq!(blocks[0].plain_text(), "Intro text");
    }

    #[test]
    fn deep_nesting_is_flattened() {
        let html = format!("{}<p>x</p>", "<div>".repeat(100_000));
        let blocks = collect_blocks(&parse_html(&html));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "x");
    }

    #[test]
    fn nesting_below_the_limit_is_kept() {
        let depth = MAX_DEPTH - 1;
        let html = format!("<p>{}deep{}</p>", "<span>".repeat(depth), "</span>".repeat(depth));
        let nodes = parse_html(&html);
        let p = only_element(&nodes);
        assert_eq!(p.plain_text(), "deep");

        let mut levels = 0;
        let mut node = p;
        while let Some(DomNode::Element(child)) = node.children.first() {
            levels += 1;
            node = child;
        }
        assert_eq!(levels, depth);
    }

    #[test]
    fn deep_inline_markup_keeps_its_text() {
        let html = format!("<p>{}a{} b</p><p>c</p>", "<em>".repeat(1_000), "</em>".repeat(1_000));
        let blocks = collect_blocks(&parse_html(&html));
        let texts: Vec<String> = blocks.iter().map(ElementNode::plain_text).collect();
        assert!(texts.iter().any(|t| t.starts_with('a')), "{texts:?}");
        assert_eq!(texts.last().map(String::as_str), Some("c"));
    }

    #[test]
    fn ampersand_runs_pass_through() {
        let input = "&".repeat(200_000);
        assert_eq!(decode_entities(&input), input);
        assert_eq!(decode_entities("&verylongname; &amp;"), "&verylongname; &");
    }

    #[test]
    fn literal_angle_bracket_is_text() {
        let blocks = collect_blocks(&parse_html("<p>1 < 2</p>"));
        assert_eq!(blocks[0].plain_text(), "1 < 2");
    }
}
