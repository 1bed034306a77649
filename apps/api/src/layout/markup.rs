//! Block model for preview markup.
//!
//! The composer sends HTML fragments. Only the structure that changes vertical
//! extent is kept: block boundaries, headings, list/blockquote indentation,
//! hard line breaks and images with an explicit height. Inline tags are dropped
//! and do not change metrics. `<script>`, `<style>` and comments are skipped.

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Kind of a laid-out block; decides font scale and default margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Text outside any margin-carrying element (bare text, `div`).
    Anonymous,
    Paragraph,
    /// `h1`..`h6`; the level is kept in 1..=6.
    Heading(u8),
    ListItem,
    Blockquote,
    /// Marks where a top-level `ul`/`ol` opens or closes; contributes only margin.
    ListBoundary,
    /// `img` with the height taken from its `height` attribute.
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// Text runs separated by `<br>`; each run starts a new line.
    pub segments: Vec<String>,
    /// Left indentation from enclosing lists and blockquotes.
    pub indent_px: f32,
    /// Only meaningful for `BlockKind::Image`.
    pub image_height_px: f32,
}

const INDENT_STEP_PX: f32 = 40.0;

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

/// Splits markup into blocks in document order.
pub fn parse_blocks(markup: &str) -> Vec<Block> {
    let mut parser = BlockParser::default();
    let mut rest = markup;

    while let Some(lt) = rest.find('<') {
        parser.push_text(&rest[..lt]);
        rest = &rest[lt..];

        if !opens_tag(rest) {
            parser.push_text("<");
            rest = &rest[1..];
            continue;
        }

        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
            continue;
        }

        let Some(gt) = rest.find('>') else {
            // Unterminated tag: treat the remainder as text, as browsers do.
            parser.push_text(rest);
            rest = "";
            break;
        };
        let tag = Tag::parse(&rest[1..gt]);
        rest = &rest[gt + 1..];

        if let Some(tag) = tag {
            if !tag.closing && (tag.name == "script" || tag.name == "style") {
                let close = format!("</{}", tag.name);
                rest = match find_ascii_case_insensitive(rest, &close) {
                    Some(end) => match rest[end..].find('>') {
                        Some(gt) => &rest[end + gt + 1..],
                        None => "",
                    },
                    None => "",
                };
                continue;
            }
            parser.handle_tag(&tag);
        }
    }
    parser.push_text(rest);
    parser.finish()
}

/// A `<` only starts markup when followed by a letter, `/`, `!` or `?`.
fn opens_tag(rest: &str) -> bool {
    matches!(
        rest.as_bytes().get(1),
        Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?')
    )
}

#[derive(Default)]
struct BlockParser {
    blocks: Vec<Block>,
    /// Open block-level elements, innermost last.
    stack: Vec<String>,
    text: String,
    segments: Vec<String>,
}

impl BlockParser {
    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.text.push_str(&decode_entities(raw));
    }

    fn handle_tag(&mut self, tag: &Tag) {
        match tag.name.as_str() {
            "br" => {
                self.segments.push(std::mem::take(&mut self.text));
            }
            "img" => {
                self.flush();
                self.blocks.push(Block {
                    kind: BlockKind::Image,
                    segments: Vec::new(),
                    indent_px: self.indent_px(),
                    image_height_px: tag.height.unwrap_or(0.0),
                });
            }
            name if is_block_element(name) => {
                self.flush();
                let is_list = name == "ul" || name == "ol";
                let depth_before = self.list_depth();
                if tag.closing {
                    if let Some(pos) = self.stack.iter().rposition(|open| open == name) {
                        self.stack.truncate(pos);
                    }
                } else if !tag.self_closing {
                    self.stack.push(name.to_string());
                }
                let outermost = if tag.closing {
                    depth_before == 1
                } else {
                    depth_before == 0
                };
                if is_list && outermost {
                    self.blocks.push(Block {
                        kind: BlockKind::ListBoundary,
                        segments: Vec::new(),
                        indent_px: 0.0,
                        image_height_px: 0.0,
                    });
                }
            }
            _ => {}
        }
    }

    fn current_kind(&self) -> BlockKind {
        for name in self.stack.iter().rev() {
            match name.as_str() {
                "p" => return BlockKind::Paragraph,
                "li" => return BlockKind::ListItem,
                "blockquote" => return BlockKind::Blockquote,
                h if h.len() == 2 && h.starts_with('h') => {
                    if let Some(level) = h[1..].parse::<u8>().ok().filter(|l| (1..=6).contains(l)) {
                        return BlockKind::Heading(level);
                    }
                }
                _ => {}
            }
        }
        BlockKind::Anonymous
    }

    fn list_depth(&self) -> usize {
        self.stack.iter().filter(|n| *n == "ul" || *n == "ol").count()
    }

    fn indent_px(&self) -> f32 {
        let steps = self
            .stack
            .iter()
            .filter(|n| matches!(n.as_str(), "ul" | "ol" | "blockquote"))
            .count();
        steps as f32 * INDENT_STEP_PX
    }

    fn flush(&mut self) {
        let has_text = !self.text.trim().is_empty();
        if !has_text && self.segments.is_empty() {
            self.text.clear();
            return;
        }
        let mut segments = std::mem::take(&mut self.segments);
        if has_text {
            segments.push(std::mem::take(&mut self.text));
        } else {
            self.text.clear();
        }
        self.blocks.push(Block {
            kind: self.current_kind(),
            segments,
            indent_px: self.indent_px(),
            image_height_px: 0.0,
        });
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "table"
            | "tr"
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tags and entities
// ────────────────────────────────────────────────────────────────────────────

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    height: Option<f32>,
}

impl Tag {
    /// Parses the inside of `<...>`. Doctype and processing instructions yield `None`.
    fn parse(inner: &str) -> Option<Tag> {
        let inner = inner.trim();
        if inner.starts_with('!') || inner.starts_with('?') {
            return None;
        }
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body.trim_start()),
            None => (false, inner),
        };
        let self_closing = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let name_end = body
            .find(|c: char| c.is_whitespace())
            .unwrap_or(body.len());
        let name = body[..name_end].to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Tag {
            name,
            closing,
            self_closing,
            height: attribute(&body[name_end..], "height").and_then(|v| {
                v.trim_end_matches("px").trim().parse::<f32>().ok()
            }),
        })
    }
}

/// Reads `key="value"`, `key='value'` or `key=value` from an attribute list.
fn attribute<'a>(attrs: &'a str, key: &str) -> Option<&'a str> {
    let mut rest = attrs;
    while let Some(pos) = find_ascii_case_insensitive(rest, key) {
        let before_ok = pos == 0 || rest[..pos].ends_with(|c: char| c.is_whitespace());
        let after = rest[pos + key.len()..].trim_start();
        if before_ok {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start();
                return Some(match value.chars().next() {
                    Some(q @ ('"' | '\'')) => {
                        let inner = &value[1..];
                        &inner[..inner.find(q).unwrap_or(inner.len())]
                    }
                    _ => {
                        let end = value
                            .find(|c: char| c.is_whitespace())
                            .unwrap_or(value.len());
                        &value[..end]
                    }
                });
            }
        }
        rest = &rest[pos + key.len()..];
    }
    None
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Decodes the handful of entities editors actually emit.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_anonymous_block() {
        let blocks = parse_blocks("Curtain up at seven");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Anonymous);
        assert_eq!(blocks[0].segments, vec!["Curtain up at seven".to_string()]);
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let blocks = parse_blocks("<h2>Synopsis</h2><p>Act one.</p><p>Act two.</p>");
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(2),
                BlockKind::Paragraph,
                BlockKind::Paragraph
            ]
        );
    }

    #[test]
    fn test_inline_tags_do_not_split_blocks() {
        let blocks = parse_blocks("<p>Starring <strong>Ada</strong> as <em>Juliet</em></p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].segments[0], "Starring Ada as Juliet");
    }

    #[test]
    fn test_line_breaks_become_segments() {
        let blocks = parse_blocks("<p>Line one<br>Line two<br/>Line three</p>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].segments.len(), 3);
    }

    #[test]
    fn test_lists_indent_and_emit_boundaries() {
        let blocks = parse_blocks("<ul><li>Props</li><li>Lighting</li></ul>");
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::ListBoundary,
                BlockKind::ListItem,
                BlockKind::ListItem,
                BlockKind::ListBoundary
            ]
        );
        assert_eq!(blocks[1].indent_px, 40.0);
    }

    #[test]
    fn test_image_height_attribute() {
        let blocks = parse_blocks(r#"<p>Cast</p><img src="a.png" height="120"><p>More</p>"#);
        let image = blocks.iter().find(|b| b.kind == BlockKind::Image).unwrap();
        assert_eq!(image.image_height_px, 120.0);
    }

    #[test]
    fn test_script_style_and_comments_are_skipped() {
        let blocks =
            parse_blocks("<style>p{color:red}</style><!-- note --><p>Shown</p><script>x()</script>");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].segments[0], "Shown");
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let blocks = parse_blocks("<p>Ages 5 < 12 half price, all others full price</p><p>Next</p>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(
            blocks[0].segments,
            vec!["Ages 5 < 12 half price, all others full price".to_string()]
        );
        assert_eq!(blocks[1].segments, vec!["Next".to_string()]);

        let trailing = parse_blocks("Tickets <");
        assert_eq!(trailing[0].segments, vec!["Tickets <".to_string()]);
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(decode_entities("Rosencrantz &amp; Guildenstern"), "Rosencrantz & Guildenstern");
        assert_eq!(decode_entities("&#65;&#x42;&lt;"), "AB<");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
    }

    #[test]
    fn test_empty_markup_has_no_blocks() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("<div>   </div>").is_empty());
    }
}
