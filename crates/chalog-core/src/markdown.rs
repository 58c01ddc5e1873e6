//! Markdown parsing and re-serialization of fragment files.
//!
//! Fragment aggregation only needs two things from a markdown engine: a flat
//! list of top-level blocks (so level-1 headings can be found) and a way to
//! turn any other block back into markdown text. [`MarkdownFormatter`]
//! captures exactly that, and [`CmarkFormatter`] implements it on top of
//! `pulldown-cmark` and `pulldown-cmark-to-cmark`.
//!
//! Blocks carry the events of the whole-document parse, so reference links
//! and footnotes stay resolved when a block is rendered on its own.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag};
use pulldown_cmark_to_cmark::Options as CmarkOptions;

use crate::error::{ChangelogError, ChangelogResult};

/// What kind of top-level block a [`Block`] is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// An ATX or setext heading with its literal text.
    Heading {
        /// Heading level, 1 through 6.
        level: u8,
        /// Heading text with inline markup stripped.
        text: String,
    },
    /// Any other block: paragraph, list, code block, table, rule, ...
    Other,
}

/// A top-level block of a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Block classification.
    pub kind: BlockKind,
    /// Byte range of the block within the source text.
    pub span: Range<usize>,
    /// The block's events, start to end, as produced by the document parse.
    pub events: Vec<Event<'static>>,
}

impl Block {
    /// Whether this block is a level-1 heading, named or not.
    pub const fn is_category_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading { level: 1, .. })
    }

    /// The category named by this block, if it is a level-1 heading with
    /// non-blank text.
    pub fn category_name(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Heading { level: 1, text } if !text.trim().is_empty() => Some(text.trim()),
            _ => None,
        }
    }

    fn is_block_quote(&self) -> bool {
        matches!(self.events.first(), Some(Event::Start(Tag::BlockQuote(_))))
    }
}

/// A parsed document: its top-level blocks in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Top-level blocks.
    pub blocks: Vec<Block>,
}

/// A markdown engine able to split a document into top-level blocks and
/// serialize a block back to text.
pub trait MarkdownFormatter {
    /// Parse `source` into its top-level blocks.
    fn parse(&self, source: &str) -> Document;

    /// Serialize `block` (parsed from `source`) back to markdown text.
    ///
    /// # Errors
    ///
    /// Returns [`ChangelogError::Render`] if the block cannot be serialized.
    fn render(&self, block: &Block, source: &str) -> ChangelogResult<String>;
}

/// Formatter backed by `pulldown-cmark`.
///
/// Blocks are re-serialized rather than copied, so fragments written with
/// different bullet or fence styles come out uniform: `-` bullets and
/// triple-backtick code fences. Ordered lists keep their numbering, and
/// block quotes use a plain `> ` prefix. Rendered text always ends with a
/// single newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkFormatter;

impl CmarkFormatter {
    /// Create a new formatter.
    pub const fn new() -> Self {
        Self
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// A top-level block whose end has not been seen yet.
struct OpenBlock {
    kind: BlockKind,
    span: Range<usize>,
    events: Vec<Event<'static>>,
}

impl OpenBlock {
    fn close(self) -> Block {
        Block {
            kind: self.kind,
            span: self.span,
            events: self.events,
        }
    }
}

impl MarkdownFormatter for CmarkFormatter {
    fn parse(&self, source: &str) -> Document {
        let mut blocks = Vec::new();
        let mut open: Option<OpenBlock> = None;
        let mut depth = 0usize;

        for (event, range) in Parser::new_ext(source, parser_options()).into_offset_iter() {
            match &event {
                Event::Start(tag) => {
                    if depth == 0 {
                        let kind = match tag {
                            Tag::Heading { level, .. } => BlockKind::Heading {
                                level: *level as u8,
                                text: String::new(),
                            },
                            _ => BlockKind::Other,
                        };
                        open = Some(OpenBlock {
                            kind,
                            span: range.clone(),
                            events: Vec::new(),
                        });
                    }
                    depth += 1;
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Text(text) | Event::Code(text) => {
                    if let Some(OpenBlock {
                        kind: BlockKind::Heading { text: heading, .. },
                        ..
                    }) = open.as_mut()
                    {
                        heading.push_str(text);
                    }
                }
                _ => {}
            }

            match open.as_mut() {
                Some(block) => {
                    block.events.push(event.into_static());
                    if depth == 0
                        && let Some(block) = open.take()
                    {
                        blocks.push(block.close());
                    }
                }
                // Leaf blocks without start/end pairs, e.g. thematic breaks.
                None => blocks.push(Block {
                    kind: BlockKind::Other,
                    span: range,
                    events: vec![event.into_static()],
                }),
            }
        }

        Document { blocks }
    }

    fn render(&self, block: &Block, _source: &str) -> ChangelogResult<String> {
        let mut options = CmarkOptions::default();
        options.code_block_token_count = 3;
        options.list_token = '-';
        options.increment_ordered_list_bullets = true;

        let mut output = String::new();
        pulldown_cmark_to_cmark::cmark_with_options(block.events.iter(), &mut output, options)
            .map_err(|e| ChangelogError::Render(e.to_string()))?;

        let trimmed = output.trim_start_matches('\n').trim_end();
        if trimmed.is_empty() {
            return Ok(String::new());
        }
        if block.is_block_quote() {
            return Ok(normalize_block_quote(trimmed));
        }
        Ok(format!("{trimmed}\n"))
    }
}

/// Rewrite the serializer's ` > ` quote padding as `> `, dropping the empty
/// quote lines it emits before the first paragraph.
fn normalize_block_quote(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.lines() {
        let line = match line.strip_prefix(' ') {
            Some(rest) if rest.starts_with('>') => rest,
            _ => line,
        };
        let line = line.trim_end();
        if output.is_empty() && line == ">" {
            continue;
        }
        output.push_str(line);
        output.push('\n');
    }
    output
}
