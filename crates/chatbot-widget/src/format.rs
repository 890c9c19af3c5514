//! Restricted rich-text formatter for bot messages.
//!
//! Markdown is parsed with `pulldown-cmark` (CommonMark core, no
//! extensions) into a small structured document: paragraphs, ordered and
//! unordered lists, code blocks, and inline text / code / strong /
//! emphasis. Everything else degrades to text:
//!
//! - headings become paragraphs
//! - links and images keep their text, never their URL
//! - raw HTML is kept as literal text and escaped on output
//! - block quotes are flattened, thematic breaks dropped
//! - strong/emphasis nested deeper than [`MAX_INLINE_DEPTH`] and lists
//!   nested deeper than [`MAX_LIST_DEPTH`] are flattened into their parent
//!
//! User-authored content never goes through this module; see
//! [`render_literal_html`].

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Strong/emphasis levels kept in the document. Both serializers recurse
/// once per level, so the model itself stays shallow.
pub const MAX_INLINE_DEPTH: usize = 32;

/// List levels kept in the document.
pub const MAX_LIST_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    LineBreak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Vec<Inline>),
    List(List),
    CodeBlock { language: Option<String>, code: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// First number of an ordered list; `None` for bullet lists.
    pub start: Option<u64>,
    pub items: Vec<Vec<Block>>,
}

impl List {
    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }
}

/// A formatted bot message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub blocks: Vec<Block>,
}

/// Parse `markdown` into the restricted document model.
pub fn parse(markdown: &str) -> RichText {
    let mut builder = Builder::new();
    for event in Parser::new_ext(markdown, Options::empty()) {
        builder.event(event);
    }
    builder.finish()
}

/// Format bot content as HTML.
pub fn render_markdown_html(markdown: &str) -> String {
    parse(markdown).to_html()
}

/// Render user content as literal text: no markup is interpreted.
pub fn render_literal_html(text: &str) -> String {
    escape_html(text)
}

/// Escape `&`, `<`, `>`, `"` and `'` for use in text and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a `String` never fails.
    let _ = pulldown_cmark_escape::escape_html(&mut out, text);
    out
}

// ── Builder ──────────────────────────────────────────────────────────────────

enum Container {
    Blocks(Vec<Block>),
    List { start: Option<u64>, items: Vec<Vec<Block>> },
}

enum InlineKind {
    Root,
    Strong,
    Emphasis,
}

struct InlineFrame {
    kind: InlineKind,
    children: Vec<Inline>,
}

struct Builder {
    containers: Vec<Container>,
    inlines: Vec<InlineFrame>,
    code: Option<(Option<String>, String)>,
    /// Open strong/emphasis tags past `MAX_INLINE_DEPTH`.
    flattened_inlines: usize,
    /// Open lists past `MAX_LIST_DEPTH`.
    flattened_lists: usize,
}

impl Builder {
    fn new() -> Self {
        Self {
            containers: vec![Container::Blocks(Vec::new())],
            inlines: Vec::new(),
            code: None,
            flattened_inlines: 0,
            flattened_lists: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => match &mut self.code {
                Some((_, code)) => code.push_str(&text),
                None => self.push_text(&text),
            },
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_inline(Inline::LineBreak),
            Event::Rule => self.flush_paragraph(),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Heading { .. } => {
                self.flush_paragraph();
                self.inlines.push(InlineFrame { kind: InlineKind::Root, children: Vec::new() });
            }
            Tag::List(start) => {
                self.flush_paragraph();
                if self.flattened_lists > 0 || self.list_depth() >= MAX_LIST_DEPTH {
                    self.flattened_lists += 1;
                } else {
                    self.containers.push(Container::List { start, items: Vec::new() });
                }
            }
            Tag::Item => {
                self.flush_paragraph();
                if self.flattened_lists == 0 {
                    self.containers.push(Container::Blocks(Vec::new()));
                }
            }
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::Strong => self.open_inline(InlineKind::Strong),
            Tag::Emphasis => self.open_inline(InlineKind::Emphasis),
            Tag::Link { .. } | Tag::Image { .. } => {}
            // Block quotes, HTML blocks and anything else block-level.
            _ => self.flush_paragraph(),
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Strong | TagEnd::Emphasis => {
                if self.flattened_inlines > 0 {
                    self.flattened_inlines -= 1;
                } else {
                    self.close_inline();
                }
            }
            TagEnd::Link | TagEnd::Image => {}
            TagEnd::CodeBlock => {
                if let Some((language, mut code)) = self.code.take() {
                    if code.ends_with('\n') {
                        code.pop();
                    }
                    self.push_block(Block::CodeBlock { language, code });
                }
            }
            TagEnd::Item => {
                self.flush_paragraph();
                if self.flattened_lists == 0 && self.containers.len() > 1 {
                    if let Some(Container::Blocks(blocks)) = self.containers.pop() {
                        match self.containers.last_mut() {
                            Some(Container::List { items, .. }) => items.push(blocks),
                            _ => self.extend_blocks(blocks),
                        }
                    }
                }
            }
            TagEnd::List(_) => {
                self.flush_paragraph();
                if self.flattened_lists > 0 {
                    self.flattened_lists -= 1;
                } else if self.containers.len() > 1 {
                    if let Some(container) = self.containers.pop() {
                        self.close_container(container);
                    }
                }
            }
            _ => self.flush_paragraph(),
        }
    }

    fn open_inline(&mut self, kind: InlineKind) {
        self.ensure_paragraph();
        // The root frame does not count towards the depth.
        if self.flattened_inlines > 0 || self.inlines.len() > MAX_INLINE_DEPTH {
            self.flattened_inlines += 1;
        } else {
            self.inlines.push(InlineFrame { kind, children: Vec::new() });
        }
    }

    fn list_depth(&self) -> usize {
        self.containers
            .iter()
            .filter(|c| matches!(c, Container::List { .. }))
            .count()
    }

    fn close_inline(&mut self) {
        if self.inlines.len() < 2 {
            return;
        }
        if let Some(frame) = self.inlines.pop() {
            let inline = wrap(frame);
            if let Some(parent) = self.inlines.last_mut() {
                parent.children.push(inline);
            }
        }
    }

    fn ensure_paragraph(&mut self) {
        if self.inlines.is_empty() {
            self.inlines.push(InlineFrame { kind: InlineKind::Root, children: Vec::new() });
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        self.ensure_paragraph();
        if let Some(frame) = self.inlines.last_mut() {
            frame.children.push(inline);
        }
    }

    fn push_text(&mut self, text: &str) {
        self.ensure_paragraph();
        if let Some(frame) = self.inlines.last_mut() {
            if let Some(Inline::Text(prev)) = frame.children.last_mut() {
                prev.push_str(text);
            } else {
                frame.children.push(Inline::Text(text.to_owned()));
            }
        }
    }

    /// Close every open inline frame and emit the paragraph, if it has any
    /// visible content.
    fn flush_paragraph(&mut self) {
        self.flattened_inlines = 0;
        while self.inlines.len() > 1 {
            self.close_inline();
        }
        if let Some(root) = self.inlines.pop() {
            if root.children.iter().any(is_visible) {
                self.push_block(Block::Paragraph(trim_inlines(root.children)));
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(Container::Blocks(blocks)) => blocks.push(block),
            Some(Container::List { items, .. }) => items.push(vec![block]),
            None => self.containers.push(Container::Blocks(vec![block])),
        }
    }

    fn extend_blocks(&mut self, blocks: Vec<Block>) {
        for block in blocks {
            self.push_block(block);
        }
    }

    fn close_container(&mut self, container: Container) {
        match container {
            Container::List { start, items } => self.push_block(Block::List(List { start, items })),
            Container::Blocks(blocks) => self.extend_blocks(blocks),
        }
    }

    fn finish(mut self) -> RichText {
        self.flush_paragraph();
        if let Some((language, code)) = self.code.take() {
            self.push_block(Block::CodeBlock { language, code });
        }
        while self.containers.len() > 1 {
            if let Some(container) = self.containers.pop() {
                self.close_container(container);
            }
        }
        let blocks = match self.containers.pop() {
            Some(Container::Blocks(blocks)) => blocks,
            Some(Container::List { start, items }) => vec![Block::List(List { start, items })],
            None => Vec::new(),
        };
        RichText { blocks }
    }
}

fn wrap(frame: InlineFrame) -> Inline {
    match frame.kind {
        InlineKind::Strong => Inline::Strong(frame.children),
        InlineKind::Emphasis => Inline::Emphasis(frame.children),
        InlineKind::Root => Inline::Text(plain_inlines(&frame.children)),
    }
}

fn is_visible(inline: &Inline) -> bool {
    match inline {
        Inline::Text(t) => !t.trim().is_empty(),
        Inline::LineBreak => false,
        Inline::Code(_) | Inline::Strong(_) | Inline::Emphasis(_) => true,
    }
}

/// Drop whitespace left at the edges of a paragraph by soft breaks and
/// raw HTML lines.
fn trim_inlines(mut inlines: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text(t)) = inlines.first_mut() {
        *t = t.trim_start().to_owned();
    }
    if let Some(Inline::Text(t)) = inlines.last_mut() {
        *t = t.trim_end().to_owned();
    }
    inlines.retain(|i| !matches!(i, Inline::Text(t) if t.is_empty()));
    inlines
}

// ── HTML output ──────────────────────────────────────────────────────────────

impl RichText {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        blocks_html(&self.blocks, &mut out);
        out
    }

    /// Unstyled text for terminals: list markers and indentation are kept,
    /// emphasis markers are dropped.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        blocks_plain(&self.blocks, 0, &mut out);
        out.trim_end().to_owned()
    }
}

fn blocks_html(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                out.push_str("<p class=\"cb-p\">");
                inlines_html(inlines, out);
                out.push_str("</p>");
            }
            Block::List(list) => {
                match list.start {
                    Some(1) => out.push_str("<ol class=\"cb-list cb-ol\">"),
                    Some(n) => out.push_str(&format!("<ol class=\"cb-list cb-ol\" start=\"{n}\">")),
                    None => out.push_str("<ul class=\"cb-list cb-ul\">"),
                }
                for item in &list.items {
                    out.push_str("<li class=\"cb-li\">");
                    blocks_html(item, out);
                    out.push_str("</li>");
                }
                out.push_str(if list.is_ordered() { "</ol>" } else { "</ul>" });
            }
            Block::CodeBlock { language, code } => {
                out.push_str("<pre class=\"cb-pre\"><code class=\"cb-code");
                if let Some(lang) = language {
                    out.push_str(" language-");
                    out.push_str(&escape_html(lang));
                }
                out.push_str("\">");
                out.push_str(&escape_html(code));
                out.push_str("</code></pre>");
            }
        }
    }
}

fn inlines_html(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(&escape_html(t)),
            Inline::Code(c) => {
                out.push_str("<code class=\"cb-code\">");
                out.push_str(&escape_html(c));
                out.push_str("</code>");
            }
            Inline::Strong(children) => {
                out.push_str("<strong>");
                inlines_html(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                inlines_html(children, out);
                out.push_str("</em>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

// ── Plain-text output ────────────────────────────────────────────────────────

fn blocks_plain(blocks: &[Block], indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                for line in plain_inlines(inlines).lines() {
                    out.push_str(&pad);
                    out.push_str(line);
                    out.push('\n');
                }
                if indent == 0 {
                    out.push('\n');
                }
            }
            Block::List(list) => {
                for (i, item) in list.items.iter().enumerate() {
                    let marker = match list.start {
                        Some(start) => format!("{}. ", start + i as u64),
                        None => "- ".to_owned(),
                    };
                    let mut body = String::new();
                    blocks_plain(item, 0, &mut body);
                    let mut first = true;
                    for line in body.lines().filter(|l| !l.trim().is_empty()) {
                        out.push_str(&pad);
                        if first {
                            out.push_str(&marker);
                            first = false;
                        } else {
                            out.push_str(&" ".repeat(marker.len()));
                        }
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                if indent == 0 {
                    out.push('\n');
                }
            }
            Block::CodeBlock { code, .. } => {
                for line in code.lines() {
                    out.push_str(&pad);
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
                if indent == 0 {
                    out.push('\n');
                }
            }
        }
    }
}

fn plain_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                out.push_str(&plain_inlines(children))
            }
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
