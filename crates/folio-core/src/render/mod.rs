//! HTML rendering for documents.
//!
//! Rendering is a pure walk over the block tree that produces markup plus the
//! handful of facts the interactive engines need afterwards (which carousels
//! exist, how many footnotes were emitted). It never measures anything.
//!
//! Footnote bodies go through a restricted note flavor: every text block
//! becomes an inline `span.fn-inline-block` so a note never introduces block
//! breaks into the margin, and footnotes inside notes are not honoured.

mod marks;

#[cfg(test)]
mod tests;

use std::fmt::Write;

use pulldown_cmark_escape::{escape_href, escape_html, escape_html_body_text};

use crate::assets::{ImageParams, ImageUrlResolver};
use crate::config::FolioConfig;
use crate::model::{
    Block, CarouselBlock, CarouselImage, Document, ImageBlock, MarkKind, TextBlock, TextStyle,
};

use marks::{MarkNode, build_mark_tree};

/// External collaborators the renderer consults.
pub struct RenderContext<'a> {
    pub resolver: &'a dyn ImageUrlResolver,
    pub inline_image: ImageParams,
}

impl<'a> RenderContext<'a> {
    pub fn new(resolver: &'a dyn ImageUrlResolver, config: &FolioConfig) -> Self {
        Self {
            resolver,
            inline_image: config.inline_image_params(),
        }
    }
}

/// A carousel found during rendering, identified by its `data-carousel` index.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselSpec {
    pub index: usize,
    pub images: Vec<CarouselImage>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    pub carousels: Vec<CarouselSpec>,
    pub footnote_count: usize,
}

/// Render a document to markup.
pub fn render_document(document: &Document, ctx: &RenderContext<'_>) -> RenderedDocument {
    let mut renderer = Renderer::new(ctx, Flavor::Body);
    for block in &document.blocks {
        renderer.block(block);
        renderer.html.push('\n');
    }
    tracing::trace!(
        blocks = document.blocks.len(),
        carousels = renderer.carousels.len(),
        footnotes = renderer.footnote_count,
        "rendered document"
    );
    RenderedDocument {
        html: renderer.html,
        carousels: renderer.carousels,
        footnote_count: renderer.footnote_count,
    }
}

/// Render blocks with the note flavor, as they appear inside a footnote.
pub fn render_note(blocks: &[Block], ctx: &RenderContext<'_>) -> String {
    let mut renderer = Renderer::new(ctx, Flavor::Note);
    for block in blocks {
        renderer.block(block);
    }
    renderer.html
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Body,
    Note,
}

struct Renderer<'c, 'a> {
    ctx: &'c RenderContext<'a>,
    flavor: Flavor,
    html: String,
    carousels: Vec<CarouselSpec>,
    footnote_count: usize,
}

impl<'c, 'a> Renderer<'c, 'a> {
    fn new(ctx: &'c RenderContext<'a>, flavor: Flavor) -> Self {
        Self {
            ctx,
            flavor,
            html: String::new(),
            carousels: Vec::new(),
            footnote_count: 0,
        }
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Text(text) => self.text_block(text),
            Block::Image(image) => self.image(image),
            Block::Carousel(carousel) => self.carousel(carousel),
            Block::Unknown(unknown) => {
                tracing::debug!(kind = %unknown.kind, "passing through unknown block");
                for span in &unknown.children {
                    self.text(&span.text);
                }
            }
        }
    }

    fn text_block(&mut self, block: &TextBlock) {
        let (open, close): (String, &str) = match (self.flavor, &block.style) {
            (Flavor::Note, _) => ("<span class=\"fn-inline-block\">".into(), "</span>"),
            (Flavor::Body, TextStyle::Normal) => ("<div class=\"pt-block\">".into(), "</div>"),
            (Flavor::Body, TextStyle::Blockquote) => ("<blockquote>".into(), "</blockquote>"),
            (Flavor::Body, TextStyle::Heading(level)) => {
                let level = (*level).clamp(1, 6);
                (format!("<h{level}>"), HEADING_CLOSE[usize::from(level - 1)])
            }
            (Flavor::Body, TextStyle::Other(style)) => {
                tracing::debug!(%style, "passing through unknown text style");
                (String::new(), "")
            }
        };

        self.html.push_str(&open);
        let tree = build_mark_tree(&block.children);
        self.nodes(&tree, block);
        self.html.push_str(close);
    }

    fn nodes(&mut self, nodes: &[MarkNode<'_>], block: &TextBlock) {
        for node in nodes {
            match node {
                MarkNode::Text(text) => self.text(text),
                MarkNode::Marked { mark, children } => self.marked(mark, children, block),
            }
        }
    }

    fn marked(&mut self, mark: &str, children: &[MarkNode<'_>], block: &TextBlock) {
        if let Some(def) = block.mark_def(mark) {
            match &def.kind {
                MarkKind::Link { href: Some(href) } => {
                    self.html.push_str("<a href=\"");
                    let _ = escape_href(&mut self.html, href);
                    self.html.push('"');
                    if href.starts_with("http") {
                        self.html
                            .push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                    }
                    self.html.push_str(" style=\"text-decoration:underline\">");
                    self.nodes(children, block);
                    self.html.push_str("</a>");
                }
                MarkKind::Link { href: None } => self.nodes(children, block),
                MarkKind::Footnote { note } => match self.flavor {
                    Flavor::Body => self.footnote(children, note, block),
                    Flavor::Note => {
                        tracing::debug!(key = %def.key, "footnote inside a note, rendering as text");
                        self.nodes(children, block);
                    }
                },
                MarkKind::Unknown(kind) => {
                    tracing::debug!(%kind, "passing through unknown annotation");
                    self.nodes(children, block);
                }
            }
            return;
        }

        let (open, close) = match mark {
            "strong" => ("<strong>", "</strong>"),
            "em" => ("<em>", "</em>"),
            "code" => ("<code>", "</code>"),
            "underline" => ("<span style=\"text-decoration:underline\">", "</span>"),
            "strike-through" => ("<del>", "</del>"),
            _ => {
                tracing::debug!(mark, "passing through unknown mark");
                ("", "")
            }
        };
        self.html.push_str(open);
        self.nodes(children, block);
        self.html.push_str(close);
    }

    fn footnote(&mut self, children: &[MarkNode<'_>], note: &[Block], block: &TextBlock) {
        self.footnote_count += 1;
        self.html
            .push_str("<span class=\"footnote\"><span class=\"footnote-text\">");
        self.nodes(children, block);
        self.html.push_str("</span><span class=\"footnote-note\">");
        let note_html = render_note(note, self.ctx);
        self.html.push_str(&note_html);
        self.html.push_str("</span></span>");
    }

    fn image(&mut self, image: &ImageBlock) {
        let src = match (&image.url, &image.asset) {
            (Some(url), _) => Some(url.clone()),
            (None, Some(asset)) => self.ctx.resolver.resolve(asset, &self.ctx.inline_image),
            (None, None) => None,
        };
        let Some(src) = src else {
            tracing::debug!("image without a resolvable source, skipping");
            return;
        };

        let caption = image.caption.as_deref().unwrap_or("");
        let alt = image.alt.as_deref().unwrap_or(caption);

        let _ = write!(
            self.html,
            "<figure class=\"pt-image pt-image--{}\" style=\"width:{};margin:8px auto\">",
            image.size.class_suffix(),
            image.size.width_percent()
        );
        self.html.push_str("<img src=\"");
        let _ = escape_href(&mut self.html, &src);
        self.html.push_str("\" alt=\"");
        let _ = escape_html(&mut self.html, alt);
        self.html
            .push_str("\" loading=\"lazy\" decoding=\"async\" data-caption=\"");
        let _ = escape_html(&mut self.html, caption);
        self.html.push_str(
            "\" style=\"width:100%;height:auto;object-fit:contain;display:block;border-radius:var(--br)\">",
        );
        if !caption.is_empty() {
            self.html.push_str("<figcaption class=\"pt-caption\">");
            self.text(caption);
            self.html.push_str("</figcaption>");
        }
        self.html.push_str("</figure>");
    }

    fn carousel(&mut self, carousel: &CarouselBlock) {
        if self.flavor == Flavor::Note {
            tracing::debug!("carousel inside a note, skipping");
            return;
        }
        let index = self.carousels.len();
        let _ = write!(
            self.html,
            "<div class=\"pt-carousel-wrap\" data-carousel=\"{index}\"><div class=\"pt-carousel\">"
        );
        for _ in 0..2 {
            self.html
                .push_str("<img class=\"pt-carousel-img\" alt=\"\" decoding=\"async\">");
        }
        self.html
            .push_str("</div><div class=\"pt-caption\" hidden></div></div>");
        self.carousels.push(CarouselSpec {
            index,
            images: carousel.images.clone(),
        });
    }

    /// Escaped text; embedded newlines become `<br>`.
    fn text(&mut self, text: &str) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            let _ = escape_html_body_text(&mut self.html, first);
        }
        for line in lines {
            self.html.push_str("<br>");
            let _ = escape_html_body_text(&mut self.html, line);
        }
    }
}

const HEADING_CLOSE: [&str; 6] = ["</h1>", "</h2>", "</h3>", "</h4>", "</h5>", "</h6>"];
