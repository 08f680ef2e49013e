//! Document model.
//!
//! Documents arrive as Portable Text JSON from the content store. Every block
//! deserializes leniently: a block with an unrecognised `_type`, or a
//! recognised one whose fields don't parse, becomes [`Block::Unknown`] so one
//! malformed node never takes the rest of the document down with it.
//!
//! Leniency goes all the way down. A bad `style` falls back to normal, a bad
//! mark definition is dropped on its own, and an unknown block still keeps
//! whatever text children it had.

use serde::Deserialize;
use serde::de::IgnoredAny;
use smol_str::SmolStr;

use crate::error::{FolioError, Result};

/// An ordered sequence of blocks. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parse a document from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(FolioError::InvalidDocument)
    }

    /// Parse a document from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(FolioError::InvalidDocument)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One structural unit of a document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBlock")]
pub enum Block {
    Text(TextBlock),
    Image(ImageBlock),
    Carousel(CarouselBlock),
    Unknown(UnknownBlock),
}

/// Paragraph-like block: a style plus marked-up spans.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub style: TextStyle,
    pub children: Vec<Span>,
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|def| def.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextStyle {
    Normal,
    /// `h1`..`h6`.
    Heading(u8),
    Blockquote,
    Other(SmolStr),
}

impl TextStyle {
    fn from_wire(style: Option<&str>) -> Self {
        match style.unwrap_or("normal") {
            "normal" => TextStyle::Normal,
            "blockquote" => TextStyle::Blockquote,
            "h1" => TextStyle::Heading(1),
            "h2" => TextStyle::Heading(2),
            "h3" => TextStyle::Heading(3),
            "h4" => TextStyle::Heading(4),
            "h5" => TextStyle::Heading(5),
            "h6" => TextStyle::Heading(6),
            other => TextStyle::Other(SmolStr::new(other)),
        }
    }
}

/// A text run with the marks applied to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawSpan")]
pub struct Span {
    pub text: String,
    /// Decorator names or keys into the block's mark definitions.
    pub marks: Vec<SmolStr>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: &[&str]) -> Self {
        Self {
            text: text.into(),
            marks: marks.iter().map(|m| SmolStr::new(m)).collect(),
        }
    }
}

/// Annotation definition referenced from span marks by key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawMarkDef")]
pub struct MarkDef {
    pub key: SmolStr,
    pub kind: MarkKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkKind {
    Link { href: Option<String> },
    Footnote { note: Vec<Block> },
    Unknown(SmolStr),
}

/// Reference to an image asset held by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    #[serde(rename = "_ref", alias = "_id")]
    pub id: SmolStr,
}

/// Display width hint for inline images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SizeHint {
    Small,
    Medium,
    #[default]
    Large,
}

impl SizeHint {
    fn from_wire(size: Option<&str>) -> Self {
        match size {
            Some("s") | Some("small") => SizeHint::Small,
            Some("m") | Some("medium") => SizeHint::Medium,
            _ => SizeHint::Large,
        }
    }

    pub fn width_percent(self) -> &'static str {
        match self {
            SizeHint::Small => "33.333%",
            SizeHint::Medium => "66.666%",
            SizeHint::Large => "100%",
        }
    }

    pub fn class_suffix(self) -> &'static str {
        match self {
            SizeHint::Small => "s",
            SizeHint::Medium => "m",
            SizeHint::Large => "l",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBlock {
    pub asset: Option<AssetRef>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
    pub size: SizeHint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselBlock {
    pub images: Vec<CarouselImage>,
}

/// One carousel frame, with nested `image` fields already folded in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarouselImage {
    pub asset: Option<AssetRef>,
    pub url: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

/// A block of a type this renderer doesn't know, kept for its text children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownBlock {
    pub kind: SmolStr,
    pub children: Vec<Span>,
}

// === Wire shapes ===

/// A field that may be malformed. Bad values are dropped rather than failing
/// the enclosing node.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Malformed(IgnoredAny),
}

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Lenient::Malformed(IgnoredAny)
    }
}

impl<T> Lenient<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Lenient::Value(value) => Some(value),
            Lenient::Malformed(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBlock {
    Object(Box<WireBlock>),
    /// An object whose typed fields don't parse. Only its type and text survive.
    Partial(PartialBlock),
    Opaque(IgnoredAny),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireBlock {
    #[serde(rename = "_type")]
    kind: SmolStr,
    style: Option<Lenient<String>>,
    children: Lenient<Vec<Span>>,
    #[serde(rename = "markDefs")]
    mark_defs: Lenient<Vec<Lenient<MarkDef>>>,
    #[serde(flatten)]
    image: WireImage,
    /// `contentImage` nests its image one level down.
    #[serde(rename = "image")]
    nested_image: Option<WireImage>,
    size: Option<String>,
    images: Vec<WireCarouselImage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PartialBlock {
    #[serde(rename = "_type")]
    kind: Lenient<SmolStr>,
    children: Lenient<Vec<Span>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireImage {
    asset: Option<AssetRef>,
    url: Option<String>,
    alt: Option<String>,
    caption: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireCarouselImage {
    #[serde(flatten)]
    fields: WireImage,
    image: Option<WireImage>,
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let wire = match raw {
            RawBlock::Object(wire) => *wire,
            RawBlock::Partial(partial) => {
                let kind = partial.kind.into_option().unwrap_or_default();
                tracing::debug!(%kind, "block fields malformed, keeping its text");
                return Block::Unknown(UnknownBlock {
                    kind,
                    children: partial.children.into_option().unwrap_or_default(),
                });
            }
            RawBlock::Opaque(_) => {
                tracing::debug!("dropping malformed block");
                return Block::Unknown(UnknownBlock::default());
            }
        };

        let children = wire.children.into_option().unwrap_or_default();
        match wire.kind.as_str() {
            "block" => {
                let style = wire.style.and_then(Lenient::into_option);
                let mark_defs = wire
                    .mark_defs
                    .into_option()
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(Lenient::into_option)
                    .collect();
                Block::Text(TextBlock {
                    style: TextStyle::from_wire(style.as_deref()),
                    children,
                    mark_defs,
                })
            }
            "image" | "contentImage" => {
                let img = wire.nested_image.unwrap_or(wire.image);
                Block::Image(ImageBlock {
                    asset: img.asset,
                    url: non_empty(img.url),
                    alt: non_empty(img.alt),
                    caption: non_empty(img.caption),
                    size: SizeHint::from_wire(wire.size.as_deref()),
                })
            }
            "carousel" => Block::Carousel(CarouselBlock {
                images: wire.images.into_iter().map(CarouselImage::from).collect(),
            }),
            _ => Block::Unknown(UnknownBlock {
                kind: wire.kind,
                children,
            }),
        }
    }
}

impl From<WireCarouselImage> for CarouselImage {
    fn from(wire: WireCarouselImage) -> Self {
        let nested = wire.image.unwrap_or_default();
        let caption = non_empty(wire.fields.caption).or(non_empty(nested.caption));
        Self {
            asset: wire.fields.asset.or(nested.asset),
            url: non_empty(wire.fields.url).or(non_empty(nested.url)),
            alt: non_empty(wire.fields.alt).or(non_empty(nested.alt)),
            caption,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpan {
    Span {
        #[serde(default)]
        text: String,
        #[serde(default)]
        marks: Vec<SmolStr>,
    },
    Opaque(IgnoredAny),
}

impl From<RawSpan> for Span {
    fn from(raw: RawSpan) -> Self {
        match raw {
            RawSpan::Span { text, marks } => Span { text, marks },
            RawSpan::Opaque(_) => Span::default(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawMarkDef {
    #[serde(rename = "_key")]
    key: SmolStr,
    #[serde(rename = "_type")]
    kind: SmolStr,
    href: Option<Lenient<String>>,
    note: Option<Lenient<Vec<Block>>>,
}

impl From<RawMarkDef> for MarkDef {
    fn from(raw: RawMarkDef) -> Self {
        let kind = match raw.kind.as_str() {
            "link" => MarkKind::Link {
                href: non_empty(raw.href.and_then(Lenient::into_option)),
            },
            "footnote" => match raw.note {
                None => MarkKind::Footnote { note: Vec::new() },
                Some(Lenient::Value(note)) => MarkKind::Footnote { note },
                // The text stays, unannotated.
                Some(Lenient::Malformed(_)) => {
                    tracing::debug!(key = %raw.key, "footnote note malformed, dropping the mark");
                    MarkKind::Unknown(raw.kind)
                }
            },
            _ => MarkKind::Unknown(raw.kind),
        };
        MarkDef { key: raw.key, kind }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
