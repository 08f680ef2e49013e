use serde_json::json;

use super::*;
use crate::assets::ImageParams;
use crate::model::AssetRef;

fn test_resolver(asset: &AssetRef, params: &ImageParams) -> Option<String> {
    Some(format!("https://img.test/{}?w={}", asset.id, params.width))
}

fn render(value: serde_json::Value) -> RenderedDocument {
    let doc = Document::from_value(value).unwrap();
    let config = FolioConfig::default();
    let ctx = RenderContext::new(&test_resolver, &config);
    render_document(&doc, &ctx)
}

fn block(style: &str, children: serde_json::Value, mark_defs: serde_json::Value) -> serde_json::Value {
    json!({"_type": "block", "style": style, "children": children, "markDefs": mark_defs})
}

#[test]
fn test_block_styles() {
    let out = render(json!([
        block("h1", json!([{"text": "Title"}]), json!([])),
        block("normal", json!([{"text": "Body"}]), json!([])),
        block("blockquote", json!([{"text": "Quote"}]), json!([])),
        block("lead", json!([{"text": "Loose"}]), json!([])),
    ]));
    assert_eq!(
        out.html,
        "<h1>Title</h1>\n<div class=\"pt-block\">Body</div>\n<blockquote>Quote</blockquote>\nLoose\n"
    );
    assert!(out.carousels.is_empty());
    assert_eq!(out.footnote_count, 0);
}

#[test]
fn test_decorators_nest_by_run() {
    let out = render(json!([block(
        "normal",
        json!([
            {"text": "a", "marks": ["strong", "em"]},
            {"text": "b", "marks": ["strong"]},
            {"text": "c", "marks": ["strike-through"]},
            {"text": "d", "marks": ["underline", "code"]}
        ]),
        json!([])
    )]));
    insta::assert_snapshot!(
        out.html.trim_end(),
        @r#"<div class="pt-block"><strong><em>a</em>b</strong><del>c</del><code><span style="text-decoration:underline">d</span></code></div>"#
    );
}

#[test]
fn test_links() {
    let out = render(json!([block(
        "normal",
        json!([
            {"text": "out", "marks": ["l1"]},
            {"text": " in", "marks": ["l2"]},
            {"text": " bare", "marks": ["l3"]}
        ]),
        json!([
            {"_key": "l1", "_type": "link", "href": "https://example.com/?a=1&b=\"2\""},
            {"_key": "l2", "_type": "link", "href": "/about"},
            {"_key": "l3", "_type": "link"}
        ])
    )]));
    assert_eq!(
        out.html,
        concat!(
            "<div class=\"pt-block\">",
            "<a href=\"https://example.com/?a=1&amp;b=%222%22\" target=\"_blank\" rel=\"noopener noreferrer\" style=\"text-decoration:underline\">out</a>",
            "<a href=\"/about\" style=\"text-decoration:underline\"> in</a>",
            " bare",
            "</div>\n"
        )
    );
}

#[test]
fn test_footnote_markup_and_note_flavor() {
    let out = render(json!([block(
        "normal",
        json!([
            {"text": "See "},
            {"text": "this", "marks": ["fn1"]}
        ]),
        json!([{
            "_key": "fn1",
            "_type": "footnote",
            "note": [
                block("h1", json!([{"text": "Heading"}]), json!([])),
                block("blockquote", json!([{"text": "quoted", "marks": ["em"]}]), json!([]))
            ]
        }])
    )]));
    assert_eq!(out.footnote_count, 1);
    assert_eq!(
        out.html,
        concat!(
            "<div class=\"pt-block\">See ",
            "<span class=\"footnote\"><span class=\"footnote-text\">this</span>",
            "<span class=\"footnote-note\">",
            "<span class=\"fn-inline-block\">Heading</span>",
            "<span class=\"fn-inline-block\"><em>quoted</em></span>",
            "</span></span></div>\n"
        )
    );
}

#[test]
fn test_nested_footnote_renders_as_text() {
    let out = render(json!([block(
        "normal",
        json!([{"text": "outer", "marks": ["fn1"]}]),
        json!([{
            "_key": "fn1",
            "_type": "footnote",
            "note": [block(
                "normal",
                json!([{"text": "inner", "marks": ["fn2"]}]),
                json!([{"_key": "fn2", "_type": "footnote", "note": [
                    block("normal", json!([{"text": "deep"}]), json!([]))
                ]}])
            )]
        }])
    )]));
    assert_eq!(out.footnote_count, 1);
    assert!(out.html.contains("<span class=\"fn-inline-block\">inner</span>"));
    assert!(!out.html.contains("deep"));
}

#[test]
fn test_unknown_marks_pass_through() {
    let out = render(json!([block(
        "normal",
        json!([{"text": "x", "marks": ["sparkle", "k9"]}]),
        json!([{"_key": "k9", "_type": "tooltip"}])
    )]));
    assert_eq!(out.html, "<div class=\"pt-block\">x</div>\n");
}

#[test]
fn test_text_is_escaped() {
    let out = render(json!([block(
        "normal",
        json!([{"text": "<script>&\nnext"}]),
        json!([])
    )]));
    assert_eq!(
        out.html,
        "<div class=\"pt-block\">&lt;script&gt;&amp;<br>next</div>\n"
    );
}

#[test]
fn test_image_sources() {
    let out = render(json!([
        {"_type": "image", "url": "https://direct/x.jpg", "asset": {"_ref": "ignored"}, "size": "s", "caption": "A cap"},
        {"_type": "contentImage", "size": "medium", "image": {"asset": {"_ref": "image-a-1x1-png"}, "alt": "Alt"}},
        {"_type": "image", "caption": "no source"}
    ]));
    assert_eq!(
        out.html,
        concat!(
            "<figure class=\"pt-image pt-image--s\" style=\"width:33.333%;margin:8px auto\">",
            "<img src=\"https://direct/x.jpg\" alt=\"A cap\" loading=\"lazy\" decoding=\"async\" data-caption=\"A cap\" ",
            "style=\"width:100%;height:auto;object-fit:contain;display:block;border-radius:var(--br)\">",
            "<figcaption class=\"pt-caption\">A cap</figcaption></figure>\n",
            "<figure class=\"pt-image pt-image--m\" style=\"width:66.666%;margin:8px auto\">",
            "<img src=\"https://img.test/image-a-1x1-png?w=1800\" alt=\"Alt\" loading=\"lazy\" decoding=\"async\" data-caption=\"\" ",
            "style=\"width:100%;height:auto;object-fit:contain;display:block;border-radius:var(--br)\">",
            "</figure>\n",
            "\n"
        )
    );
}

#[test]
fn test_carousels_are_indexed() {
    let out = render(json!([
        {"_type": "carousel", "images": [{"url": "https://x/1.jpg"}, {"url": "https://x/2.jpg"}]},
        {"_type": "carousel", "images": [{"url": "https://x/3.jpg"}]}
    ]));
    assert_eq!(out.carousels.len(), 2);
    assert_eq!(out.carousels[0].index, 0);
    assert_eq!(out.carousels[0].images.len(), 2);
    assert_eq!(out.carousels[1].index, 1);

    let first_line = out.html.lines().next().unwrap();
    insta::assert_snapshot!(
        first_line,
        @r#"<div class="pt-carousel-wrap" data-carousel="0"><div class="pt-carousel"><img class="pt-carousel-img" alt="" decoding="async"><img class="pt-carousel-img" alt="" decoding="async"></div><div class="pt-caption" hidden></div></div>"#
    );
}

#[test]
fn test_note_skips_carousels() {
    let blocks = vec![Block::Carousel(CarouselBlock::default())];
    let config = FolioConfig::default();
    let ctx = RenderContext::new(&test_resolver, &config);
    assert_eq!(render_note(&blocks, &ctx), "");
}

#[test]
fn test_unknown_block_children_render_inert() {
    let out = render(json!([
        {"_type": "callout", "children": [{"text": "kept"}, {"text": " <too>"}]},
        {"_type": "divider"}
    ]));
    assert_eq!(out.html, "kept &lt;too&gt;\n\n");
}

#[test]
fn test_malformed_mark_defs_keep_text() {
    let out = render(json!([
        {
            "_type": "block",
            "style": "normal",
            "children": [{"text": "Whole paragraph", "marks": ["l1"]}],
            "markDefs": [{"_key": "l1", "_type": "link", "href": 5}]
        },
        {"_type": "block", "style": ["h1"], "children": [{"text": "styled wrong"}]},
        {
            "_type": "block",
            "style": "normal",
            "children": [{"text": "bad note", "marks": ["fn"]}],
            "markDefs": [{"_key": "fn", "_type": "footnote", "note": {"not": "blocks"}}]
        }
    ]));
    assert_eq!(
        out.html,
        concat!(
            "<div class=\"pt-block\">Whole paragraph</div>\n",
            "<div class=\"pt-block\">styled wrong</div>\n",
            "<div class=\"pt-block\">bad note</div>\n"
        )
    );
    assert_eq!(out.footnote_count, 0);
}

#[test]
fn test_attributes_are_escaped() {
    let out = render(json!([
        {"_type": "image", "url": "https://x/a b.jpg?w=1&h=2", "alt": "say \"hi\" <now>", "caption": "A & B"}
    ]));
    assert!(out.html.contains("src=\"https://x/a%20b.jpg?w=1&amp;h=2\""));
    assert!(out.html.contains("alt=\"say &quot;hi&quot; &lt;now&gt;\""));
    assert!(out.html.contains("data-caption=\"A &amp; B\""));
    assert!(out.html.contains("<figcaption class=\"pt-caption\">A &amp; B</figcaption>"));
}
