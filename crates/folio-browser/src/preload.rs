//! Off-screen image preloading.

use folio_core::NaturalSize;
use js_sys::Promise;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlImageElement;

/// Fetch and decode `url` in a detached image, resolving to its natural size.
///
/// Rejects if the image fails to load. Decoded images land in the browser's
/// cache, so painting the same URL into a visible slot afterwards is instant.
pub async fn preload(url: &str) -> Result<NaturalSize, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_decoding("async");

    let promise = Promise::new(&mut |resolve, reject| {
        img.set_onload(Some(&resolve));
        img.set_onerror(Some(&reject));
    });
    img.set_src(url);
    let result = JsFuture::from(promise).await;
    img.set_onload(None);
    img.set_onerror(None);
    result?;

    let width = match img.natural_width() {
        0 => img.width(),
        w => w,
    };
    let height = match img.natural_height() {
        0 => img.height(),
        h => h,
    };
    tracing::trace!(url, width, height, "preloaded image");
    Ok(NaturalSize { width, height })
}
