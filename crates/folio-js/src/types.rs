//! Types exposed to JavaScript via wasm-bindgen.

use folio_core::{FolioConfig, footnote_id, footnote_key, footnote_side};
use serde::Serialize;
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// What a surface currently has mounted.
#[derive(Debug, Clone, Copy, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStatus {
    pub mounted: bool,
    pub carousels: usize,
    pub footnotes: usize,
}

/// Stable identity and margin side for a footnote.
#[derive(Debug, Clone, Serialize, Tsify)]
#[tsify(into_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsFootnoteIdentity {
    pub id: String,
    /// "left" or "right".
    pub side: String,
}

/// Identity of the footnote with this visible text and note markup, as the
/// margin layout assigns it.
#[wasm_bindgen(js_name = footnoteIdentity)]
pub fn footnote_identity(text: &str, note_html: &str) -> JsFootnoteIdentity {
    let key = footnote_key(text.trim(), note_html);
    JsFootnoteIdentity {
        id: footnote_id(&key).to_string(),
        side: footnote_side(&key).as_str().to_string(),
    }
}

/// Parse a config object, falling back to defaults for `undefined`/`null`.
pub(crate) fn parse_config(value: JsValue) -> Result<FolioConfig, JsError> {
    if value.is_undefined() || value.is_null() {
        return Ok(FolioConfig::default());
    }
    let config: FolioConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
    config
        .validate()
        .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
    Ok(config)
}
