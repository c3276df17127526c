//! Extraction of embedded product data from a product detail page.
//!
//! The page carries product data in two places: a standards-shaped
//! `application/ld+json` script block, and an inline script assigning the
//! `coConfig.pdp` page config as a JavaScript object literal. The ld+json
//! block is sometimes incomplete, so both are merged into one accumulator,
//! scripts in document order, last write wins. The page config is scanned
//! after the structured data on a given page, so its values fill gaps and
//! win on overlap.

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::error::CossError;

/// Marker identifying the inline page-config script.
const PDP_MARKER: &str = "coConfig.pdp";

/// Collect product info from every `<script>` tag in the document.
///
/// Scripts that are neither ld+json nor the page config are ignored. A
/// document with neither yields an empty map; the caller fails on the first
/// missing field.
pub fn extract_product_info(html: &str) -> Result<Map<String, Value>, CossError> {
    let document = Html::parse_document(html);
    let script_selector = Selector::parse("script").unwrap();

    let mut info = Map::new();
    for script in document.select(&script_selector) {
        let contents: String = script.text().collect();
        if script.value().attr("type") == Some("application/ld+json") {
            merge_object(&mut info, &contents)?;
        } else if contents.contains(PDP_MARKER) {
            merge_object(&mut info, &patch_pdp_config(&contents))?;
        }
    }
    Ok(info)
}

/// Rewrite the `coConfig.pdp` object literal into parseable JSON.
///
/// The literal is a constrained, known superset of JSON: single-quoted
/// strings plus exactly two bareword keys. Three fixed replacements cover
/// it; any other shape is left to fail in the JSON parser.
pub fn patch_pdp_config(script: &str) -> String {
    script
        .replace("coConfig.pdp = ", "")
        .replace('\'', "\"")
        .replace("productId :", "\"productId\":")
        .replace("disableProductRecommendation :", "\"disableProductRecommendation\":")
}

fn merge_object(info: &mut Map<String, Value>, raw: &str) -> Result<(), CossError> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|e| CossError::Data(format!("embedded product data is not valid JSON: {e}")))?;
    match parsed {
        Value::Object(fields) => {
            for (key, value) in fields {
                info.insert(key, value);
            }
            Ok(())
        }
        _ => Err(CossError::Data(
            "embedded product data is not a JSON object".into(),
        )),
    }
}

/// Look up a string field, failing with the field name when absent.
pub fn required_str<'a>(
    info: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, CossError> {
    info.get(key)
        .and_then(Value::as_str)
        .ok_or(CossError::MissingField(key))
}

/// Look up a nested object field.
pub fn required_object<'a>(
    info: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a Map<String, Value>, CossError> {
    info.get(key)
        .and_then(Value::as_object)
        .ok_or(CossError::MissingField(key))
}

/// Render a string or numeric field for display. The ld+json block carries
/// prices as either, depending on the page template.
pub fn display_value(info: &Map<String, Value>, key: &'static str) -> Result<String, CossError> {
    match info.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CossError::MissingField(key)),
    }
}
