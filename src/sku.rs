//! Product code normalization.
//!
//! Product pages carry a shortened display code (e.g. `40-1234`), while the
//! checkout stock endpoint wants the full 9-character variant code. The site
//! drops the zeros that follow the two-character department prefix, so the
//! full code is rebuilt by re-inserting them.

const VARIANT_CODE_LEN: usize = 9;

/// Pad a raw product id out to the 9-character variant code.
///
/// Ids of length >= 9 pass through unchanged. Input is not validated as
/// numeric; an odd id goes through the same slicing and the stock endpoint
/// reports it unknown.
pub fn normalize_product_id(raw: &str) -> String {
    let len = raw.chars().count();
    if len >= VARIANT_CODE_LEN {
        return raw.to_string();
    }

    let head: String = raw.chars().take(2).collect();
    let tail: String = raw.chars().skip(2).collect();
    format!("{head}{}{tail}", "0".repeat(VARIANT_CODE_LEN - len))
}
