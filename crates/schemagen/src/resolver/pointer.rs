//! `$ref` parsing and JSON pointer lookup.

use serde_json::Value;

/// Split a reference into its document part and its fragment.
///
/// `other.json#/definitions/a` gives `("other.json", "/definitions/a")`;
/// `#/definitions/a` gives `("", "/definitions/a")`; a reference without `#`
/// addresses a whole document.
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((document, fragment)) => (document, fragment),
        None => (reference, ""),
    }
}

/// Percent-decode a URI fragment. Malformed escapes are kept verbatim.
pub fn decode_fragment(fragment: &str) -> String {
    let bytes = fragment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                decoded.push(byte);
                i += 3;
                continue;
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Look up a decoded fragment inside a document. The empty fragment is the
/// document itself.
pub fn lookup<'a>(document: &'a Value, fragment: &str) -> Option<&'a Value> {
    if fragment.is_empty() {
        return Some(document);
    }
    if !fragment.starts_with('/') {
        return None;
    }
    document.pointer(fragment)
}

/// Last segment of a fragment, unescaped; used to name definitions.
pub fn last_segment(fragment: &str) -> Option<String> {
    let segment = fragment.rsplit('/').next().filter(|s| !s.is_empty())?;
    Some(segment.replace("~1", "/").replace("~0", "~"))
}
