//! Model reply parser.
//!
//! Locates the first decodable JSON array in the model's free-form reply
//! and returns its elements as loosely-typed values. The reply often
//! wraps the array in prose or markdown fencing; schema enforcement
//! happens later in the validator, never here.

use serde_json::Value;

use crate::error::ParseError;

/// Extract the tournament objects from a model reply.
///
/// Scans for `[` and attempts a JSON decode at each candidate position,
/// so stray brackets in surrounding prose do not defeat the parse.
/// An array containing no objects (a citation like `[1]`) is only
/// returned if no object-bearing or empty array follows it. Trailing
/// text after the array is ignored.
pub fn extract_tournament_objects(reply: &str) -> Result<Vec<Value>, ParseError> {
    let mut search_from = 0;
    let mut fallback: Option<Vec<Value>> = None;
    let mut last_err: Option<serde_json::Error> = None;

    while let Some(offset) = reply[search_from..].find('[') {
        let start = search_from + offset;
        let mut stream =
            serde_json::Deserializer::from_str(&reply[start..]).into_iter::<Value>();

        match stream.next() {
            Some(Ok(Value::Array(items))) => {
                if items.is_empty() || items.iter().any(Value::is_object) {
                    return Ok(items);
                }
                fallback.get_or_insert(items);
            }
            Some(Err(e)) => last_err = Some(e),
            _ => {}
        }

        search_from = start + 1;
    }

    if let Some(items) = fallback {
        return Ok(items);
    }

    match last_err {
        Some(e) => Err(ParseError::InvalidJson(e)),
        None => Err(ParseError::NoJsonArray),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
