use std::io::Read;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Practical URL length budget for share links. Enforcement is the
/// caller's policy; the codec only makes `encode_state(..).len()` cheap to
/// check against it.
pub const SHARE_URL_BUDGET: usize = 2000;

/// Upper bound on the inflated payload, so a hostile share string cannot
/// balloon memory.
const MAX_DECODED_BYTES: u64 = 4 * 1024 * 1024;

/// The shareable payload: currently just the raw workflow document. Kept
/// loose on purpose so any workflow schema version round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub workflow: serde_json::Value,
}

/// Serializes the state to JSON and compresses it into a URL-safe string
/// (deflate + unpadded url-safe base64, no characters needing
/// percent-encoding). Deterministic for a given input.
pub fn encode_state(state: &AppState) -> String {
    use std::io::Write;
    // A `Value`-backed struct always serializes; keys are strings and
    // non-finite numbers cannot be represented.
    let json = serde_json::to_vec(state).expect("AppState serialization is infallible");
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .and_then(|_| encoder.finish())
        .map(|compressed| URL_SAFE_NO_PAD.encode(compressed))
        .expect("in-memory deflate cannot fail")
}

/// Decodes a share string back into an [`AppState`].
///
/// Every failure stage (empty input, bad base64, corrupt deflate stream,
/// invalid JSON, schema mismatch) yields `None` — never an error, never a
/// partially-valid value. Safe to call repeatedly; no side effects beyond a
/// debug log of the stage that failed.
pub fn decode_state(encoded: &str) -> Option<AppState> {
    if encoded.is_empty() {
        return None;
    }
    let compressed = match URL_SAFE_NO_PAD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(%err, "share string is not valid base64");
            return None;
        }
    };
    let mut json = Vec::new();
    let mut decoder = DeflateDecoder::new(compressed.as_slice()).take(MAX_DECODED_BYTES);
    if let Err(err) = decoder.read_to_end(&mut json) {
        debug!(%err, "share string is not a valid deflate stream");
        return None;
    }
    let value: serde_json::Value = match serde_json::from_slice(&json) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "decompressed share payload is not JSON");
            return None;
        }
    };
    if !matches_app_state_shape(&value) {
        debug!("share payload does not match the workflow schema");
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Structural schema check, kept loose to support many workflow versions:
/// the payload must be an object with a `workflow` object; if that object
/// carries `nodes` it must be an array, and `connections` (when present)
/// must be a map.
fn matches_app_state_shape(value: &serde_json::Value) -> bool {
    let Some(workflow) = value.get("workflow") else {
        return false;
    };
    let Some(map) = workflow.as_object() else {
        return false;
    };
    if let Some(nodes) = map.get("nodes") {
        if !nodes.is_array() {
            return false;
        }
    }
    if let Some(connections) = map.get("connections") {
        if !connections.is_object() {
            return false;
        }
    }
    true
}
