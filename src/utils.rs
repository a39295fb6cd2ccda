//! Helpers for minting caller-side reference ids

use uuid7::uuid7;

// Entity ids are caller-assigned; the client itself never generates them.
// This helper is for callers (and tests) that want unique references.
pub fn new_reference_id(prefix: &str) -> String {
    format!("{prefix}{}", uuid7())
}
