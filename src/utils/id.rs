//! Random identifiers for masks and messages.

use uuid::Uuid;

/// A fresh random (v4) UUID in its hyphenated string form.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
