//! Identifier helpers shared by datasets and evaluations.

use uuid::Uuid;

/// Generate a fresh opaque identifier.
///
/// Ids are plain strings everywhere in this crate; callers may supply their
/// own, and listings order them lexicographically.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_uuids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
