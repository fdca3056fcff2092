//! Holder identity generation.

use uuid::Uuid;

/// Generates a unique holder token for a mutex instance when the caller
/// supplies none.
///
/// Logically distinct claimants must have distinct holder identities; two
/// mutexes sharing a holder can steal the lease from one another, which
/// breaks mutual exclusion.
pub fn generate_holder() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_holder(), generate_holder());
    }

    #[test]
    fn token_is_nonempty_text() {
        let token = generate_holder();
        assert!(!token.is_empty());
        assert!(token.is_ascii());
    }
}
