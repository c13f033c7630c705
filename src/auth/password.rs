use crate::error::AppError;
use bcrypt::{hash, verify};

/// Salted bcrypt hashing with a tunable work factor.
///
/// A non-matching password is an expected outcome and comes back as
/// `Ok(false)`; only bcrypt itself failing (malformed hash, bad cost) is an
/// error.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

/// Matches the work factor the accounts were originally hashed with.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        Ok(verify(password, hashed_password)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::default();
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert!(hasher.verify(password, &hashed).unwrap());
        assert!(!hasher.verify("wrong_password", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        // Low cost to keep the test fast.
        let hasher = PasswordHasher::new(4);
        let first = hasher.hash("same_password").unwrap();
        let second = hasher.hash("same_password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let hasher = PasswordHasher::default();
        match hasher.verify("test_password123", "invalidhashformat") {
            Err(err) => assert_eq!(err.kind(), ErrorKind::OperationIncomplete),
            Ok(false) => {
                // bcrypt may also report a malformed hash as a plain
                // non-match; both outcomes are acceptable.
            }
            Ok(true) => panic!("verification must not succeed for a malformed hash"),
        }
    }
}
