use base64::Engine;
use chrono::{DateTime, Utc};

/// One-way salted password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError>;
}

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(plaintext, self.cost)
    }
}

pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 32 URL-safe characters drawn from the thread-local CSPRNG.
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let bytes: [u8; 24] = rand::random();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_32_url_safe_chars_and_differ() {
        let generator = RandomTokenGenerator;
        let a = generator.generate();
        let b = generator.generate();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    #[test]
    fn bcrypt_hash_verifies() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("abc123!").unwrap();
        assert_ne!(hash, "abc123!");
        assert!(bcrypt::verify("abc123!", &hash).unwrap());
        assert!(!bcrypt::verify("abc123?", &hash).unwrap());
    }
}
