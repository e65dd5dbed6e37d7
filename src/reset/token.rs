use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

/// Shape of the reset token handed to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    /// Short code typed in from the email, no leading zero.
    Numeric { digits: usize },
    Alphanumeric { chars: usize },
}

impl TokenFormat {
    pub const MIN_DIGITS: usize = 5;
    pub const MAX_DIGITS: usize = 18;
    pub const MIN_CHARS: usize = 32;

    pub fn numeric(digits: usize) -> Result<Self, String> {
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(format!(
                "Numeric reset tokens need between {} and {} digits, got {digits}",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS
            ));
        }
        Ok(TokenFormat::Numeric { digits })
    }

    pub fn alphanumeric(chars: usize) -> Result<Self, String> {
        if chars < Self::MIN_CHARS {
            return Err(format!(
                "Alphanumeric reset tokens need at least {} characters, got {chars}",
                Self::MIN_CHARS
            ));
        }
        Ok(TokenFormat::Alphanumeric { chars })
    }

    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        match *self {
            TokenFormat::Numeric { digits } => {
                let low = 10u64.pow(digits as u32 - 1);
                let high = 10u64.pow(digits as u32);
                rng.random_range(low..high).to_string()
            }
            TokenFormat::Alphanumeric { chars } => rng
                .sample_iter(&Alphanumeric)
                .take(chars)
                .map(char::from)
                .collect(),
        }
    }
}

/// SHA-256 hex digest used as the storage key for any bearer-style token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
