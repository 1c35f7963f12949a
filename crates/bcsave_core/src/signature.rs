//! HMAC-SHA256 request signing keyed by the account's inquiry code.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, SaveError};

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag hashed ahead of the message by [`Signature::sign_tagged`].
pub const ALGORITHM_TAG: &str = "HMACSHA256";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    inquiry_code: String,
}

impl Signature {
    pub fn new(inquiry_code: impl Into<String>) -> Result<Self> {
        let inquiry_code = inquiry_code.into();
        if inquiry_code.is_empty() {
            return Err(SaveError::signature("inquiry code is empty"));
        }
        Ok(Self { inquiry_code })
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(self.inquiry_code.as_bytes())
            .map_err(|err| SaveError::signature(err.to_string()))
    }

    /// Lowercase hex HMAC-SHA256 of `message`.
    pub fn sign(&self, message: &[u8]) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }

    /// As [`sign`](Self::sign), with [`ALGORITHM_TAG`] hashed first.
    pub fn sign_tagged(&self, message: &[u8]) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(ALGORITHM_TAG.as_bytes());
        mac.update(message);
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }
}
