/// A compact JWS, ready to be used as the `assertion` of a JWT-bearer grant.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedJwt {
    /// Encoded value
    pub(crate) value: String,
}

impl SignedJwt {
    /// Get the encoded value
    pub fn value(&self) -> &str {
        &self.value
    }
}
