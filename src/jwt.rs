pub mod claims;
pub mod error;
pub mod signed;
pub mod signer;
