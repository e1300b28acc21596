pub mod annotate;
pub mod check_credentials;
