use crate::jwt::claims::{Claims, MAX_ASSERTION_LIFETIME};
use crate::jwt::signed::SignedJwt;
use crate::jwt::signer::JwtSigner;
use crate::token::Token;
use crate::token_exchanger::TokenExchanger;
use crate::{TokenRetriever, TokenRetrieverError};

use chrono::{TimeDelta, Utc};
use tracing::debug;

/// Scope needed to create reporting data annotations.
pub const ANALYTICS_EDIT_SCOPE: &str = "https://www.googleapis.com/auth/analytics.edit";
/// The token outlives the single call made with it, so the longest allowed window is used.
pub const DEFAULT_ASSERTION_LIFETIME: TimeDelta = MAX_ASSERTION_LIFETIME;

/// Retrieves a bearer token through the JWT-bearer grant: one signature, one exchange.
///
/// Nothing is cached. Every call to [`TokenRetriever::retrieve`] signs a fresh assertion.
pub struct JwtBearerTokenRetriever<E, J>
where
    E: TokenExchanger,
    J: JwtSigner,
{
    service_account: String,
    audience: String,
    scope: String,
    exchanger: E,
    jwt_signer: J,
}

impl<E, J> TokenRetriever for JwtBearerTokenRetriever<E, J>
where
    E: TokenExchanger,
    J: JwtSigner,
{
    fn retrieve(&self) -> Result<Token, TokenRetrieverError> {
        let assertion = self.sign_assertion()?;
        self.exchange(&assertion)
    }
}

impl<E, J> JwtBearerTokenRetriever<E, J>
where
    E: TokenExchanger,
    J: JwtSigner,
{
    /// `audience` must be the token endpoint the `exchanger` talks to.
    pub fn new(service_account: String, audience: String, exchanger: E, jwt_signer: J) -> Self {
        Self {
            service_account,
            audience,
            scope: ANALYTICS_EDIT_SCOPE.to_string(),
            exchanger,
            jwt_signer,
        }
    }

    pub fn with_scope(self, scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..self
        }
    }

    pub fn service_account(&self) -> &str {
        &self.service_account
    }

    /// Signs the claim set `{iss, sub, aud, iat, exp, scope}` issued now.
    pub fn sign_assertion(&self) -> Result<SignedJwt, TokenRetrieverError> {
        let claims = Claims::new(
            &self.service_account,
            &self.audience,
            Utc::now(),
            DEFAULT_ASSERTION_LIFETIME,
            &self.scope,
        )?;

        let signed_jwt = self.jwt_signer.sign(claims)?;
        debug!("assertion signed for {}", self.service_account);
        Ok(signed_jwt)
    }

    pub fn exchange(&self, assertion: &SignedJwt) -> Result<Token, TokenRetrieverError> {
        let token = self.exchanger.exchange(assertion)?;
        debug!("access token obtained, expires at {}", token.expires_at());
        Ok(token)
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::jwt::error::JwtEncoderError;
    use crate::credential::ServiceAccountCredential;
    use crate::credential::tests::key_file_json;
    use crate::jwt::signer::tests::MockJwtSigner;
    use crate::token::{AccessToken, TokenType};
    use crate::token_exchanger::TokenExchangeError;
    use crate::token_exchanger::test::MockTokenExchanger;
    use assert_matches::assert_matches;
    use mockall::Sequence;

    const SERVICE_ACCOUNT: &str = "deployer@project.iam.gserviceaccount.com";
    const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

    fn signed(value: &str) -> SignedJwt {
        SignedJwt {
            value: value.to_string(),
        }
    }

    #[test]
    fn signs_then_exchanges() {
        let mut seq = Sequence::new();

        let mut jwt_signer = MockJwtSigner::new();
        jwt_signer
            .expect_sign()
            .once()
            .in_sequence(&mut seq)
            .withf(|claims| {
                let now = Utc::now().timestamp() as u64;
                claims.iss == SERVICE_ACCOUNT
                    && claims.sub == SERVICE_ACCOUNT
                    && claims.aud == TOKEN_URI
                    && claims.scope == ANALYTICS_EDIT_SCOPE
                    && claims.exp - claims.iat == 3600
                    && claims.iat.abs_diff(now) <= 5
            })
            .returning(|_| Ok(signed("client_assertion")));

        let mut exchanger = MockTokenExchanger::new();
        exchanger
            .expect_exchange()
            .once()
            .in_sequence(&mut seq)
            .withf(|assertion| assertion.value() == "client_assertion")
            .returning(|_| {
                Ok(Token::expiring_in(AccessToken::from("T"), TokenType::Bearer, 3599).unwrap())
            });

        let retriever = JwtBearerTokenRetriever::new(
            SERVICE_ACCOUNT.to_string(),
            TOKEN_URI.to_string(),
            exchanger,
            jwt_signer,
        );

        let token = retriever.retrieve().unwrap();
        assert_eq!(token.access_token(), "T");
    }

    #[test]
    fn signing_failure_never_reaches_the_token_endpoint() {
        let mut jwt_signer = MockJwtSigner::new();
        jwt_signer
            .expect_sign()
            .once()
            .returning(|claims| {
                Err(JwtEncoderError::AssertionSigning {
                    subject: claims.sub,
                    reason: "InvalidKeyFormat".into(),
                })
            });

        let mut exchanger = MockTokenExchanger::new();
        exchanger.expect_exchange().never();

        let retriever = JwtBearerTokenRetriever::new(
            SERVICE_ACCOUNT.to_string(),
            TOKEN_URI.to_string(),
            exchanger,
            jwt_signer,
        );

        assert_matches!(retriever.retrieve(), Err(TokenRetrieverError::JwtSigner(_)));
    }

    #[test]
    fn exchange_failure_is_propagated() {
        let mut jwt_signer = MockJwtSigner::new();
        jwt_signer
            .expect_sign()
            .returning(|_| Ok(signed("client_assertion")));

        let mut exchanger = MockTokenExchanger::new();
        exchanger
            .expect_exchange()
            .once()
            .returning(|_| Err(TokenExchangeError::MissingAccessToken("{}".into())));

        let retriever = JwtBearerTokenRetriever::new(
            SERVICE_ACCOUNT.to_string(),
            TOKEN_URI.to_string(),
            exchanger,
            jwt_signer,
        );

        assert_matches!(
            retriever.retrieve(),
            Err(TokenRetrieverError::TokenExchange(TokenExchangeError::MissingAccessToken(_)))
        );
    }

    #[test]
    fn custom_scope_is_requested() {
        let mut jwt_signer = MockJwtSigner::new();
        jwt_signer
            .expect_sign()
            .once()
            .withf(|claims| claims.scope == "https://www.googleapis.com/auth/analytics.readonly")
            .returning(|_| Ok(signed("client_assertion")));

        let retriever = JwtBearerTokenRetriever::new(
            SERVICE_ACCOUNT.to_string(),
            TOKEN_URI.to_string(),
            MockTokenExchanger::new(),
            jwt_signer,
        )
        .with_scope("https://www.googleapis.com/auth/analytics.readonly");

        assert!(retriever.sign_assertion().is_ok());
    }

    #[test]
    fn audience_is_the_configured_token_uri() {
        let credential =
            ServiceAccountCredential::from_json(&key_file_json("https://oauth2.example.com"))
                .unwrap();

        let mut jwt_signer = MockJwtSigner::new();
        jwt_signer
            .expect_sign()
            .once()
            .withf(|claims| claims.aud == "https://oauth2.example.com")
            .returning(|_| Ok(signed("client_assertion")));

        let retriever = JwtBearerTokenRetriever::new(
            credential.client_email().to_string(),
            credential.audience().to_string(),
            MockTokenExchanger::new(),
            jwt_signer,
        );

        assert!(retriever.sign_assertion().is_ok());
    }
}
