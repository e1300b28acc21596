use std::fmt;

use chrono::{DateTime, Utc};

use crate::credential::ServiceAccountCredential;
use crate::http_client::HttpClient;
use crate::jwt::signer::JwtSignerImpl;
use crate::jwt::signer::local::LocalPrivateKeySigner;
use crate::token_exchanger::HttpTokenExchanger;
use crate::token_retriever::JwtBearerTokenRetriever;
use crate::{AnnotatorError, TokenRetriever};

/// Result of a successful credential check. Holds no secret.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialCheck {
    pub service_account: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Display for CredentialCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "credentials for `{}` are valid, token expires at {}",
            self.service_account,
            self.expires_at.to_rfc3339()
        )
    }
}

pub struct CheckCredentialsCommand<C>
where
    C: HttpClient,
{
    http_client: C,
}

impl<C> CheckCredentialsCommand<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Signs an assertion and exchanges it, discarding the obtained token.
    pub fn check(
        self,
        credential: &ServiceAccountCredential,
    ) -> Result<CredentialCheck, AnnotatorError> {
        let jwt_signer = JwtSignerImpl::Local(LocalPrivateKeySigner::try_from(
            credential.private_key(),
        )?);
        let retriever = JwtBearerTokenRetriever::new(
            credential.client_email().to_string(),
            credential.audience().to_string(),
            HttpTokenExchanger::new(self.http_client, credential.token_uri().clone()),
            jwt_signer,
        );

        let token = retriever.retrieve()?;

        Ok(CredentialCheck {
            service_account: credential.client_email().to_string(),
            expires_at: token.expires_at(),
        })
    }
}
