use std::env;
use std::env::VarError;

use http::Uri;
use thiserror::Error;

use crate::annotation::AnnotationColor;
use crate::annotation::client::{DEFAULT_API_BASE_URL, PropertyId};
use crate::credential::ServiceAccountCredential;

/// Service account JSON key, inline.
pub const CREDENTIALS_ENV_NAME: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";
pub const PROPERTY_ID_ENV_NAME: &str = "GA4_PROPERTY_ID";
pub const COMMIT_SHA_ENV_NAME: &str = "GITHUB_SHA";
pub const REPOSITORY_ENV_NAME: &str = "GITHUB_REPOSITORY";
pub const ACTOR_ENV_NAME: &str = "GITHUB_ACTOR";

/// All the problems found while reading the configuration, reported at once.
#[derive(Error, Debug, PartialEq)]
#[error("invalid configuration: {}", .problems.join("; "))]
pub struct ConfigError {
    problems: Vec<String>,
}

impl ConfigError {
    pub fn problems(&self) -> &[String] {
        &self.problems
    }
}

/// Every input of a run, validated before any network activity.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub credential: ServiceAccountCredential,
    pub property_id: PropertyId,
    pub commit_sha: String,
    pub repository: String,
    pub actor: Option<String>,
    pub commit_message: Option<String>,
    pub color: AnnotationColor,
    pub api_base_url: Uri,
}

impl RunConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(env::var)
    }

    /// Reads the configuration through `env_var`, collecting every missing or malformed value.
    pub fn from_env_with<F>(env_var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<String, VarError>,
    {
        let mut problems = Vec::new();

        let credential = credential_with(&env_var)
            .map_err(|e| problems.extend(e.problems))
            .ok();

        let property_id = required(&env_var, PROPERTY_ID_ENV_NAME, &mut problems).and_then(|id| {
            id.parse::<PropertyId>()
                .map_err(|e| problems.push(format!("{PROPERTY_ID_ENV_NAME}: {e}")))
                .ok()
        });
        let commit_sha = required(&env_var, COMMIT_SHA_ENV_NAME, &mut problems);
        let repository = required(&env_var, REPOSITORY_ENV_NAME, &mut problems);
        let actor = optional(&env_var, ACTOR_ENV_NAME);

        match (credential, property_id, commit_sha, repository) {
            (Some(credential), Some(property_id), Some(commit_sha), Some(repository))
                if problems.is_empty() =>
            {
                Ok(Self {
                    credential,
                    property_id,
                    commit_sha,
                    repository,
                    actor,
                    commit_message: None,
                    color: AnnotationColor::default(),
                    api_base_url: Uri::from_static(DEFAULT_API_BASE_URL),
                })
            }
            _ => Err(ConfigError { problems }),
        }
    }

    pub fn with_commit_message(self, commit_message: Option<String>) -> Self {
        Self {
            commit_message,
            ..self
        }
    }

    pub fn with_color(self, color: AnnotationColor) -> Self {
        Self { color, ..self }
    }

    pub fn with_api_base_url(self, api_base_url: Uri) -> Self {
        Self {
            api_base_url,
            ..self
        }
    }
}

/// Reads only the service account credential from the process environment.
pub fn credential_from_env() -> Result<ServiceAccountCredential, ConfigError> {
    credential_with(&env::var)
}

fn credential_with<F>(env_var: &F) -> Result<ServiceAccountCredential, ConfigError>
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    let mut problems = Vec::new();
    let credential = required(env_var, CREDENTIALS_ENV_NAME, &mut problems).and_then(|json| {
        ServiceAccountCredential::from_json(&json)
            .map_err(|e| problems.push(format!("{CREDENTIALS_ENV_NAME}: {e}")))
            .ok()
    });
    credential.ok_or(ConfigError { problems })
}

fn required<F>(env_var: &F, name: &'static str, problems: &mut Vec<String>) -> Option<String>
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    let value = optional(env_var, name);
    if value.is_none() {
        problems.push(format!("missing required environment variable `{name}`"));
    }
    value
}

fn optional<F>(env_var: &F, name: &'static str) -> Option<String>
where
    F: Fn(&'static str) -> Result<String, VarError>,
{
    env_var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::credential::tests::key_file_json;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    /// Environment of a push-triggered CI job, with credentials pointing at `token_uri`.
    pub(crate) fn ci_env(token_uri: &str) -> HashMap<&'static str, String> {
        HashMap::from([
            (CREDENTIALS_ENV_NAME, key_file_json(token_uri)),
            (PROPERTY_ID_ENV_NAME, "123456789".to_string()),
            (COMMIT_SHA_ENV_NAME, "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678".to_string()),
            (REPOSITORY_ENV_NAME, "org/repo".to_string()),
            (ACTOR_ENV_NAME, "alice".to_string()),
        ])
    }

    pub(crate) fn config_from(env: &HashMap<&'static str, String>) -> Result<RunConfig, ConfigError> {
        RunConfig::from_env_with(|k| env.get(k).cloned().ok_or(VarError::NotPresent))
    }

    #[test]
    fn reads_a_complete_environment() {
        let config = config_from(&ci_env("https://oauth2.googleapis.com/token")).unwrap();

        assert_eq!(config.property_id.to_string(), "123456789");
        assert_eq!(config.repository, "org/repo");
        assert_eq!(config.actor.as_deref(), Some("alice"));
        assert_eq!(config.commit_message, None);
        assert_eq!(config.color, AnnotationColor::Blue);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(
            config.credential.client_email(),
            "deployer@project.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn actor_is_optional() {
        let mut env = ci_env("https://oauth2.googleapis.com/token");
        env.remove(ACTOR_ENV_NAME);

        let config = config_from(&env).unwrap();
        assert_eq!(config.actor, None);
    }

    #[test]
    fn every_missing_variable_is_reported_at_once() {
        let error = config_from(&HashMap::new()).unwrap_err();

        assert_eq!(error.problems().len(), 4);
        let message = error.to_string();
        for name in [
            CREDENTIALS_ENV_NAME,
            PROPERTY_ID_ENV_NAME,
            COMMIT_SHA_ENV_NAME,
            REPOSITORY_ENV_NAME,
        ] {
            assert!(message.contains(name), "{name} not reported in `{message}`");
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut env = ci_env("https://oauth2.googleapis.com/token");
        env.insert(COMMIT_SHA_ENV_NAME, "   ".to_string());

        let error = config_from(&env).unwrap_err();
        assert_eq!(
            error.problems(),
            ["missing required environment variable `GITHUB_SHA`".to_string()]
        );
    }

    #[test]
    fn malformed_values_are_reported() {
        let mut env = ci_env("https://oauth2.googleapis.com/token");
        env.insert(CREDENTIALS_ENV_NAME, "{not json".to_string());
        env.insert(PROPERTY_ID_ENV_NAME, "G-XXXXXXX".to_string());

        let error = config_from(&env).unwrap_err();
        assert_eq!(error.problems().len(), 2);
        assert!(error.problems()[0].starts_with(CREDENTIALS_ENV_NAME));
        assert!(error.problems()[1].starts_with(PROPERTY_ID_ENV_NAME));
    }

    #[test]
    fn credential_alone_can_be_read() {
        let env = ci_env("https://oauth2.googleapis.com/token");
        let credential = credential_with(&|k| env.get(k).cloned().ok_or(VarError::NotPresent));
        assert!(credential.is_ok());

        let credential = credential_with(&|_| Err(VarError::NotPresent));
        assert_matches!(credential, Err(ConfigError { problems }) => {
            assert_eq!(problems.len(), 1);
        });
    }
}
