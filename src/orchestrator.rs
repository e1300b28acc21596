use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use crate::AnnotatorError;
use crate::annotation::Annotation;
use crate::annotation::client::AnnotationClient;
use crate::config::RunConfig;
use crate::http_client::{HttpClient, ResponseBody};
use crate::jwt::signer::JwtSignerImpl;
use crate::jwt::signer::local::LocalPrivateKeySigner;
use crate::token_exchanger::HttpTokenExchanger;
use crate::token_retriever::JwtBearerTokenRetriever;

/// Steps of a run, in the only order they can happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadCredentials,
    Sign,
    Exchange,
    BuildPayload,
    Submit,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LoadCredentials => "load credentials",
            Stage::Sign => "sign assertion",
            Stage::Exchange => "exchange token",
            Stage::BuildPayload => "build payload",
            Stage::Submit => "submit annotation",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The absorbing failure state: which stage failed and why.
#[derive(Error, Debug)]
#[error("{stage} failed: {error}")]
pub struct RunFailure {
    pub stage: Stage,
    pub error: AnnotatorError,
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub annotation: Annotation,
    /// Response of the create call. `None` for a dry run.
    pub response: Option<ResponseBody>,
}

/// Drives one run: credentials, signed assertion, bearer token, annotation, create call.
pub struct Orchestrator<C> {
    config: RunConfig,
    http_client: C,
    dry_run: bool,
}

impl<C> Orchestrator<C>
where
    C: HttpClient,
{
    pub fn new(config: RunConfig, http_client: C) -> Self {
        Self {
            config,
            http_client,
            dry_run: false,
        }
    }

    /// Stops after building the payload. Nothing is sent over the network.
    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }

    /// Runs every stage with the current time as the annotation date.
    pub fn run(&self) -> Result<RunOutcome, RunFailure> {
        self.run_at(Utc::now())
    }

    pub fn run_at(&self, now: DateTime<Utc>) -> Result<RunOutcome, RunFailure> {
        let result = self.run_stages(now);
        if let Err(failure) = &result {
            error!("error creating annotation: {failure}");
        }
        result
    }

    fn run_stages(&self, now: DateTime<Utc>) -> Result<RunOutcome, RunFailure> {
        let credential = &self.config.credential;

        enter(Stage::LoadCredentials);
        info!(
            "loaded credentials for service account: {}",
            credential.client_email()
        );
        let signer = LocalPrivateKeySigner::try_from(credential.private_key())
            .map_err(fail(Stage::LoadCredentials))?;
        let retriever = JwtBearerTokenRetriever::new(
            credential.client_email().to_string(),
            credential.audience().to_string(),
            HttpTokenExchanger::new(&self.http_client, credential.token_uri().clone()),
            JwtSignerImpl::Local(signer),
        );

        enter(Stage::Sign);
        let assertion = retriever.sign_assertion().map_err(fail(Stage::Sign))?;

        let token = if self.dry_run {
            None
        } else {
            enter(Stage::Exchange);
            let token = retriever
                .exchange(&assertion)
                .map_err(fail(Stage::Exchange))?;
            info!("access token obtained successfully");
            Some(token)
        };

        enter(Stage::BuildPayload);
        let annotation = Annotation::build(
            &self.config.commit_sha,
            &self.config.repository,
            self.config.commit_message.as_deref(),
            self.config.actor.as_deref(),
            now,
        )
        .with_color(self.config.color);
        info!(
            "annotation data: {}",
            serde_json::to_string(&annotation).unwrap_or_else(|e| e.to_string())
        );

        let response = match token {
            None => {
                info!("dry run: annotation not submitted");
                None
            }
            Some(token) => {
                enter(Stage::Submit);
                let client =
                    AnnotationClient::new(&self.http_client, self.config.api_base_url.clone());
                let response = client
                    .create(&self.config.property_id, &annotation, &token)
                    .map_err(fail(Stage::Submit))?;
                info!("annotation created successfully: {response}");
                Some(response)
            }
        };

        enter(Stage::Done);
        Ok(RunOutcome {
            annotation,
            response,
        })
    }
}

/// Process exit code for the result of a run.
pub fn exit_code<T>(result: &Result<T, RunFailure>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn enter(stage: Stage) {
    info!(%stage, "entering stage");
}

fn fail<E>(stage: Stage) -> impl FnOnce(E) -> RunFailure
where
    E: Into<AnnotatorError>,
{
    move |err| RunFailure {
        stage,
        error: err.into(),
    }
}
