use crate::config::{ConfigError, RunConfig};
use crate::http_client::HttpClient;
use crate::orchestrator::{Orchestrator, RunFailure, RunOutcome, Stage};
use tracing::error;

pub struct AnnotateCommand<C>
where
    C: HttpClient,
{
    http_client: C,
    dry_run: bool,
}

impl<C> AnnotateCommand<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C) -> Self {
        Self {
            http_client,
            dry_run: false,
        }
    }

    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }

    /// Runs the whole annotation flow. A configuration that could not be read fails
    /// the run at the credentials stage without any request being sent.
    pub fn annotate(
        self,
        config: Result<RunConfig, ConfigError>,
    ) -> Result<RunOutcome, RunFailure> {
        let config = config.map_err(|e| {
            let failure = RunFailure {
                stage: Stage::LoadCredentials,
                error: e.into(),
            };
            error!("error creating annotation: {failure}");
            failure
        })?;

        Orchestrator::new(config, self.http_client)
            .with_dry_run(self.dry_run)
            .run()
    }
}
