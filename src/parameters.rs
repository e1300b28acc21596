use clap::{Subcommand, ValueEnum};
use http::Uri;

use crate::annotation::AnnotationColor;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Records a deploy annotation for the commit described by the CI environment.
    ///
    /// Reads GOOGLE_APPLICATION_CREDENTIALS_JSON, GA4_PROPERTY_ID, GITHUB_SHA,
    /// GITHUB_REPOSITORY and, optionally, GITHUB_ACTOR.
    Annotate {
        /// Build and log the annotation without calling any remote service
        #[arg(long)]
        dry_run: bool,

        /// Color of the annotation
        #[arg(long, value_enum, default_value_t = ColorChoice::Blue)]
        color: ColorChoice,

        /// Base URL of the Analytics Admin API
        #[arg(long)]
        api_base_url: Option<Uri>,
    },
    /// Exchanges the service account credentials for an access token and reports its expiry.
    ///
    /// The token itself is never printed.
    CheckCredentials,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ColorChoice {
    #[value(name = "PURPLE")]
    Purple,
    #[value(name = "BROWN")]
    Brown,
    #[value(name = "BLUE")]
    Blue,
    #[value(name = "GREEN")]
    Green,
    #[value(name = "RED")]
    Red,
    #[value(name = "CYAN")]
    Cyan,
    #[value(name = "ORANGE")]
    Orange,
}

impl From<ColorChoice> for AnnotationColor {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Purple => AnnotationColor::Purple,
            ColorChoice::Brown => AnnotationColor::Brown,
            ColorChoice::Blue => AnnotationColor::Blue,
            ColorChoice::Green => AnnotationColor::Green,
            ColorChoice::Red => AnnotationColor::Red,
            ColorChoice::Cyan => AnnotationColor::Cyan,
            ColorChoice::Orange => AnnotationColor::Orange,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
