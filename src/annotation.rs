use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;

/// Shown in place of the commit message when it cannot be read.
pub const NO_COMMIT_MESSAGE: &str = "No commit message";
/// Number of SHA characters shown in the description.
pub const SHORT_SHA_LEN: usize = 7;

/// Colors accepted by the reporting data annotations API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationColor {
    Purple,
    Brown,
    #[default]
    Blue,
    Green,
    Red,
    Cyan,
    Orange,
}

impl fmt::Display for AnnotationColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationColor::Purple => "PURPLE",
            AnnotationColor::Brown => "BROWN",
            AnnotationColor::Blue => "BLUE",
            AnnotationColor::Green => "GREEN",
            AnnotationColor::Red => "RED",
            AnnotationColor::Cyan => "CYAN",
            AnnotationColor::Orange => "ORANGE",
        };
        f.write_str(name)
    }
}

/// Calendar day an annotation is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl From<DateTime<Utc>> for AnnotationDate {
    fn from(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
            day: now.day(),
        }
    }
}

/// A deploy marker, serialized as a `ReportingDataAnnotation` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub title: String,
    pub description: String,
    pub color: AnnotationColor,
    pub annotation_date: AnnotationDate,
}

impl Annotation {
    /// Assembles the annotation for a deploy of `commit_sha`.
    ///
    /// Never fails: a missing or blank commit message or actor degrades to a placeholder
    /// or is left out. The date is the UTC calendar day of `now`.
    pub fn build(
        commit_sha: &str,
        repo_name: &str,
        commit_message: Option<&str>,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        let short_sha: String = commit_sha.chars().take(SHORT_SHA_LEN).collect();
        let message = commit_message
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(NO_COMMIT_MESSAGE);

        let title = match actor.map(str::trim).filter(|actor| !actor.is_empty()) {
            Some(actor) => format!("Deploy: {repo_name} by {actor}"),
            None => format!("Deploy: {repo_name}"),
        };

        Self {
            title,
            description: format!("Commit: {short_sha} - {message}"),
            color: AnnotationColor::default(),
            annotation_date: AnnotationDate::from(now),
        }
    }

    pub fn with_color(self, color: AnnotationColor) -> Self {
        Self { color, ..self }
    }
}
