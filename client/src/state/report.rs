//! Dashboard interaction: submit a topic, then fetch the generated PDF.
//!
//! A [`ReportDesk`] lives for one dashboard visit. Dropping it discards the
//! transient [`GeneratedReport`]; nothing here is persisted.

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;

use std::sync::Arc;

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{GeneratedReport, User};

pub const EMPTY_TOPIC_MESSAGE: &str = "Please enter a topic";
pub const GENERATED_MESSAGE: &str = "Report generated successfully!";
pub const GENERATE_FAILED_MESSAGE: &str = "Failed to generate report";
pub const DOWNLOAD_FAILED_MESSAGE: &str = "Failed to download report";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Rejected before any network call.
    #[error("Please enter a topic")]
    EmptyTopic,

    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// What the dashboard shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportDeskState {
    pub topic: String,
    pub loading: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub report: Option<GeneratedReport>,
}

/// A downloaded PDF and the name it should be saved under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Header line for the dashboard.
#[must_use]
pub fn greeting(user: Option<&User>) -> String {
    format!("Welcome back, {}!", user.map_or("", |u| u.username.as_str()))
}

fn topic_is_blank(topic: &str) -> bool {
    topic.trim().is_empty()
}

pub struct ReportDesk {
    api: Arc<ApiClient>,
    state: ReportDeskState,
}

impl ReportDesk {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api, state: ReportDeskState::default() }
    }

    #[must_use]
    pub fn state(&self) -> &ReportDeskState {
        &self.state
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.state.topic = topic.into();
    }

    /// Whether the submit control should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.state.loading && !topic_is_blank(&self.state.topic)
    }

    /// Ask the server for a report on the current topic.
    ///
    /// # Errors
    ///
    /// [`ReportError::EmptyTopic`] for a blank topic (no request is sent);
    /// [`ReportError::Api`] when the server call fails.
    pub async fn generate(&mut self) -> Result<GeneratedReport, ReportError> {
        if topic_is_blank(&self.state.topic) {
            self.state.error = Some(EMPTY_TOPIC_MESSAGE.to_owned());
            return Err(ReportError::EmptyTopic);
        }

        self.state.loading = true;
        self.state.error = None;
        self.state.success = None;
        self.state.report = None;

        let result = self.api.generate_report(&self.state.topic).await;
        self.state.loading = false;
        match result {
            Ok(report) => {
                tracing::info!(filename = %report.filename, "report generated");
                self.state.report = Some(report.clone());
                self.state.success = Some(GENERATED_MESSAGE.to_owned());
                self.state.topic.clear();
                Ok(report)
            }
            Err(source) => {
                let message = source.user_message(GENERATE_FAILED_MESSAGE);
                self.state.error = Some(message.clone());
                Err(ReportError::Api { message, source })
            }
        }
    }

    /// Fetch the PDF for the last generated report, if there is one.
    ///
    /// # Errors
    ///
    /// [`ReportError::Api`] when the download fails.
    pub async fn download(&mut self) -> Result<Option<DownloadedReport>, ReportError> {
        let Some(filename) = self.state.report.as_ref().map(|r| r.filename.clone()) else {
            return Ok(None);
        };
        match self.api.download_report(&filename).await {
            Ok(bytes) => Ok(Some(DownloadedReport { filename, bytes })),
            Err(source) => {
                self.state.error = Some(DOWNLOAD_FAILED_MESSAGE.to_owned());
                Err(ReportError::Api { message: DOWNLOAD_FAILED_MESSAGE.to_owned(), source })
            }
        }
    }

    /// Seed the desk with a report produced elsewhere (e.g. a filename typed
    /// on the command line).
    pub fn adopt(&mut self, report: GeneratedReport) {
        self.state.report = Some(report);
    }
}
