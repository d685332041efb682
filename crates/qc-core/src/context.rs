//! Shared, read-only state handed to every section builder.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use qc_ingest::{ArtifactLocator, PipelineResources, read_json};
use qc_model::{DatasetDescription, SubjectIdentity};

/// Streamline count used when a tractography status file does not name one.
pub const DEFAULT_STREAMLINES: &str = "40M";

/// Shown when the dataset description cannot be read.
pub const UNKNOWN_DATASET: &str = "-";

/// Options controlling side effects of report generation.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Remove intermediate figures from the scratch directory after each report.
    pub cleanup: bool,
    /// Keep the intermediate HTML next to each PDF.
    pub keep_html: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            cleanup: true,
            keep_html: false,
        }
    }
}

/// Context for one subject/session run.
///
/// Built once by the driver and passed by reference to every section
/// builder; nothing in it changes while reports are produced.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Path calculator for the subject's derivatives.
    pub locator: ArtifactLocator,
    /// Files shipped with the pipeline installation.
    pub resources: PipelineResources,
    /// `Name` from the raw dataset's `dataset_description.json`.
    pub dataset_name: String,
    /// Default streamline label (e.g. `40M`).
    pub streamlines: String,
    /// Timestamp printed in each report footer.
    pub generated_at: DateTime<Utc>,
    pub options: ReportOptions,
}

impl ReportContext {
    /// Creates a context with default options and the current time.
    pub fn new(locator: ArtifactLocator, resources: PipelineResources) -> Self {
        Self {
            locator,
            resources,
            dataset_name: UNKNOWN_DATASET.to_string(),
            streamlines: DEFAULT_STREAMLINES.to_string(),
            generated_at: Utc::now(),
            options: ReportOptions::default(),
        }
    }

    /// Sets the dataset name shown in the report header.
    #[must_use]
    pub fn with_dataset_name(mut self, name: impl Into<String>) -> Self {
        self.dataset_name = name.into();
        self
    }

    /// Reads the dataset name from `<bids>/dataset_description.json`.
    ///
    /// A missing or malformed description is logged and leaves the
    /// current name in place.
    #[must_use]
    pub fn with_dataset_description(self) -> Self {
        let path = self.locator.dataset_description();
        match read_json::<DatasetDescription>(&path) {
            Ok(description) => self.with_dataset_name(description.name),
            Err(error) => {
                warn!(path = %path.display(), %error, "dataset description unavailable");
                self
            }
        }
    }

    /// Sets the default streamline label.
    #[must_use]
    pub fn with_streamlines(mut self, streamlines: impl Into<String>) -> Self {
        self.streamlines = streamlines.into();
        self
    }

    /// Sets the report generation timestamp.
    #[must_use]
    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Sets the report options.
    #[must_use]
    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn subject(&self) -> &SubjectIdentity {
        self.locator.subject()
    }

    pub fn bids_id(&self) -> &str {
        self.locator.bids_id()
    }

    /// Footer timestamp, RFC 3339 to the second.
    pub fn generated_at_display(&self) -> String {
        self.generated_at
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn context(bids: &std::path::Path) -> ReportContext {
        let subject = SubjectIdentity::new("01", None).unwrap();
        let locator = ArtifactLocator::new("/out/micapipe_v0.2.0", bids, "/tmp", subject);
        ReportContext::new(locator, PipelineResources::new("/opt/micapipe"))
    }

    #[test]
    fn reads_dataset_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("dataset_description.json"),
            r#"{"Name": "MICA-MICs", "BIDSVersion": "1.6.0"}"#,
        )
        .unwrap();
        let ctx = context(dir.path()).with_dataset_description();
        assert_eq!(ctx.dataset_name, "MICA-MICs");
    }

    #[test]
    fn missing_dataset_description_keeps_placeholder() {
        let dir = TempDir::new().unwrap();
        let ctx = context(dir.path()).with_dataset_description();
        assert_eq!(ctx.dataset_name, UNKNOWN_DATASET);
    }

    #[test]
    fn builder_sets_fields() {
        let dir = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let ctx = context(dir.path())
            .with_streamlines("5M")
            .with_generated_at(at)
            .with_options(ReportOptions {
                cleanup: false,
                keep_html: true,
            });
        assert_eq!(ctx.streamlines, "5M");
        assert_eq!(ctx.generated_at_display(), "2024-03-01T12:30:00Z");
        assert!(ctx.options.keep_html);
        assert_eq!(ctx.bids_id(), "sub-01");
    }
}
