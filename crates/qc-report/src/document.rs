//! Typed report document.
//!
//! Section builders produce [`Block`] trees; nothing is rendered to markup
//! until [`ReportDocument::to_html`] serializes the finished document once.

use std::path::{Path, PathBuf};

use qc_model::{ModuleKind, ModuleStatus, display_value};

/// Text shown in place of an artifact that is not on disk.
pub const MISSING_PLACEHOLDER: &str = "does not exist";

/// Text shown when an artifact exists but its figure could not be produced.
pub const FAILED_PLACEHOLDER: &str = "figure could not be rendered";

/// An image produced for the report, or the placeholder for a missing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Figure {
    Image(PathBuf),
    Missing,
    /// The artifact is on disk but rendering it failed.
    Failed,
}

impl Figure {
    pub fn is_missing(&self) -> bool {
        matches!(self, Figure::Missing)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Figure::Failed)
    }
}

/// A single output artifact: its name, where it lives and its figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBlock {
    pub name: String,
    /// Path shown under the name. `None` renders the placeholder text.
    pub path: Option<PathBuf>,
    pub figure: Figure,
}

impl ArtifactBlock {
    /// Block for an artifact that exists and was rendered to `figure`.
    pub fn rendered(name: impl Into<String>, path: &Path, figure: PathBuf) -> Self {
        Self {
            name: name.into(),
            path: Some(path.to_path_buf()),
            figure: Figure::Image(figure),
        }
    }

    /// Block for an artifact that exists but could not be rendered.
    pub fn failed(name: impl Into<String>, path: &Path) -> Self {
        Self {
            name: name.into(),
            path: Some(path.to_path_buf()),
            figure: Figure::Failed,
        }
    }

    /// Block for an artifact that is absent.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            figure: Figure::Missing,
        }
    }
}

/// Table cell content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Image(PathBuf),
    Missing,
    /// Inputs exist but the figure could not be produced.
    Failed,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// Horizontal layout of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// Label column followed by value columns.
    #[default]
    KeyValue,
    /// Centered figure grid (parcellations, connectomes).
    Gallery,
}

/// A bordered table with an optional spanning title row and header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub kind: TableKind,
    pub title: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn key_value() -> Self {
        Self::default()
    }

    pub fn gallery() -> Self {
        Self {
            kind: TableKind::Gallery,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = header.into_iter().map(Into::into).collect();
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Adds a `label | value` text row.
    pub fn push_pair(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.rows.push(vec![Cell::text(label), Cell::text(value)]);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns, taken from the widest of header and rows.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Document node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Pipeline banner image at the top of the page.
    Banner(PathBuf),
    /// Dataset name.
    Title(String),
    /// `Subject: X | Session: Y` line.
    SubjectLine { subject: String, session: String },
    /// Boxed `Module: ...` heading.
    ModuleHeader(String),
    /// Section heading (`Inputs`, `Main outputs`).
    Heading(String),
    /// Smaller heading inside a section (`Native surfaces`).
    Subheading(String),
    BulletList(Vec<String>),
    Artifact(ArtifactBlock),
    Table(Table),
    /// Small print at the bottom of the report.
    Footer(String),
}

/// Content produced by a section builder for one module status file.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub module: ModuleKind,
    /// Module header text, e.g. `proc_func (se_task-rest)`.
    pub title: String,
    pub summary: Table,
    pub inputs: Vec<Block>,
    pub outputs: Vec<Block>,
    /// Intermediate figures written to the scratch directory.
    pub figures: Vec<PathBuf>,
}

impl Section {
    /// Starts a section with the QC summary for `status`.
    pub fn new(module: ModuleKind, title: impl Into<String>, status: &ModuleStatus) -> Self {
        Self {
            module,
            title: title.into(),
            summary: summary_table(status),
            inputs: Vec::new(),
            outputs: Vec::new(),
            figures: Vec::new(),
        }
    }

    /// Iterates over every block of the section body, inputs first.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.inputs.iter().chain(&self.outputs)
    }
}

/// QC summary table with status record values copied verbatim.
pub fn summary_table(status: &ModuleStatus) -> Table {
    let mut table = Table::key_value();
    table.push_pair(
        "Status",
        format!(
            "{}: {} steps completed",
            status.status,
            display_value(&status.progress)
        ),
    );
    table.push_pair(
        "Processing time",
        format!("{} minutes", display_value(&status.processing_time)),
    );
    table.push_pair("Number of threads", display_value(&status.threads));
    table.push_pair("Micapipe version", display_value(&status.pipeline_version));
    table.push_pair("Date", display_value(&status.date));
    table
}

/// A complete report, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Count of placeholders for missing artifacts.
    pub fn missing_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Artifact(artifact) if artifact.figure.is_missing() => 1,
                Block::Table(table) => table
                    .rows
                    .iter()
                    .flatten()
                    .filter(|cell| matches!(cell, Cell::Missing))
                    .count(),
                _ => 0,
            })
            .sum()
    }

    /// Count of artifacts that exist but whose figure failed.
    pub fn failed_count(&self) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Artifact(artifact) if artifact.figure.is_failed() => 1,
                Block::Table(table) => table
                    .rows
                    .iter()
                    .flatten()
                    .filter(|cell| matches!(cell, Cell::Failed))
                    .count(),
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_model::CompletionState;
    use serde_json::json;

    fn status() -> ModuleStatus {
        serde_json::from_value(json!({
            "Module": "GD",
            "Status": "COMPLETED",
            "Progress": 5,
            "Processing.time": 12,
            "Threads": 4,
            "micapipeVersion": "v0.2.3",
            "Date": "2024-01-02"
        }))
        .unwrap()
    }

    #[test]
    fn summary_copies_status_fields() {
        let table = summary_table(&status());
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0][1], Cell::text("COMPLETED: 5 steps completed"));
        assert_eq!(table.rows[1][1], Cell::text("12 minutes"));
        assert_eq!(table.rows[2][1], Cell::text("4"));
        assert_eq!(table.rows[3][1], Cell::text("v0.2.3"));
    }

    #[test]
    fn summary_tolerates_missing_fields() {
        let status = ModuleStatus {
            module: "SC".to_string(),
            status: CompletionState::Completed,
            progress: serde_json::Value::Null,
            processing_time: serde_json::Value::Null,
            threads: serde_json::Value::Null,
            pipeline_version: serde_json::Value::Null,
            date: serde_json::Value::Null,
        };
        let table = summary_table(&status);
        assert_eq!(table.rows[0][1], Cell::text("COMPLETED: - steps completed"));
    }

    #[test]
    fn counts_missing_and_failed_separately() {
        let mut doc = ReportDocument::new("sub-01");
        doc.push(Block::Banner(PathBuf::from("/banner.png")));
        doc.push(Block::Artifact(ArtifactBlock::missing("T1w")));
        doc.push(Block::Artifact(ArtifactBlock::failed(
            "brain mask",
            Path::new("/out/anat/mask.nii.gz"),
        )));
        let mut table = Table::gallery().with_header(["Parcellation", "Connectome"]);
        table.push_row(vec![Cell::text("aparc"), Cell::Image(PathBuf::from("/fc.png"))]);
        table.push_row(vec![Cell::text("glasser-360"), Cell::Missing]);
        table.push_row(vec![Cell::text("schaefer-100"), Cell::Failed]);
        doc.push(Block::Table(table));

        assert_eq!(doc.missing_count(), 2);
        assert_eq!(doc.failed_count(), 2);
    }

    #[test]
    fn table_width_covers_header_and_rows() {
        let mut table = Table::gallery().with_header(["a", "b"]);
        table.push_row(vec![Cell::Missing, Cell::Missing, Cell::Missing]);
        assert_eq!(table.width(), 3);
    }
}
