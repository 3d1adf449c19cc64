use std::path::Path;

use ncguard_core::{AccessMode, Dataset, Library, NcError, with_reading, with_writing};
use serde::Serialize;

/// Top-level `--json` document.
#[derive(Debug, Serialize)]
pub struct InspectDocument {
    pub library: String,
    pub files: Vec<FileReport>,
}

/// Outcome of inspecting one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileReport {
    Summary(FileSummary),
    Failed { path: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub format: String,
    pub dimensions: usize,
    pub variables: usize,
    pub attributes: usize,
    /// Name of the record dimension, if any
    pub unlimited_dimension: Option<String>,
}

impl FileReport {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileReport::Failed { .. })
    }

    pub fn text_line(&self) -> String {
        match self {
            FileReport::Summary(s) => format!(
                "{}: format={} dimensions={} variables={} attributes={} unlimited={}",
                s.path,
                s.format,
                s.dimensions,
                s.variables,
                s.attributes,
                s.unlimited_dimension.as_deref().unwrap_or("-"),
            ),
            FileReport::Failed { path, error } => format!("{path}: ERROR: {error}"),
        }
    }
}

/// Open `path` in `mode`, summarize it and close it again.
pub fn inspect<L: Library + ?Sized>(lib: &L, path: &Path, mode: AccessMode) -> FileReport {
    let result = match mode {
        AccessMode::Read => with_reading(lib, path, |ds| summarize(ds)),
        AccessMode::Write => with_writing(lib, path, |ds| summarize(ds)),
    };

    match result {
        Ok(summary) => FileReport::Summary(summary),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "inspection failed");
            FileReport::Failed {
                path: path.display().to_string(),
                error: e.to_string(),
            }
        }
    }
}

fn summarize<L: Library + ?Sized>(ds: &Dataset<'_, L>) -> Result<FileSummary, NcError> {
    let (dimensions, variables, attributes) = ds.counts()?;
    let unlimited_dimension = match ds.unlimited_dimension()? {
        Some(dimid) => Some(ds.dimension_name(dimid)?),
        None => None,
    };

    Ok(FileSummary {
        path: ds.path().display().to_string(),
        format: ds.format()?.to_string(),
        dimensions,
        variables,
        attributes,
        unlimited_dimension,
    })
}
