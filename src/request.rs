use crate::data::export::{ExportArtifact, build_artifact};
use crate::data::model::Dataset;
use crate::data::selection::{SelectionError, parse_selection, project, validate};

// ---------------------------------------------------------------------------
// Request handling: raw text + Apply → outcome
// ---------------------------------------------------------------------------

pub const EMPTY_SELECTION_MESSAGE: &str = "Please enter at least one column name.";
pub const SUCCESS_MESSAGE: &str = "Subset generated successfully!";

/// Result of one Apply interaction.
#[derive(Debug)]
pub enum Outcome {
    /// Apply was not pressed; nothing to show.
    Idle,
    Warning(String),
    Error(String),
    Success {
        view: Dataset,
        artifact: ExportArtifact,
    },
}

#[cfg(test)]
impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Run the column subsetter for one submission.
///
/// Every failure is turned into a displayable [`Outcome`]; nothing escapes
/// as an error.
pub fn handle_request(dataset: &Dataset, raw_text: &str, apply_triggered: bool) -> Outcome {
    if !apply_triggered {
        return Outcome::Idle;
    }

    let requested = parse_selection(raw_text);
    let validated = match validate(requested, &dataset.column_names()) {
        Ok(v) => v,
        Err(SelectionError::EmptySelection) => {
            log::debug!("Apply with empty selection");
            return Outcome::Warning(EMPTY_SELECTION_MESSAGE.to_string());
        }
        Err(e @ SelectionError::InvalidColumns(_)) => {
            log::debug!("Rejected selection: {e}");
            return Outcome::Error(e.to_string());
        }
    };

    let view = project(dataset, &validated);
    match build_artifact(&view) {
        Ok(artifact) => {
            log::debug!(
                "Subset of {} columns, {} rows, {} CSV bytes",
                validated.len(),
                view.n_rows(),
                artifact.bytes().len()
            );
            Outcome::Success { view, artifact }
        }
        Err(e) => {
            log::error!("CSV export failed: {e:#}");
            Outcome::Error(format!("Export failed: {e:#}"))
        }
    }
}
