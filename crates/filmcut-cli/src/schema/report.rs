use chrono::{DateTime, Utc};
use filmcut_analysis::{pivot::ScoreRow, scoring::CategoryOutcome};
use serde::{Deserialize, Serialize};

/// Output of the `analyze-modifications` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Timestamp when the report was generated (ISO 8601 format)
    pub generated_at: DateTime<Utc>,
    /// How each modification category was modeled, in category order
    pub categories: Vec<CategoryOutcome>,
    /// Pivoted scores sorted by id, language and model kind
    pub scores: Vec<ScoreRow>,
}
