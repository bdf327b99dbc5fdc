use thiserror::Error;

/// Everything that can go wrong between ingesting the input tables and
/// producing a result file. Input problems and the exhausted-pool condition
/// are distinct variants so the caller can show a specific remediation
/// message instead of a generic failure.
#[derive(Debug, Error)]
pub enum SantaError {
    /// The roster is unusable: fewer than two employees, duplicate names,
    /// blank name/email fields, or a roster file missing a required column.
    #[error("invalid roster: {reason}")]
    InvalidRoster { reason: String },

    /// The prior-results table is structurally unusable (missing a required
    /// column). Rows that merely reference departed employees are not an
    /// error; they stay in the forbidden set as inert entries.
    #[error("invalid prior assignments: {reason}")]
    InvalidPriorPairs { reason: String },

    /// The candidate pool ran out of valid receivers for a giver. This is a
    /// structural property of the inputs; retrying with the same roster and
    /// history will fail again.
    #[error("no valid receiver left for {giver}; remaining candidates: {remaining:?}")]
    AssignmentUnsatisfiable { giver: String, remaining: Vec<String> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SantaError {
    /// Stable discriminant used in structured API error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            SantaError::InvalidRoster { .. } => "invalid_roster",
            SantaError::InvalidPriorPairs { .. } => "invalid_prior_pairs",
            SantaError::AssignmentUnsatisfiable { .. } => "assignment_unsatisfiable",
            SantaError::Csv(_) => "csv",
            SantaError::Io(_) => "io",
        }
    }
}
