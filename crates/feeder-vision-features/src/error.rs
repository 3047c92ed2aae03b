use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of feature a caller required.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Fiducial,
    Pocket,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Fiducial => f.write_str("fiducial"),
            FeatureKind::Pocket => f.write_str("pocket"),
        }
    }
}

/// Errors returned by feature classification and row fitting.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("no {kind} features found")]
    NoFeaturesFound { kind: FeatureKind },
    #[error("no reliable feature row found (best support {best_support}, need {required})")]
    NoSupport { best_support: usize, required: usize },
    #[error("vision pipeline returned {found}, expected rotated_rects")]
    UnrecognizedResultType { found: &'static str },
}
