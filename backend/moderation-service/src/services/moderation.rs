use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::classifier::{ClassifierError, ToxicityClassifier, ToxicityScores};
use crate::models::ContentStatus;

/// Any category strictly above this severity holds content for review.
pub const TOXICITY_THRESHOLD: f64 = 0.7;

pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(5);

/// `true` iff some category scores strictly above `threshold`.
pub fn should_flag(scores: &ToxicityScores, threshold: f64) -> bool {
    !scores.exceeding(threshold).is_empty()
}

/// Result of scoring freshly submitted text.
///
/// `Unavailable` is a normal outcome: the classifier could not be reached or
/// answered with something unusable, and the content is published without
/// holding it for review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModerationOutcome {
    Flagged {
        scores: ToxicityScores,
        reason: String,
    },
    Clear {
        scores: ToxicityScores,
    },
    Unavailable,
}

impl ModerationOutcome {
    pub fn is_available(&self) -> bool {
        !matches!(self, ModerationOutcome::Unavailable)
    }

    pub fn should_flag(&self) -> bool {
        matches!(self, ModerationOutcome::Flagged { .. })
    }

    pub fn scores(&self) -> Option<&ToxicityScores> {
        match self {
            ModerationOutcome::Flagged { scores, .. } | ModerationOutcome::Clear { scores } => {
                Some(scores)
            }
            ModerationOutcome::Unavailable => None,
        }
    }

    pub fn flagged_reason(&self) -> Option<&str> {
        match self {
            ModerationOutcome::Flagged { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Status new content is stored with.
    pub fn initial_status(&self) -> ContentStatus {
        if self.should_flag() {
            ContentStatus::Flagged
        } else {
            ContentStatus::Published
        }
    }
}

/// Scores content through the external classifier, failing open.
#[derive(Clone)]
pub struct ModerationPipeline {
    classifier: Arc<dyn ToxicityClassifier>,
    threshold: f64,
    timeout: Duration,
}

impl ModerationPipeline {
    pub fn new(classifier: Arc<dyn ToxicityClassifier>, threshold: f64, timeout: Duration) -> Self {
        Self {
            classifier,
            threshold,
            timeout,
        }
    }

    pub fn with_defaults(classifier: Arc<dyn ToxicityClassifier>) -> Self {
        Self::new(classifier, TOXICITY_THRESHOLD, DEFAULT_CLASSIFIER_TIMEOUT)
    }

    pub async fn score(&self, text: &str) -> ModerationOutcome {
        let result = match tokio::time::timeout(self.timeout, self.classifier.classify(text)).await
        {
            Ok(result) => result,
            Err(_) => Err(ClassifierError::Timeout(self.timeout)),
        };

        match result {
            Ok(scores) => self.evaluate(scores),
            Err(e) => {
                tracing::warn!(error = %e, "Toxicity classifier unavailable, publishing without review");
                ModerationOutcome::Unavailable
            }
        }
    }

    pub fn evaluate(&self, scores: ToxicityScores) -> ModerationOutcome {
        if !should_flag(&scores, self.threshold) {
            return ModerationOutcome::Clear { scores };
        }

        // Half-percent ties round up.
        let categories = scores
            .exceeding(self.threshold)
            .iter()
            .map(|(category, score)| {
                format!("{} ({}%)", category, (score * 100.0).round() as i64)
            })
            .collect::<Vec<_>>()
            .join(", ");

        tracing::debug!(categories = %categories, "Content exceeds toxicity threshold");

        ModerationOutcome::Flagged {
            scores,
            reason: format!("Flagged for: {}", categories),
        }
    }
}
