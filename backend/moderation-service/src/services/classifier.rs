//! External toxicity classifier client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::config::ClassifierConfig;

/// Attributes requested from the classifier. All of them support both
/// English and Hindi, which the platform's users write in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToxicityCategory {
    Toxicity,
    SevereToxicity,
    IdentityAttack,
    Insult,
    Profanity,
    Threat,
}

impl ToxicityCategory {
    pub const ALL: [ToxicityCategory; 6] = [
        ToxicityCategory::Toxicity,
        ToxicityCategory::SevereToxicity,
        ToxicityCategory::IdentityAttack,
        ToxicityCategory::Insult,
        ToxicityCategory::Profanity,
        ToxicityCategory::Threat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToxicityCategory::Toxicity => "TOXICITY",
            ToxicityCategory::SevereToxicity => "SEVERE_TOXICITY",
            ToxicityCategory::IdentityAttack => "IDENTITY_ATTACK",
            ToxicityCategory::Insult => "INSULT",
            ToxicityCategory::Profanity => "PROFANITY",
            ToxicityCategory::Threat => "THREAT",
        }
    }
}

impl fmt::Display for ToxicityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToxicityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToxicityCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown toxicity category: {}", s))
    }
}

/// Per-category severity in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToxicityScores(BTreeMap<ToxicityCategory, f64>);

impl ToxicityScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: ToxicityCategory, score: f64) {
        self.0.insert(category, score);
    }

    pub fn get(&self, category: ToxicityCategory) -> Option<f64> {
        self.0.get(&category).copied()
    }

    /// Categories scoring strictly above `threshold`, in category order.
    pub fn exceeding(&self, threshold: f64) -> Vec<(ToxicityCategory, f64)> {
        self.0
            .iter()
            .filter(|(_, score)| **score > threshold)
            .map(|(category, score)| (*category, *score))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }
}

impl FromIterator<(ToxicityCategory, f64)> for ToxicityScores {
    fn from_iter<I: IntoIterator<Item = (ToxicityCategory, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier API key not configured")]
    NotConfigured,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Classifier returned status {0}")]
    Status(u16),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToxicityClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ToxicityScores, ClassifierError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    comment: AnalyzeComment<'a>,
    requested_attributes: BTreeMap<&'static str, serde_json::Value>,
    languages: &'a [String],
}

#[derive(Serialize)]
struct AnalyzeComment<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    attribute_scores: HashMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}

/// Google Perspective `comments:analyze` client.
pub struct PerspectiveClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    languages: Vec<String>,
}

impl PerspectiveClassifier {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, languages: Vec<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            languages,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.language_list(),
        )
    }

    fn parse_scores(response: AnalyzeResponse) -> Result<ToxicityScores, ClassifierError> {
        let mut scores = ToxicityScores::new();

        for (attribute, score) in response.attribute_scores {
            let Ok(category) = attribute.parse::<ToxicityCategory>() else {
                tracing::debug!(attribute = %attribute, "Ignoring unrequested attribute");
                continue;
            };

            let value = score.summary_score.value;
            if !(0.0..=1.0).contains(&value) {
                return Err(ClassifierError::InvalidResponse(format!(
                    "{} score {} outside [0, 1]",
                    attribute, value
                )));
            }

            scores.insert(category, value);
        }

        Ok(scores)
    }
}

#[async_trait]
impl ToxicityClassifier for PerspectiveClassifier {
    async fn classify(&self, text: &str) -> Result<ToxicityScores, ClassifierError> {
        let api_key = self.api_key.as_deref().ok_or(ClassifierError::NotConfigured)?;

        let request = AnalyzeRequest {
            comment: AnalyzeComment { text },
            requested_attributes: ToxicityCategory::ALL
                .iter()
                .map(|c| (c.as_str(), json!({})))
                .collect(),
            languages: &self.languages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Classifier API error");
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let body: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        Self::parse_scores(body)
    }
}
