use serde::Deserialize;

use crate::services::DecisionPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub access: AccessConfig,
    pub classifier: ClassifierConfig,
    pub moderation: ModerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, or `memory:` for the in-process store.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// Comma separated admin email addresses.
    #[serde(default)]
    pub admin_emails: String,
    /// Comma separated email domains allowed onto the platform.
    #[serde(default)]
    pub allowed_domains: String,
    /// Re-read `ADMIN_EMAILS` / `ALLOWED_DOMAINS` from the environment on every check.
    #[serde(default = "default_reload_from_env")]
    pub reload_from_env: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_languages")]
    pub languages: String,
}

impl ClassifierConfig {
    pub fn language_list(&self) -> Vec<String> {
        self.languages
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    #[serde(default)]
    pub decision_policy: DecisionPolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_reload_from_env() -> bool {
    true
}

fn default_classifier_endpoint() -> String {
    "https://commentanalyzer.googleapis.com/v1alpha1/comments:analyze".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_threshold() -> f64 {
    crate::services::TOXICITY_THRESHOLD
}

fn default_languages() -> String {
    "en,hi".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "postgres://localhost/campus")?
            .set_default("database.max_connections", 10)?
            .set_default("jwt.secret", "development-secret-change-in-production")?
            .set_default("access.admin_emails", "")?
            .set_default("access.allowed_domains", "")?
            .set_default("access.reload_from_env", true)?
            .set_default("classifier.endpoint", default_classifier_endpoint())?
            .set_default("classifier.timeout_ms", 5000)?
            .set_default("classifier.threshold", crate::services::TOXICITY_THRESHOLD)?
            .set_default("classifier.languages", "en,hi")?
            .set_default("moderation.decision_policy", "override")?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_list_skips_blanks() {
        let config = ClassifierConfig {
            endpoint: default_classifier_endpoint(),
            api_key: None,
            timeout_ms: default_timeout_ms(),
            threshold: default_threshold(),
            languages: " en, ,hi ".to_string(),
        };
        assert_eq!(config.language_list(), vec!["en", "hi"]);
    }

    #[test]
    fn test_memory_url_selects_memory_store() {
        let db = DatabaseConfig {
            url: "memory:".to_string(),
            max_connections: default_max_connections(),
        };
        assert!(db.is_memory());

        let db = DatabaseConfig {
            url: "postgres://localhost/campus".to_string(),
            max_connections: default_max_connections(),
        };
        assert!(!db.is_memory());
    }
}
