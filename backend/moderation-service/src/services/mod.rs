pub mod access_gate;
pub mod classifier;
pub mod moderation;

mod alumni_service;
mod ban_service;
mod content_service;
mod decision_service;
mod queue_service;
mod report_service;

pub use access_gate::{AccessPolicy, AllowList, EnvAllowList};
pub use alumni_service::*;
pub use ban_service::*;
pub use classifier::{PerspectiveClassifier, ToxicityCategory, ToxicityClassifier, ToxicityScores};
pub use content_service::*;
pub use decision_service::*;
pub use moderation::{ModerationOutcome, ModerationPipeline, TOXICITY_THRESHOLD};
pub use queue_service::*;
pub use report_service::*;
