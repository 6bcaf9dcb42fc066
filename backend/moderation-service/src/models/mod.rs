pub mod content;
pub mod report;
pub mod user;

pub use content::{
    ContentItem, ContentKind, ContentStatus, FlaggedContent, NewContent, Resource,
};
pub use report::{
    ChatReport, ChatReportEntry, FlaggedResource, NewChatReport, ResourceFlag,
    ResourceFlagEntry, REPORT_STATUS_PENDING, RESOURCE_FLAG_REASON,
};
pub use user::{
    ApprovalStatus, BanOutcome, PendingAlumnus, PlatformStatistics, PublicProfile, ReportParty,
    UserRecord, ALUMNI_ROLE,
};
