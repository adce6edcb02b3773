//! Command handlers for the course assistant CLI.

pub mod ask;
pub mod feedback;
pub mod ingest;
pub mod init_db;
pub mod recent;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use feedback::FeedbackCommand;
pub use ingest::IngestCommand;
pub use init_db::InitDbCommand;
pub use recent::RecentCommand;
pub use stats::StatsCommand;
