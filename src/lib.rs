// Poker Bankroll - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod analytics;
pub mod config;
pub mod entities;
pub mod error;
pub mod interchange;
pub mod report;
pub mod store;
pub mod validation;
pub mod wellness;

// Re-export commonly used types
pub use analytics::{
    bankroll_balance, bankroll_series, stats_by, BalancePoint, Dimension, GroupRow, GroupStats,
    SessionFilter, Summary,
};
pub use config::{BackendKind, Config, ServerConfig};
pub use entities::{
    Bankroll, GameType, Location, LocationImage, Session, TournamentDetails, TournamentSize,
    TournamentSpeed, Transaction, TransactionKind,
};
pub use error::{ConfigError, ExportError, ImportError, StoreError};
pub use interchange::{
    detect_format, export_sessions, export_to_path, import_from_path, import_sessions, CsvFormat,
    NativeImporter, SessionImporter, ThirdPartyImporter,
};
pub use store::{DataStore, Document, JsonDirectory, MergeOutcome, SnapshotBackend, SqliteBackend};
pub use validation::{BatchSummary, DataQualityEngine, QualityIssue, QualityReport, Severity};
pub use wellness::{MindfulnessRecord, SleepRecord, WellnessReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
