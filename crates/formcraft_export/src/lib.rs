// Multi-format export of form entries, plus analytics and insight reports.

pub mod analytics;
pub mod context;
pub mod dispatcher;
pub mod encoders;
pub mod format;
pub mod insight;
pub mod normalize;
pub mod tabular;

pub use analytics::{FieldCompletionStat, FormAnalytics, Trend, aggregate};
pub use context::ExportContext;
pub use dispatcher::Exporter;
pub use format::{ExportFormat, ExportPayload, ExportResult};
pub use insight::{InsightKind, generate_insight_report};
pub use normalize::{normalize, normalize_entry};
