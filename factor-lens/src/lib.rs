/// Factor Lens - Core Analytics
///
/// This library turns dated, multi-column factor time-series into three
/// analytical views:
/// - a pairwise Pearson correlation matrix between factors
/// - cumulative-return series normalized against a reference asset
/// - a run-length partition of the timeline into contiguous market regimes
///
/// The library includes:
/// - The canonical `Table` model and its time-window filters
/// - The correlation engine and return normalizers
/// - Regime series types, the segmenter, and the rebuild session state machine
/// - Boundary traits for the data-acquisition and model-rebuild collaborators
pub mod analytics;
pub mod config;
pub mod error;
pub mod regime;
pub mod source;
pub mod table;

// Re-export commonly used types for convenience
pub use analytics::correlation::{CorrelationMatrix, correlate};
pub use analytics::returns::{cumulative_returns, normalize_to_first};

pub use config::LensConfig;
pub use error::LensError;

pub use regime::segment::segment;
pub use regime::session::{RegimeSession, SessionSnapshot, SetKAction};
pub use regime::{LabelMode, RegimePoint, RegimeSegment, RegimeSeries};

pub use source::{FactorSource, RegimeSource};

pub use table::filter::Timeframe;
pub use table::Table;
