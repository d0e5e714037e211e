//! Data boundary: source traits, CSV ingest, synthetic generation.

pub mod ingest;
pub mod provider;
pub mod source;
pub mod synthetic;

pub use ingest::{load_csv_dir, load_csv_file, LoadError};
pub use provider::{CandleSource, DataError, NoReferenceData, ReferenceData};
pub use source::MemoryCandleSource;
pub use synthetic::{minute_series, SyntheticConfig};
