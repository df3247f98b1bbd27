//! tap-pingdom
//!
//! A Singer tap for the Pingdom API, built on small ETL stages

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod pagination;
pub mod schema;
pub mod singer;
pub mod streams;
pub mod tap;
pub mod transform;

// Re-exports for convenience
pub use client::{Auth, PingdomClient};
pub use config::{ConfigSource, TapConfig};
pub use error::{TapError, is_fatal};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use pagination::{OffsetPaginator, RecordsPath};
pub use singer::{Catalog, Message, SingerWriter, State};
pub use streams::{Stream, StreamExtractor, all_streams};
pub use tap::{SyncSummary, Tap};
