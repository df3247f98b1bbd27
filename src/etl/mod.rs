//! Core ETL (Extract, Transform, Load) abstractions
//!
//! A stream sync is an ETL run: pages are extracted from the Pingdom API,
//! records are conformed to the stream schema, and loaded as Singer messages.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::Transformer;
