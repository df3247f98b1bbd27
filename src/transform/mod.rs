//! Record transformers
//!
//! Records pass through the stream's own post-processing (e.g. copying the
//! parent `checkid` into results) and are then conformed to the schema that
//! was announced for the stream.

mod conformer;
mod record;

pub use conformer::SchemaConformer;
pub use record::RecordTransformer;
