//! Singer protocol plumbing
//!
//! Messages written to stdout, the discovery catalog, and bookmark state.

mod catalog;
mod message;
mod state;
mod writer;

pub use catalog::{Catalog, CatalogEntry, MetadataEntry, ReplicationMethod};
pub use message::Message;
pub use state::{PartitionBookmark, State, StreamBookmark};
pub use writer::{RecordLoader, SingerWriter};
