//! Record extraction stage

use eyre::Result;
use std::future::Future;

/// Pulls every item of one source into memory
///
/// # Example
/// ```no_run
/// use tap_pingdom::etl::Extractor;
/// use eyre::Result;
/// use serde_json::Value;
///
/// /// Records captured from an earlier run
/// struct Replay(Vec<Value>);
///
/// impl Extractor for Replay {
///     type Item = Value;
///
///     async fn extract(&self) -> Result<Vec<Value>> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    type Item: Send;

    /// Extract all items
    ///
    /// # Errors
    /// Returns an error on transport failures, error statuses or undecodable bodies
    fn extract(&self) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}
