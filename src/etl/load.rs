//! Record loading stage

use eyre::Result;
use std::future::Future;

/// Writes a batch of items to a destination
///
/// # Example
/// ```no_run
/// use tap_pingdom::etl::Loader;
/// use eyre::Result;
/// use serde_json::Value;
///
/// /// Prints records to stderr
/// struct Eprint;
///
/// impl Loader for Eprint {
///     type Item = Value;
///
///     async fn load(&self, records: Vec<Value>) -> Result<usize> {
///         records.iter().for_each(|r| eprintln!("{}", r));
///         Ok(records.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    type Item: Send;

    /// Load the items, returning how many were written
    ///
    /// # Errors
    /// Returns an error if writing fails
    fn load(&self, items: Vec<Self::Item>) -> impl Future<Output = Result<usize>> + Send;
}
