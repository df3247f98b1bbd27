//! Record transformation stage

use eyre::Result;

/// Turns one extracted item into one item ready to load
///
/// # Example
/// ```
/// use tap_pingdom::etl::Transformer;
/// use eyre::Result;
/// use serde_json::{Value, json};
///
/// /// Unix seconds to milliseconds
/// struct Millis(&'static str);
///
/// impl Transformer for Millis {
///     type Input = Value;
///     type Output = Value;
///
///     fn transform(&self, mut record: Value) -> Result<Value> {
///         if let Some(seconds) = record.get(self.0).and_then(Value::as_i64) {
///             record[self.0] = json!(seconds * 1000);
///         }
///         Ok(record)
///     }
/// }
///
/// let records = Millis("time").transform_many(vec![json!({"time": 2})]).unwrap();
/// assert_eq!(records, vec![json!({"time": 2000})]);
/// ```
pub trait Transformer: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// Transform one item
    ///
    /// # Errors
    /// Returns an error if the item cannot be transformed
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform a batch in order, stopping at the first failure
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}
