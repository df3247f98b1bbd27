//! Per-stream record transformer

use super::SchemaConformer;
use crate::etl::Transformer;
use crate::streams::{Context, Stream};
use eyre::Result;
use serde_json::Value;

/// Applies a stream's post-processing, then schema conformance.
pub struct RecordTransformer<'a> {
    stream: &'a dyn Stream,
    context: Option<&'a Context>,
    conformer: &'a SchemaConformer,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(
        stream: &'a dyn Stream,
        context: Option<&'a Context>,
        conformer: &'a SchemaConformer,
    ) -> Self {
        Self {
            stream,
            context,
            conformer,
        }
    }
}

impl Transformer for RecordTransformer<'_> {
    type Input = Value;
    type Output = Value;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let processed = self.stream.post_process(input, self.context);
        self.conformer.transform(processed)
    }
}
