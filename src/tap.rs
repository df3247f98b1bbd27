//! The tap: discovery and the sync loop
//!
//! Streams run one after another in registry order. A parent stream is
//! extracted once; each of its records then drives one run (partition) of
//! every selected child stream. Authentication failures end the run, any
//! other failure only ends the stream it happened in.

use crate::client::{Auth, PingdomClient};
use crate::config::TapConfig;
use crate::error::is_fatal;
use crate::etl::{Extractor, Loader, Pipeline, Transformer};
use crate::singer::{Catalog, RecordLoader, SingerWriter, State};
use crate::streams::{Context, Stream, StreamExtractor, all_streams};
use crate::transform::{RecordTransformer, SchemaConformer};

use eyre::{Context as _, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;

/// Outcome of a sync run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    /// Records written, per stream
    pub records: BTreeMap<String, usize>,
    /// Streams that stopped on an error
    pub failed: Vec<String>,
}

impl SyncSummary {
    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn add(&mut self, stream: &str, count: usize) {
        *self.records.entry(stream.to_string()).or_default() += count;
    }

    fn fail(&mut self, stream: &str) {
        if !self.failed.iter().any(|s| s == stream) {
            self.failed.push(stream.to_string());
        }
    }
}

pub struct Tap {
    client: PingdomClient,
    config: TapConfig,
    streams: Vec<Box<dyn Stream>>,
    catalog: Catalog,
    state: State,
}

impl Tap {
    /// Build a tap with the default catalog and empty state.
    pub fn new(config: TapConfig) -> Result<Self> {
        let auth = Auth::new(Some(config.token.clone()));
        let client = PingdomClient::try_new(config.api_url.clone(), auth, &config.user_agent)
            .context("Failed to create Pingdom client")?;
        log::debug!("Pingdom API at {}", client.url());
        let streams = all_streams();
        let catalog = discover_streams(&streams)?;

        Ok(Self {
            client,
            config,
            streams,
            catalog,
            state: State::new(),
        })
    }

    /// Use an input catalog for stream and property selection.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        for entry in &catalog.streams {
            if !self.streams.iter().any(|s| s.name() == entry.tap_stream_id) {
                log::warn!("Ignoring unknown stream '{}' in catalog", entry.tap_stream_id);
            }
        }
        self.catalog = catalog;
        self
    }

    /// Resume from an input state.
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Catalog describing every stream the tap offers.
    pub fn discover(&self) -> Result<Catalog> {
        discover_streams(&self.streams)
    }

    /// Sync every selected stream, writing Singer messages to `writer`.
    ///
    /// # Errors
    /// Returns an error right away on an authentication failure. Other stream
    /// failures are logged and listed in the summary.
    pub async fn sync<W: Write + Send>(&mut self, writer: &SingerWriter<W>) -> Result<SyncSummary> {
        let mut run = SyncRun {
            client: &self.client,
            catalog: &self.catalog,
            start_timestamp: self.config.start_timestamp(),
            state: &mut self.state,
            writer,
            summary: SyncSummary::default(),
        };

        for stream in self.streams.iter().filter(|s| s.parent().is_none()) {
            let children: Vec<&dyn Stream> = self
                .streams
                .iter()
                .filter(|c| c.parent() == Some(stream.name()))
                .filter(|c| run.catalog.is_selected(c.name()))
                .map(|c| c.as_ref())
                .collect();

            if !run.catalog.is_selected(stream.name()) && children.is_empty() {
                log::debug!("Skipping unselected stream {}", stream.name());
                continue;
            }

            if let Err(e) = run.sync_stream(stream.as_ref(), &children).await {
                if is_fatal(&e) {
                    return Err(e);
                }
                log::error!("Stream {} failed: {:?}", stream.name().red(), e);
                if run.catalog.is_selected(stream.name()) {
                    run.summary.fail(stream.name());
                }
                // children never get a run when their parent fails
                for child in &children {
                    run.summary.fail(child.name());
                }
            }
        }

        let summary = run.summary;
        log::info!(
            "✓ Synced {} record(s) across {} stream(s)",
            summary.total_records(),
            summary.records.len()
        );
        Ok(summary)
    }
}

fn discover_streams(streams: &[Box<dyn Stream>]) -> Result<Catalog> {
    let streams = streams
        .iter()
        .map(|s| s.catalog_entry())
        .collect::<Result<Vec<_>>>()?;
    Ok(Catalog { streams })
}

/// Mutable bookkeeping of one `sync` call.
struct SyncRun<'a, W: Write + Send> {
    client: &'a PingdomClient,
    catalog: &'a Catalog,
    start_timestamp: Option<i64>,
    state: &'a mut State,
    writer: &'a SingerWriter<W>,
    summary: SyncSummary,
}

impl<W: Write + Send> SyncRun<'_, W> {
    /// Bookmark if there is one, else the configured start date.
    fn starting_timestamp(&self, stream: &dyn Stream, context: Option<&Context>) -> Option<i64> {
        match stream.replication_key() {
            Some(_) => self
                .state
                .bookmark_timestamp(stream.name(), context)
                .or(self.start_timestamp),
            None => self.start_timestamp,
        }
    }

    /// Emit SCHEMA for a stream and build the conformer for its records.
    fn announce(&self, stream: &dyn Stream) -> Result<SchemaConformer> {
        let deselected = self
            .catalog
            .get(stream.name())
            .map(|entry| entry.deselected_properties())
            .unwrap_or_default();
        let schema = without_properties(stream.schema()?, &deselected);

        self.writer.write_schema(
            stream.name(),
            &schema,
            stream.primary_keys(),
            stream.replication_key(),
        )?;
        Ok(SchemaConformer::new(stream.name(), &schema))
    }

    fn advance_bookmark(
        &mut self,
        stream: &dyn Stream,
        context: Option<&Context>,
        max_value: Option<Value>,
    ) -> Result<()> {
        if let (Some(key), Some(value)) = (stream.replication_key(), max_value) {
            self.state.advance(stream.name(), context, key, &value);
        }
        self.writer.write_state(self.state)
    }

    async fn sync_stream(&mut self, stream: &dyn Stream, children: &[&dyn Stream]) -> Result<()> {
        let selected = self.catalog.is_selected(stream.name());
        log::info!("Syncing {}", stream.name().cyan());

        let conformer = match selected {
            true => Some(self.announce(stream)?),
            false => None,
        };
        let starting_timestamp = self.starting_timestamp(stream, None);
        let extractor = StreamExtractor::new(self.client, stream, None, starting_timestamp);

        let contexts = match (&conformer, children.is_empty()) {
            (Some(conformer), true) => {
                let pipeline = Pipeline::new(
                    extractor,
                    RecordTransformer::new(stream, None, conformer),
                    RecordLoader::new(self.writer, stream.name(), stream.replication_key()),
                );
                let count = pipeline.run().await?;
                let max_value = pipeline.loader().max_replication_value();
                self.summary.add(stream.name(), count);
                self.advance_bookmark(stream, None, max_value)?;
                return Ok(());
            }
            (Some(conformer), false) => {
                let records = extractor.extract().await?;
                let contexts = child_contexts(stream, &records);

                let transformer = RecordTransformer::new(stream, None, conformer);
                let loader = RecordLoader::new(self.writer, stream.name(), stream.replication_key());
                let count = loader.load(transformer.transform_many(records)?).await?;
                let max_value = loader.max_replication_value();
                self.summary.add(stream.name(), count);
                self.advance_bookmark(stream, None, max_value)?;
                contexts
            }
            (None, _) => {
                log::info!(
                    "{} is not selected; fetching it only for its child streams",
                    stream.name()
                );
                let records = extractor.extract().await?;
                child_contexts(stream, &records)
            }
        };

        for child in children {
            if let Err(e) = self.sync_child(*child, &contexts).await {
                if is_fatal(&e) {
                    return Err(e);
                }
                log::error!("Stream {} failed: {:?}", child.name().red(), e);
                self.summary.fail(child.name());
            }
        }

        Ok(())
    }

    /// Run a child stream once per parent context.
    async fn sync_child(&mut self, child: &dyn Stream, contexts: &[Context]) -> Result<()> {
        log::info!(
            "Syncing {} for {} parent record(s)",
            child.name().cyan(),
            contexts.len()
        );
        let conformer = self.announce(child)?;
        self.summary.add(child.name(), 0);

        for context in contexts {
            let starting_timestamp = self.starting_timestamp(child, Some(context));
            let pipeline = Pipeline::new(
                StreamExtractor::new(self.client, child, Some(context), starting_timestamp),
                RecordTransformer::new(child, Some(context), &conformer),
                RecordLoader::new(self.writer, child.name(), child.replication_key()),
            );
            let count = pipeline.run().await?;
            let max_value = pipeline.loader().max_replication_value();
            self.summary.add(child.name(), count);
            self.advance_bookmark(child, Some(context), max_value)?;
        }

        Ok(())
    }
}

fn child_contexts(stream: &dyn Stream, records: &[Value]) -> Vec<Context> {
    records
        .iter()
        .filter_map(|record| stream.child_context(record))
        .collect()
}

/// Remove properties from an object schema, including from its `required` list.
fn without_properties(mut schema: Value, properties: &HashSet<String>) -> Value {
    if properties.is_empty() {
        return schema;
    }
    if let Some(declared) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        declared.retain(|name, _| !properties.contains(name));
    }
    if let Some(required) = schema.get_mut("required").and_then(Value::as_array_mut) {
        required.retain(|name| name.as_str().is_none_or(|n| !properties.contains(n)));
    }
    schema
}
