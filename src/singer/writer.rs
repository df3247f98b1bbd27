//! Singer message output
//!
//! Messages are written as one JSON object per line. Logs go to stderr, so
//! stdout carries nothing but these lines.

use super::{Message, State};
use crate::etl::Loader;

use chrono::Utc;
use eyre::{Result, eyre};
use serde_json::Value;
use std::io::Write;
use std::sync::Mutex;

/// Writes Singer messages to an output.
pub struct SingerWriter<W: Write + Send> {
    out: Mutex<W>,
}

impl SingerWriter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> SingerWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Write one message and flush.
    pub fn write_message(&self, message: &Message) -> Result<()> {
        let line = serde_json::to_string(message)?;
        if let Some(stream) = message.stream() {
            log::trace!("Writing {} message", stream);
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| eyre!("Singer output lock poisoned"))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    pub fn write_schema(
        &self,
        stream: &str,
        schema: &Value,
        key_properties: &[&str],
        replication_key: Option<&str>,
    ) -> Result<()> {
        self.write_message(&Message::Schema {
            stream: stream.to_string(),
            schema: schema.clone(),
            key_properties: key_properties.iter().map(|k| k.to_string()).collect(),
            bookmark_properties: replication_key.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn write_state(&self, state: &State) -> Result<()> {
        self.write_message(&Message::State {
            value: state.to_value(),
        })
    }

    /// Consume the writer and return the underlying output.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|_| eyre!("Singer output lock poisoned"))
    }
}

/// Loads records of one stream as `RECORD` messages.
///
/// Also tracks the largest replication-key value it has written, so the caller
/// can move the bookmark once the load has finished.
pub struct RecordLoader<'w, W: Write + Send> {
    writer: &'w SingerWriter<W>,
    stream: String,
    replication_key: Option<String>,
    max_replication_value: Mutex<Option<Value>>,
}

impl<'w, W: Write + Send> RecordLoader<'w, W> {
    pub fn new(writer: &'w SingerWriter<W>, stream: &str, replication_key: Option<&str>) -> Self {
        Self {
            writer,
            stream: stream.to_string(),
            replication_key: replication_key.map(str::to_string),
            max_replication_value: Mutex::new(None),
        }
    }

    /// Largest replication-key value written so far.
    pub fn max_replication_value(&self) -> Option<Value> {
        self.max_replication_value
            .lock()
            .ok()
            .and_then(|max| max.clone())
    }

    fn track(&self, record: &Value) -> Result<()> {
        let Some(key) = &self.replication_key else {
            return Ok(());
        };
        let Some(value) = record.get(key).filter(|v| !v.is_null()) else {
            return Ok(());
        };

        let mut max = self
            .max_replication_value
            .lock()
            .map_err(|_| eyre!("Replication value lock poisoned"))?;
        let greater = match (max.as_ref(), value) {
            (None, _) => true,
            (Some(Value::Number(current)), Value::Number(candidate)) => {
                candidate.as_f64() > current.as_f64()
            }
            (Some(Value::String(current)), Value::String(candidate)) => candidate > current,
            _ => false,
        };
        if greater {
            *max = Some(value.clone());
        }
        Ok(())
    }
}

impl<W: Write + Send> Loader for RecordLoader<'_, W> {
    type Item = Value;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let time_extracted = Utc::now();
        let count = items.len();
        for record in items {
            self.track(&record)?;
            self.writer.write_message(&Message::Record {
                stream: self.stream.clone(),
                record,
                time_extracted: Some(time_extracted),
            })?;
        }
        Ok(count)
    }
}
