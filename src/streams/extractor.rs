//! Paged extraction of one stream

use super::{Context, Stream, render_path};
use crate::client::PingdomClient;
use crate::etl::Extractor;
use crate::pagination::{OffsetPaginator, RecordsPath};

use eyre::{Context as _, Result};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Extracts every page of one stream, or of one partition of a child stream.
///
/// # Example
/// ```no_run
/// use tap_pingdom::client::{Auth, PingdomClient, DEFAULT_API_URL};
/// use tap_pingdom::etl::Extractor;
/// use tap_pingdom::streams::{Actions, StreamExtractor};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse(DEFAULT_API_URL)?;
/// let client = PingdomClient::try_new(url, Auth::Bearer("token".into()), "tap-pingdom")?;
/// let extractor = StreamExtractor::new(&client, &Actions, None, Some(1_700_000_000));
/// let alerts = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct StreamExtractor<'a> {
    client: &'a PingdomClient,
    stream: &'a dyn Stream,
    context: Option<&'a Context>,
    starting_timestamp: Option<i64>,
}

impl<'a> StreamExtractor<'a> {
    pub fn new(
        client: &'a PingdomClient,
        stream: &'a dyn Stream,
        context: Option<&'a Context>,
        starting_timestamp: Option<i64>,
    ) -> Self {
        Self {
            client,
            stream,
            context,
            starting_timestamp,
        }
    }

    /// Fetch pages until one comes back short.
    async fn fetch_pages(&self) -> Result<Vec<Value>> {
        let path = render_path(self.stream.path(), self.context)?;
        let records_path = RecordsPath::parse(self.stream.records_path())?;
        let extra_params = self.stream.url_params(self.starting_timestamp);

        let mut paginator = OffsetPaginator::new(0, self.stream.page_size());
        let mut records = Vec::new();

        while !paginator.is_finished() {
            let mut query: Vec<(String, String)> = paginator.params().into();
            query.extend(extra_params.iter().cloned());

            log::debug!(
                "Fetching {} offset {} limit {}",
                path.bright_black(),
                paginator.offset(),
                paginator.page_size()
            );

            let body = self.client.get_json(&path, &query).await.with_context(|| {
                format!(
                    "Failed to fetch {} page at offset {}",
                    self.stream.name(),
                    paginator.offset()
                )
            })?;

            let page = records_path.extract(&body);
            paginator.advance(page.len());
            records.extend(page);
        }

        Ok(records)
    }
}

impl Extractor for StreamExtractor<'_> {
    type Item = Value;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let records = self.fetch_pages().await?;

        log::info!(
            "Extracted {} {} record(s){}",
            records.len(),
            self.stream.name().cyan(),
            match self.context {
                Some(context) => format!(" for {}", Value::Object(context.clone())),
                None => String::new(),
            }
        );

        Ok(records)
    }
}
