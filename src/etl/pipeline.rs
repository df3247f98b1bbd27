//! Extract → transform → load for one run of a stream

use super::{Extractor, Loader, Transformer};
use eyre::{Context, Result};

/// Wires an extractor, a transformer and a loader together
///
/// The tap builds one per stream run: a `StreamExtractor` reading pages, a
/// `RecordTransformer` conforming records, and a `RecordLoader` writing them.
///
/// # Example
/// ```no_run
/// use tap_pingdom::client::{Auth, PingdomClient, DEFAULT_API_URL};
/// use tap_pingdom::etl::Pipeline;
/// use tap_pingdom::singer::{RecordLoader, SingerWriter};
/// use tap_pingdom::streams::{Contacts, Stream, StreamExtractor};
/// use tap_pingdom::transform::{RecordTransformer, SchemaConformer};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = PingdomClient::try_new(
///     Url::parse(DEFAULT_API_URL)?,
///     Auth::Bearer("token".into()),
///     "tap-pingdom",
/// )?;
/// let writer = SingerWriter::stdout();
/// let conformer = SchemaConformer::new("contacts", &Contacts.schema()?);
///
/// let pipeline = Pipeline::new(
///     StreamExtractor::new(&client, &Contacts, None, None),
///     RecordTransformer::new(&Contacts, None, &conformer),
///     RecordLoader::new(&writer, "contacts", None),
/// );
/// let count = pipeline.run().await?;
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// The loader, for reading back anything it tracked while loading
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Run all three stages and return the number of records loaded
    ///
    /// Nothing reaches the loader when extraction comes back empty.
    ///
    /// # Errors
    /// Stops at the first stage that fails; transform errors get context
    pub async fn run(&self) -> Result<usize> {
        let records = self.extractor.extract().await?;
        if records.is_empty() {
            log::debug!("No records extracted, nothing to load");
            return Ok(0);
        }

        let extracted = records.len();
        let records = self
            .transformer
            .transform_many(records)
            .with_context(|| format!("Failed to transform {} extracted record(s)", extracted))?;

        let loaded = self.loader.load(records).await?;
        log::debug!("Loaded {} of {} record(s)", loaded, extracted);
        Ok(loaded)
    }
}
