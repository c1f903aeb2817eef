//! Asynchronous CSV reader with batch interface
//!
//! Reads any [`CsvInput`] row type from an async source in batches, for the
//! async pipeline.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of domain values
//!                  ↓
//!           csv_format module
//!           (CsvInput rows)
//! ```
//!
//! Malformed rows are logged and skipped, matching the sync reader's caller.

use crate::io::csv_format::CsvInput;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;

/// Asynchronous CSV reader over rows of type `T`
pub struct AsyncReader<R: AsyncRead + Unpin, T> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    _row: PhantomData<fn() -> T>,
}

impl<R, T> AsyncReader<R, T>
where
    R: AsyncRead + Unpin + Send + 'static,
    T: CsvInput + 'static,
{
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            _row: PhantomData,
        }
    }

    /// Read up to `batch_size` valid rows
    ///
    /// Returns an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<T::Output> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<T>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match record.convert() {
                    Ok(value) => batch.push(value),
                    Err(e) => tracing::warn!(error = %e, "skipping invalid record"),
                },
                Some(Err(e)) => tracing::warn!(error = %e, "skipping malformed CSV row"),
                None => break,
            }
        }

        batch
    }

    /// Read every remaining valid row
    pub async fn read_all(&mut self) -> Vec<T::Output> {
        let mut all = Vec::new();
        loop {
            let batch = self.read_batch(1024).await;
            if batch.is_empty() {
                return all;
            }
            all.extend(batch);
        }
    }
}
