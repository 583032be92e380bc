//! Reqwest-backed streaming store client.
//!
//! The graph gateway answers a filtered observation query with a chunked
//! `text/csv` body. The response byte stream is framed into lines here so
//! the consumer sees one CSV row per `read`.

use bytes::{Buf, Bytes, BytesMut};
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Serialize;

use crate::clients::{RowStream, StoreError, StreamingStore};
use crate::query::filter::DimensionFilter;

/// HTTP client for the CSV row stream.
#[derive(Debug, Clone)]
pub struct GraphStoreClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct StreamRequest<'a> {
    filter_id: &'a str,
    dimensions: &'a [crate::query::filter::FilterDimension],
    limit: usize,
}

impl GraphStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl StreamingStore for GraphStoreClient {
    async fn stream_csv_rows(
        &self,
        instance_id: &str,
        filter_id: &str,
        filter: &DimensionFilter,
        limit: usize,
    ) -> Result<Box<dyn RowStream>, StoreError> {
        let url = format!("{}/instances/{instance_id}/observations", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&StreamRequest {
                filter_id,
                dimensions: &filter.dimensions,
                limit,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            // The store reports query-level failures in the body; keep its
            // message intact for the consumer to classify.
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Query(message));
        }

        Ok(Box::new(HttpRowStream {
            inner: Some(response.bytes_stream().boxed()),
            buffer: BytesMut::new(),
        }))
    }
}

/// Line-framed reader over a chunked response body.
struct HttpRowStream {
    inner: Option<BoxStream<'static, Result<Bytes, reqwest::Error>>>,
    buffer: BytesMut,
}

impl HttpRowStream {
    /// Pop one line from the buffer, if a full line is present.
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line = self.buffer.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some(String::from_utf8_lossy(line.chunk()).into_owned())
    }
}

#[async_trait::async_trait]
impl RowStream for HttpRowStream {
    async fn read(&mut self) -> Result<Option<String>, StoreError> {
        loop {
            if let Some(line) = self.take_line() {
                return Ok(Some(line));
            }

            let Some(stream) = self.inner.as_mut() else {
                return Ok(None);
            };

            match stream.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(StoreError::Http(e)),
                None => {
                    self.inner = None;
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    // final row without trailing newline
                    let line = String::from_utf8_lossy(self.buffer.chunk()).into_owned();
                    self.buffer.clear();
                    return Ok(Some(line));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        // Dropping the body stream releases the connection.
        self.inner = None;
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(chunks: Vec<&'static str>) -> HttpRowStream {
        let stream = futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        )
        .boxed();
        HttpRowStream {
            inner: Some(stream),
            buffer: BytesMut::new(),
        }
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let mut rows = stream_of(vec!["v4_0,time\n1", "85,2016\n186,", "2017\n"]);
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("v4_0,time"));
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("185,2016"));
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("186,2017"));
        assert_eq!(rows.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_final_row_without_newline_and_crlf() {
        let mut rows = stream_of(vec!["a,b\r\nc,d"]);
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("a,b"));
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("c,d"));
        assert_eq!(rows.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_after_close_is_end_of_stream() {
        let mut rows = stream_of(vec!["a,b\nc,d\n"]);
        assert_eq!(rows.read().await.unwrap().as_deref(), Some("a,b"));
        rows.close().await.unwrap();
        assert_eq!(rows.read().await.unwrap(), None);
    }
}
