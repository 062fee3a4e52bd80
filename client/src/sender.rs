use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use benchlog_payloads::{BenchmarkRow, RowError};

use crate::config::Config;
use crate::error::{Error, Result};

/// Error bodies can be arbitrarily large; only this much of one ends up in the log.
const MAX_LOGGED_BODY: usize = 1024;

/// What the server told us about a successful insert.
#[derive(Debug, Clone)]
pub struct Inserted {
    pub status: StatusCode,
    /// The response body exactly as received.
    pub body: String,
    /// `body` parsed as JSON, or `Value::Null` if the server sent nothing back.
    pub rows: Value,
}

impl fmt::Display for Inserted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

fn loggable(body: &str) -> &str {
    let mut end = body.len().min(MAX_LOGGED_BODY);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn sensitive(value: String) -> Result<HeaderValue> {
    let mut header = HeaderValue::try_from(value)
        .map_err(|_| Error::Configuration("key contains characters not allowed in a header".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

fn build_headers(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static("apikey"), sensitive(config.key().to_string())?);
    headers.insert(AUTHORIZATION, sensitive(format!("Bearer {}", config.key()))?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static("prefer"), HeaderValue::from_static("return=representation"));
    Ok(headers)
}

/// A prepared client for the benchmark table.
#[derive(Debug)]
pub struct RowLogger {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
}

impl RowLogger {
    pub fn new(config: &Config) -> Result<RowLogger> {
        let headers = build_headers(config)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(RowLogger {
            client: builder.build()?,
            endpoint: config.endpoint().clone(),
            headers,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST one row.  Non-2xx responses become [`Error::Http`] carrying the body the server sent.
    pub fn log_row(&self, row: &BenchmarkRow) -> Result<Inserted> {
        let serialized = serde_json::to_string(row).map_err(RowError::from)?;

        log::debug!("Posting {} byte row to {}", serialized.len(), self.endpoint);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .body(serialized)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_else(|e| {
                log::warn!("Error reading body from server: {:?}", e);
                String::from("Unable to read body")
            });

            log::warn!(
                "Got non-2xx status from server: {} {}",
                status.as_u16(),
                loggable(&body)
            );
            return Err(Error::Http { status, body });
        }

        let body = resp.text()?;
        let rows = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).map_err(Error::Decode)?
        };

        log::info!("Inserted row into {} ({})", self.endpoint.path(), status);
        Ok(Inserted { status, body, rows })
    }
}

/// Insert `row` with a one-off client.
pub fn log_row(row: &BenchmarkRow, config: &Config) -> Result<Inserted> {
    RowLogger::new(config)?.log_row(row)
}

#[cfg(test)]
mod tests;
