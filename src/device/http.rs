//! HTTP camera client
//!
//! Talks to the camera's `/status`, `/control` and `/capture` endpoints.
//! Every request is bounded by the configured timeout.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{StatusCode, Url};

use super::{CameraDevice, DeviceStatus};
use crate::error::{Error, Result};
use crate::event::now_millis;

/// Camera reachable over HTTP
#[derive(Debug, Clone)]
pub struct HttpCamera {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCamera {
    /// Create a client for the camera at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("invalid camera url {base_url:?}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl CameraDevice for HttpCamera {
    async fn status(&self) -> Result<DeviceStatus> {
        let resp = self.client.get(self.endpoint("status")).send().await?;
        if !resp.status().is_success() {
            return Err(Error::UnexpectedStatus {
                endpoint: "status",
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.json::<DeviceStatus>().await?)
    }

    async fn control(&self, var: &'static str, value: i64) -> Result<()> {
        let resp = self
            .client
            .get(self.endpoint("control"))
            .query(&[("var", var.to_string()), ("val", value.to_string())])
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(Error::ControlRejected {
                var,
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn capture(&self) -> Result<Bytes> {
        // Cache buster, some firmwares serve stale frames otherwise
        let resp = self
            .client
            .get(self.endpoint("capture"))
            .query(&[("_cb", now_millis())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::UnexpectedStatus {
                endpoint: "capture",
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.bytes().await?)
    }
}
