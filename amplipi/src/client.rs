use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{AmpError, Result};
use crate::models::{
    Group, GroupCreate, GroupId, GroupUpdate, MultiZoneUpdate, Status, ZoneId, ZoneUpdate,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// The device's `/api` surface.
///
/// Every mutating call answers with the device's full status after the change.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait DeviceApi: Send + Sync {
    fn status(&self) -> Result<Status>;
    fn update_zone(&self, id: ZoneId, update: &ZoneUpdate) -> Result<Status>;
    fn update_zones(&self, update: &MultiZoneUpdate) -> Result<Status>;
    fn update_group(&self, id: GroupId, update: &GroupUpdate) -> Result<Status>;
    fn create_group(&self, group: &GroupCreate) -> Result<Group>;
    fn delete_group(&self, id: GroupId) -> Result<Status>;
}

/// Blocking JSON client for a single device.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Self::normalize_url(base_url)?;
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AmpError::Communication(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(AmpError::InvalidUrl("URL cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(AmpError::InvalidUrl(format!(
                "{} must start with http:// or https://",
                url
            )));
        }
        Ok(url.to_string())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AmpError::Http {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl DeviceApi for ApiClient {
    fn status(&self) -> Result<Status> {
        let response = self.http_client.get(self.endpoint("")).send()?;
        Self::parse(response)
    }

    fn update_zone(&self, id: ZoneId, update: &ZoneUpdate) -> Result<Status> {
        debug!("PATCH zone {:?}: {:?}", id, update);
        let response = self
            .http_client
            .patch(self.endpoint(&format!("/zones/{}", id.0)))
            .json(update)
            .send()?;
        Self::parse(response)
    }

    fn update_zones(&self, update: &MultiZoneUpdate) -> Result<Status> {
        debug!("PATCH zones {:?}: {:?}", update.zones, update.update);
        let response = self
            .http_client
            .patch(self.endpoint("/zones"))
            .json(update)
            .send()?;
        Self::parse(response)
    }

    fn update_group(&self, id: GroupId, update: &GroupUpdate) -> Result<Status> {
        debug!("PATCH group {:?}: {:?}", id, update);
        let response = self
            .http_client
            .patch(self.endpoint(&format!("/groups/{}", id.0)))
            .json(update)
            .send()?;
        Self::parse(response)
    }

    fn create_group(&self, group: &GroupCreate) -> Result<Group> {
        debug!("POST group {}", group.name);
        let response = self
            .http_client
            .post(self.endpoint("/group"))
            .json(group)
            .send()?;
        Self::parse(response)
    }

    fn delete_group(&self, id: GroupId) -> Result<Status> {
        debug!("DELETE group {:?}", id);
        let response = self
            .http_client
            .delete(self.endpoint(&format!("/groups/{}", id.0)))
            .send()?;
        Self::parse(response)
    }
}
