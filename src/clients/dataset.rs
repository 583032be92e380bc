//! Reqwest-backed client for the dataset API.

use serde::Deserialize;

use crate::auth::CallerIdentity;
use crate::clients::{ClientError, DatasetClient};
use crate::models::dataset::{DatasetDetails, Version};

const FLORENCE_TOKEN_HEADER: &str = "X-Florence-Token";

/// HTTP client for dataset and version metadata.
#[derive(Debug, Clone)]
pub struct DatasetApiClient {
    http: reqwest::Client,
    base_url: String,
    service_token: String,
}

#[derive(Deserialize)]
struct OptionsPage {
    total_count: usize,
}

impl DatasetApiClient {
    pub fn new(base_url: impl Into<String>, service_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            service_token: service_token.into(),
        }
    }

    fn request(&self, url: String, caller: Option<&CallerIdentity>) -> reqwest::RequestBuilder {
        let mut req = self.http.get(url);
        if !self.service_token.is_empty() {
            req = req.bearer_auth(&self.service_token);
        }
        if let Some(user_token) = caller.and_then(|c| c.user_token.as_deref()) {
            req = req.header(FLORENCE_TOKEN_HEADER, user_token);
        }
        req
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        caller: Option<&CallerIdentity>,
    ) -> Result<T, ClientError> {
        let response = self.request(url, caller).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ErrorStatus(status.as_u16()));
        }
        response.json().await.map_err(ClientError::from)
    }
}

#[async_trait::async_trait]
impl DatasetClient for DatasetApiClient {
    async fn get_dataset(
        &self,
        caller: &CallerIdentity,
        dataset_id: &str,
    ) -> Result<DatasetDetails, ClientError> {
        let url = format!("{}/datasets/{dataset_id}", self.base_url);
        self.fetch(url, Some(caller)).await
    }

    async fn get_version(
        &self,
        caller: &CallerIdentity,
        dataset_id: &str,
        edition: &str,
        version: &str,
    ) -> Result<Version, ClientError> {
        let url = format!(
            "{}/datasets/{dataset_id}/editions/{edition}/versions/{version}",
            self.base_url
        );
        self.fetch(url, Some(caller)).await
    }

    async fn get_option_count(
        &self,
        dataset_id: &str,
        edition: &str,
        version: &str,
        dimension: &str,
    ) -> Result<usize, ClientError> {
        // limit=0 skips the option documents; only total_count comes back.
        let url = format!(
            "{}/datasets/{dataset_id}/editions/{edition}/versions/{version}/dimensions/{dimension}/options?offset=0&limit=0",
            self.base_url
        );
        let page: OptionsPage = self.fetch(url, None).await?;
        Ok(page.total_count)
    }
}
