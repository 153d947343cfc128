use crate::config::{Config, ConfigError};
use crate::device::{DeviceIdGenerator, RandomDeviceId};
use crate::error::FaceAppError;
use crate::models::{
    Filter, FilterCatalog, FilteredImage, ImageSource, UploadResponse, DEFAULT_FILTER_ID,
};

use reqwest::header::USER_AGENT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use tracing::{debug, warn};

const DEVICE_ID_HEADER: &str = "X-FaceApp-DeviceID";

/// Raw HTTP layer: uploads photos and downloads rendered filters.
#[derive(Clone)]
pub struct FaceAppClient {
    client: Client,
    config: Config,
    device_ids: Arc<dyn DeviceIdGenerator>,
}

impl FaceAppClient {
    pub fn new(config: Config) -> Result<Self, FaceAppError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            config,
            device_ids: Arc::new(RandomDeviceId),
        })
    }

    pub fn with_device_ids(mut self, device_ids: Arc<dyn DeviceIdGenerator>) -> Self {
        self.device_ids = device_ids;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Uploads a photo and returns the filters the service offers for it.
    ///
    /// A response whose `objects[0].children` is missing or empty fails with
    /// [`FaceAppError::MalformedResponse`]; a successful catalog always holds
    /// at least one filter.
    pub async fn fetch_catalog(
        &self,
        image: impl Into<ImageSource>,
    ) -> Result<FilterCatalog, FaceAppError> {
        let bytes = image.into().into_bytes().await?;
        let device_id = self.device_ids.generate_device_id();
        let url = self.config.photos_url();

        debug!(
            "Uploading {} bytes to {} as device {}",
            bytes.len(),
            url,
            device_id
        );

        let form = Form::new().part("file", Part::bytes(bytes).file_name("image.png"));
        let request = self.client.post(&url).multipart(form);
        let response = self.send(request, &device_id).await?;
        let body = response.text().await?;

        let upload: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| FaceAppError::MalformedResponse(format!("invalid upload response: {e}")))?;

        let children = upload
            .objects
            .into_iter()
            .next()
            .and_then(|object| object.children)
            .ok_or_else(|| {
                FaceAppError::MalformedResponse("missing objects[0].children".to_string())
            })?;

        if children.is_empty() {
            return Err(FaceAppError::MalformedResponse(
                "objects[0].children is empty".to_string(),
            ));
        }

        let filters: Vec<Filter> = children.into_iter().map(Filter::from).collect();
        debug!("Photo {} accepted with {} filters", upload.code, filters.len());

        Ok(FilterCatalog {
            code: upload.code,
            device_id,
            filters,
        })
    }

    /// Downloads the photo from `catalog` rendered with `filter_id`.
    ///
    /// Unknown ids fail with [`FaceAppError::InvalidFilter`] without
    /// contacting the service.
    pub async fn fetch_filtered_image(
        &self,
        catalog: &FilterCatalog,
        filter_id: Option<&str>,
    ) -> Result<FilteredImage, FaceAppError> {
        let filter_id = filter_id.unwrap_or(DEFAULT_FILTER_ID);
        let filter = catalog
            .find(filter_id)
            .ok_or_else(|| FaceAppError::InvalidFilter {
                available: catalog.filter_ids(),
            })?;

        let url = self
            .config
            .filter_image_url(&catalog.code, &filter.id, filter.cropped)?;
        debug!("Requesting filtered image: {}", url);

        let request = self.client.get(url);
        let response = self.send(request, &catalog.device_id).await?;
        let bytes = response.bytes().await?;

        Ok(FilteredImage::new(bytes.to_vec()))
    }

    /// Downloads the sample photo used to enumerate every filter.
    pub async fn fetch_sample_image(&self) -> Result<Vec<u8>, FaceAppError> {
        let url = &self.config.test_image_url;
        debug!("Downloading sample image from {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        device_id: &str,
    ) -> Result<Response, FaceAppError> {
        let response = request
            .header(USER_AGENT, &self.config.api_user_agent)
            .header(DEVICE_ID_HEADER, device_id)
            .send()
            .await?;

        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, FaceAppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = match response.bytes().await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            debug!("Failed to read error body from {}: {}", url, e);
            String::new()
        }
    };
    warn!("HTTP {} from {}: {}", status, url, body);

    Err(FaceAppError::Remote {
        status: Some(status.as_u16()),
        message: format!("HTTP {status}: {body}"),
        body,
    })
}
