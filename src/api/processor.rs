use crate::api::client::FaceAppClient;
use crate::config::Config;
use crate::device::DeviceIdGenerator;
use crate::error::FaceAppError;
use crate::models::{FilterListing, FilteredImage, ImageSource};

use std::sync::Arc;
use tracing::{debug, info};

const PHOTO_NO_FACES: &str = "photo_no_faces";
const BAD_FILTER_ID: &str = "bad_filter_id";

/// Public entry point: apply a filter to a photo, or list the filters on offer.
#[derive(Clone)]
pub struct FaceApp {
    client: FaceAppClient,
}

impl FaceApp {
    pub fn new(config: Config) -> Result<Self, FaceAppError> {
        Ok(Self {
            client: FaceAppClient::new(config)?,
        })
    }

    pub fn from_client(client: FaceAppClient) -> Self {
        Self { client }
    }

    pub fn with_device_ids(self, device_ids: Arc<dyn DeviceIdGenerator>) -> Self {
        Self {
            client: self.client.with_device_ids(device_ids),
        }
    }

    pub fn client(&self) -> &FaceAppClient {
        &self.client
    }

    /// Runs `image` through `filter_id` (`no-filter` when `None`).
    ///
    /// A 400 response carrying a known service error code is reported as
    /// [`FaceAppError::NoFacesDetected`] or [`FaceAppError::InvalidFilter`];
    /// every other failure is returned as-is.
    pub async fn process(
        &self,
        image: impl Into<ImageSource>,
        filter_id: Option<&str>,
    ) -> Result<FilteredImage, FaceAppError> {
        let result = async {
            let catalog = self.client.fetch_catalog(image).await?;
            self.client.fetch_filtered_image(&catalog, filter_id).await
        }
        .await;

        let image = result.map_err(translate_error)?;
        info!("Filtered image received: {} bytes", image.len());
        Ok(image)
    }

    /// Lists every filter the service supports, using the sample photo.
    pub async fn list_filters(&self, minimal: bool) -> Result<FilterListing, FaceAppError> {
        let sample = self.client.fetch_sample_image().await?;
        let catalog = self.client.fetch_catalog(sample).await?;

        debug!("Service offers {} filters", catalog.filters.len());

        if minimal {
            Ok(FilterListing::Ids(catalog.filter_ids()))
        } else {
            Ok(FilterListing::Full(catalog.filters))
        }
    }
}

fn translate_error(err: FaceAppError) -> FaceAppError {
    if err.status() != Some(400) {
        return err;
    }

    match err.error_code().as_deref() {
        Some(PHOTO_NO_FACES) => {
            info!("Service found no faces in photo");
            FaceAppError::NoFacesDetected
        }
        Some(BAD_FILTER_ID) => {
            info!("Service rejected filter id");
            FaceAppError::InvalidFilter { available: vec![] }
        }
        _ => err,
    }
}
