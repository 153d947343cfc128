use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::FaceAppError;

pub const DEFAULT_FILTER_ID: &str = "no-filter";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Filter {
    pub id: String,
    pub title: String,
    pub cropped: bool,
    pub paid: bool,
}

impl From<FilterEntry> for Filter {
    fn from(entry: FilterEntry) -> Self {
        let is_paid = entry.is_paid.unwrap_or(false);
        let only_cropped = entry.only_cropped.unwrap_or(false);
        Self {
            id: entry.id,
            title: entry.title,
            // Paid filters only render as cropped previews
            cropped: is_paid || only_cropped,
            paid: is_paid,
        }
    }
}

/// Filters available for one uploaded photo, plus the session it belongs to.
///
/// `code` and `device_id` must travel together into every follow-up request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FilterCatalog {
    pub code: String,
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub filters: Vec<Filter>,
}

impl FilterCatalog {
    pub fn find(&self, filter_id: &str) -> Option<&Filter> {
        self.filters.iter().find(|filter| filter.id == filter_id)
    }

    pub fn filter_ids(&self) -> Vec<String> {
        self.filters.iter().map(|filter| filter.id.clone()).collect()
    }
}

/// Rendered output image, exactly as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredImage(Vec<u8>);

impl FilteredImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FaceAppError> {
        tokio::fs::write(path, &self.0).await?;
        Ok(())
    }
}

impl AsRef<[u8]> for FilteredImage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Image to upload: raw bytes, or a path read at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl ImageSource {
    pub async fn into_bytes(self) -> Result<Vec<u8>, FaceAppError> {
        match self {
            ImageSource::Bytes(bytes) => Ok(bytes),
            ImageSource::Path(path) => Ok(tokio::fs::read(&path).await?),
        }
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl From<&[u8]> for ImageSource {
    fn from(bytes: &[u8]) -> Self {
        ImageSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

/// Result of listing filters: full records, or ids only.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterListing {
    Full(Vec<Filter>),
    Ids(Vec<String>),
}

impl FilterListing {
    pub fn ids(&self) -> Vec<String> {
        match self {
            FilterListing::Full(filters) => filters.iter().map(|f| f.id.clone()).collect(),
            FilterListing::Ids(ids) => ids.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FilterListing::Full(filters) => filters.len(),
            FilterListing::Ids(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Wire types for the photo upload response

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub code: String,
    #[serde(default)]
    pub objects: Vec<UploadObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadObject {
    pub children: Option<Vec<FilterEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilterEntry {
    pub id: String,
    pub title: String,
    // Absent and null both read as false
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub only_cropped: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(id: &str, is_paid: bool, only_cropped: bool) -> FilterEntry {
        FilterEntry {
            id: id.to_string(),
            title: id.to_uppercase(),
            is_paid: Some(is_paid),
            only_cropped: Some(only_cropped),
        }
    }

    #[test]
    fn test_paid_filters_are_always_cropped() {
        let paid = Filter::from(entry("female_2", true, false));
        assert!(paid.paid);
        assert!(paid.cropped);

        let crop_only = Filter::from(entry("hitman", false, true));
        assert!(!crop_only.paid);
        assert!(crop_only.cropped);

        let free = Filter::from(entry("smile", false, false));
        assert!(!free.cropped);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = FilterCatalog {
            code: "abc".into(),
            device_id: "dev".into(),
            filters: vec![
                Filter::from(entry("no-filter", false, false)),
                Filter::from(entry("old", false, false)),
            ],
        };

        assert_eq!(catalog.find("old").map(|f| f.title.as_str()), Some("OLD"));
        assert!(catalog.find("young").is_none());
        assert_eq!(catalog.filter_ids(), vec!["no-filter", "old"]);
    }

    #[test]
    fn test_catalog_serializes_device_id_field() {
        let catalog = FilterCatalog {
            code: "abc".into(),
            device_id: "dev".into(),
            filters: vec![],
        };
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["deviceID"], "dev");
    }

    #[test]
    fn test_upload_response_parsing() {
        let body = r#"{
            "code": "abc",
            "objects": [{"children": [
                {"id": "no-filter", "title": "Original", "is_paid": false, "only_cropped": false},
                {"id": "female_2", "title": "Female", "is_paid": true}
            ]}]
        }"#;

        let response: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.code, "abc");
        let children = response.objects[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].is_paid, Some(true));
        assert_eq!(children[1].only_cropped, None);
    }

    #[test]
    fn test_null_flags_read_as_false() {
        let body = r#"{
            "code": "abc",
            "objects": [{"children": [
                {"id": "smile", "title": "Smile", "is_paid": null, "only_cropped": null}
            ]}]
        }"#;

        let response: UploadResponse = serde_json::from_str(body).unwrap();
        let entry = response
            .objects
            .into_iter()
            .next()
            .and_then(|object| object.children)
            .and_then(|children| children.into_iter().next())
            .unwrap();
        let filter = Filter::from(entry);

        assert!(!filter.paid);
        assert!(!filter.cropped);
    }

    #[tokio::test]
    async fn test_image_source_from_path() {
        let mut temp_file = NamedTempFile::with_suffix(".png").unwrap();
        temp_file.write_all(b"\x89PNG fake").unwrap();

        let source = ImageSource::from(temp_file.path());
        assert_eq!(source.into_bytes().await.unwrap(), b"\x89PNG fake".to_vec());
    }

    #[tokio::test]
    async fn test_image_source_missing_path() {
        let source = ImageSource::from("/nonexistent/faceapp/image.png");
        assert!(matches!(
            source.into_bytes().await,
            Err(FaceAppError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_filtered_image_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let image = FilteredImage::new(vec![0xFF, 0xD8, 0xFF]);

        image.save(&path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), image.as_bytes());
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn test_filter_listing_ids() {
        let full = FilterListing::Full(vec![Filter::from(entry("a", false, false))]);
        let ids = FilterListing::Ids(vec!["a".into()]);
        assert_eq!(full.ids(), ids.ids());
        assert!(!full.is_empty());
    }
}
