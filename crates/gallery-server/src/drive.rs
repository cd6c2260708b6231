//! Storage-provider listing client.
//!
//! The provider's REST API sits behind [`FolderSource`] so the mapping and
//! pagination logic in `listing` can be exercised against an in-memory
//! source.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::config::ServiceConfig;
use crate::error::ServiceError;

const FILES_URI: &str = "https://www.googleapis.com/drive/v3/files";
const LIST_FIELDS: &str =
    "nextPageToken,files(id,name,description,mimeType,modifiedTime,thumbnailLink)";

/// One file of the configured folder, already filtered to images and ordered
/// most-recently-modified first by the provider.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub modified_time: String,
    /// Provider-generated low-resolution preview, when one exists.
    pub thumbnail_url: Option<String>,
    /// Direct content URL for the full-resolution bytes.
    pub content_url: String,
}

#[derive(Debug, Clone)]
pub struct FolderPage {
    pub files: Vec<FileEntry>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait FolderSource: Send + Sync {
    /// One page of the folder listing, resuming from `page_token` if given.
    async fn list(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FolderPage, ServiceError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    modified_time: String,
    #[serde(default)]
    thumbnail_link: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

pub struct DriveSource {
    http: reqwest::Client,
    auth: TokenProvider,
    folder_id: String,
}

impl DriveSource {
    pub fn new(cfg: &ServiceConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            http: reqwest::Client::new(),
            auth: TokenProvider::new(cfg)?,
            folder_id: cfg.folder_id.clone(),
        })
    }

    fn content_url(id: &str) -> String {
        format!("https://drive.google.com/uc?export=view&id={id}")
    }
}

#[async_trait]
impl FolderSource for DriveSource {
    async fn list(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FolderPage, ServiceError> {
        let token = self.auth.access_token().await?;
        let query = format!(
            "'{}' in parents and mimeType contains 'image/' and trashed = false",
            self.folder_id
        );
        let mut params: Vec<(&str, String)> = vec![
            ("q", query),
            ("orderBy", "modifiedTime desc".to_string()),
            ("pageSize", page_size.to_string()),
            ("fields", LIST_FIELDS.to_string()),
        ];
        if let Some(cursor) = page_token {
            params.push(("pageToken", cursor.to_string()));
        }

        let response = self
            .http
            .get(FILES_URI)
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| ServiceError::Upstream(err.to_string()))?;
        let list: DriveFileList = response
            .json()
            .await
            .map_err(|err| ServiceError::Upstream(format!("malformed listing: {err}")))?;

        debug!(
            files = list.files.len(),
            more = list.next_page_token.is_some(),
            "folder page listed"
        );
        Ok(FolderPage {
            files: list
                .files
                .into_iter()
                .map(|f| FileEntry {
                    content_url: Self::content_url(&f.id),
                    id: f.id,
                    name: f.name,
                    description: f.description,
                    modified_time: f.modified_time,
                    thumbnail_url: f.thumbnail_link,
                })
                .collect(),
            next_page_token: list.next_page_token,
        })
    }
}
