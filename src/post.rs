use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::GraphClient;

/// What goes into a feed post. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostContent {
    pub message: Option<String>,
    pub link: Option<String>,
    pub media_url: Option<String>,
}

impl PostContent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = Some(media_url.into());
        self
    }
}

/// Publishes to a single page's feed.
#[derive(Debug, Clone)]
pub struct PostManager {
    client: GraphClient,
    access_token: String,
    page_id: String,
}

impl PostManager {
    pub fn new(client: GraphClient, access_token: &str, page_id: &str) -> Self {
        Self {
            client,
            access_token: access_token.to_string(),
            page_id: page_id.to_string(),
        }
    }

    pub fn from_config(client: GraphClient, config: &GraphConfig) -> Self {
        Self::new(client, &config.access_token, &config.page_id)
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Upload an image by URL as an unpublished page photo, returning its media id.
    pub async fn upload_photo(&self, image_url: &str) -> GraphResult<String> {
        let fields = [
            ("url", image_url.to_string()),
            ("published", "false".to_string()),
            ("access_token", self.access_token.clone()),
        ];

        match self.client.post_form(&self.page_id, "photos", &fields).await {
            Ok(id) => {
                info!(media_id = %id, "photo uploaded");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, image_url, "failed to upload photo");
                Err(e)
            }
        }
    }

    /// Create a feed post. Media is uploaded first and a failed upload
    /// aborts the post.
    pub async fn create_post(&self, content: &PostContent) -> GraphResult<String> {
        let mut fields = vec![("access_token", self.access_token.clone())];

        if let Some(message) = present(&content.message) {
            fields.push(("message", message.to_string()));
        }
        if let Some(link) = present(&content.link) {
            fields.push(("link", link.to_string()));
        }
        if let Some(media_url) = present(&content.media_url) {
            let media_id = self
                .upload_photo(media_url)
                .await
                .map_err(|e| GraphError::Upload(e.to_string()))?;
            fields.push((
                "attached_media[0]",
                json!({ "media_fbid": media_id }).to_string(),
            ));
        }

        if fields.len() == 1 {
            error!(page_id = %self.page_id, "refusing to create an empty post");
            return Err(GraphError::NothingToPost);
        }

        match self.client.post_form(&self.page_id, "feed", &fields).await {
            Ok(id) => {
                info!(post_id = %id, "post created");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, page_id = %self.page_id, "failed to create post");
                Err(e)
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
