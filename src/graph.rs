use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::{GraphError, GraphResult};

/// Thin POST-only client for the Graph API.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    graph_url: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
    code: Option<i64>,
}

impl GraphClient {
    pub fn new(graph_url: &str, api_version: &str) -> GraphResult<Self> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, graph_url, api_version))
    }

    pub fn with_client(http: Client, graph_url: &str, api_version: &str) -> Self {
        Self {
            http,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            api_version: api_version.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &GraphConfig) -> GraphResult<Self> {
        Self::new(&config.graph_url, &config.api_version)
    }

    pub fn endpoint(&self, node: &str, edge: &str) -> String {
        format!("{}/{}/{}/{}", self.graph_url, self.api_version, node, edge)
    }

    /// POST a form-encoded body and return the created object's id.
    pub async fn post_form(
        &self,
        node: &str,
        edge: &str,
        fields: &[(&str, String)],
    ) -> GraphResult<String> {
        let url = self.endpoint(node, edge);
        debug!(%url, "posting form");
        let response = self.http.post(&url).form(fields).send().await?;
        read_id(response).await
    }

    /// POST a JSON body and return the created object's id.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        node: &str,
        edge: &str,
        body: &T,
    ) -> GraphResult<String> {
        let url = self.endpoint(node, edge);
        debug!(%url, "posting json");
        let response = self.http.post(&url).json(body).send().await?;
        read_id(response).await
    }
}

async fn read_id(response: Response) -> GraphResult<String> {
    let status = response.status().as_u16();
    let text = response.text().await?;
    extract_id(status, &text)
}

/// Interpret a Graph API response body.
///
/// An `id` member means success whatever the status code. Anything else is a
/// failure, classified as a provider error envelope, an id-less JSON body, or
/// a body that is not JSON at all.
pub fn extract_id(status: u16, text: &str) -> GraphResult<String> {
    let value: Value = serde_json::from_str(text).map_err(|_| GraphError::InvalidResponse {
        status,
        body: text.to_string(),
    })?;

    match value.get("id") {
        Some(Value::String(id)) if !id.is_empty() => return Ok(id.clone()),
        Some(Value::Number(id)) => return Ok(id.to_string()),
        _ => {}
    }

    if let Ok(envelope) = serde_json::from_value::<ErrorEnvelope>(value) {
        return Err(GraphError::Api {
            status,
            message: envelope.error.message,
            kind: envelope.error.kind,
            code: envelope.error.code,
        });
    }

    Err(GraphError::MissingId {
        body: text.to_string(),
    })
}
