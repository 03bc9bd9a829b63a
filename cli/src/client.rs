//! HTTP client for the item service.
//!
//! Calls return the raw status and body so commands can print either the
//! body verbatim (`--format json`) or a decoded summary.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use shared::{CreateItemRequest, ErrorResponse, ListItemsQuery, UpdateItemRequest};
use std::time::Duration;
use uuid::Uuid;

use crate::config::CliConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot connect to API server at {url}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The `error` field of a failure body, if the server sent one.
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(&self.body)
            .ok()
            .map(|e| e.error)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &CliConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<ApiResponse, ClientError> {
        self.send(self.http.get(self.url("/health"))).await
    }

    pub async fn hello(&self) -> Result<ApiResponse, ClientError> {
        self.send(self.http.get(self.url("/hello"))).await
    }

    pub async fn create_item(&self, req: &CreateItemRequest) -> Result<ApiResponse, ClientError> {
        self.send(self.http.post(self.url("/items")).json(req)).await
    }

    pub async fn list_items(&self, query: &ListItemsQuery) -> Result<ApiResponse, ClientError> {
        self.send(self.http.get(self.url("/items")).query(query)).await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<ApiResponse, ClientError> {
        self.send(self.http.get(self.url(&format!("/items/{id}")))).await
    }

    pub async fn update_item(
        &self,
        id: Uuid,
        req: &UpdateItemRequest,
    ) -> Result<ApiResponse, ClientError> {
        self.send(self.http.put(self.url(&format!("/items/{id}"))).json(req))
            .await
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<ApiResponse, ClientError> {
        self.send(self.http.delete(self.url(&format!("/items/{id}")))).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<ApiResponse, ClientError> {
        let request = builder.build()?;
        tracing::debug!("Making {} request to: {}", request.method(), request.url());
        if let Some(body) = request.body().and_then(|b| b.as_bytes()) {
            tracing::debug!("Request body: {}", String::from_utf8_lossy(body));
        }

        let response = self.http.execute(request).await.map_err(|e| {
            if e.is_connect() {
                ClientError::Unreachable {
                    url: self.base_url.clone(),
                    source: e,
                }
            } else {
                ClientError::Http(e)
            }
        })?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    fn client() -> ApiClient {
        ApiClient::new(&CliConfig::new(
            "http://localhost:8080/",
            OutputFormat::Pretty,
            false,
        ))
        .unwrap()
    }

    #[test]
    fn list_request_carries_pagination() {
        let client = client();
        let query = ListItemsQuery {
            limit: Some(5),
            offset: Some(10),
        };
        let request = client
            .http
            .get(client.url("/items"))
            .query(&query)
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8080/items?limit=5&offset=10"
        );

        let request = client
            .http
            .get(client.url("/items"))
            .query(&ListItemsQuery::default())
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:8080/items");
    }

    #[test]
    fn update_body_omits_untouched_fields() {
        let client = client();
        let id = Uuid::nil();
        let req = UpdateItemRequest {
            name: None,
            description: Some(Some(String::new())),
        };
        let request = client
            .http
            .put(client.url(&format!("/items/{id}")))
            .json(&req)
            .build()
            .unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"description":""}"#);
        assert_eq!(
            request.url().path(),
            "/items/00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn error_message_reads_error_body() {
        let response = ApiResponse {
            status: StatusCode::NOT_FOUND,
            body: r#"{"error":"Item not found"}"#.to_string(),
        };
        assert!(!response.is_success());
        assert_eq!(response.error_message().as_deref(), Some("Item not found"));

        let response = ApiResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(response.error_message(), None);
        assert!(response.json::<ErrorResponse>().is_err());
    }
}
