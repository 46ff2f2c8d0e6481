use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::ApiError;

/// A named GraphQL document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    pub name: &'static str,
    pub query: &'static str,
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// GraphQL-over-HTTP client
#[derive(Clone)]
pub struct GraphQlClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl std::fmt::Debug for GraphQlClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlClient")
            .field("endpoint", &self.endpoint)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl GraphQlClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|err| {
                log::error!("[GraphQl] Falling back to default HTTP client: {}", err);
                Client::new()
            });
        Self::with_client(client, endpoint, token)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        let endpoint = endpoint.into();
        log::info!("[GraphQl] Using endpoint {}", endpoint);
        Self {
            client,
            endpoint,
            token,
        }
    }

    /// Send `document` with `variables` and decode its `data` as `T`.
    ///
    /// Any entry in `errors` fails the call, even when partial data came back.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        document: &Document,
        variables: Value,
    ) -> Result<T, ApiError> {
        log::debug!("[GraphQl] -> {}", document.name);

        let mut request = self.client.post(&self.endpoint).json(&Request {
            query: document.query,
            operation_name: document.name,
            variables,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let body: Response<T> = serde_json::from_slice(&bytes)?;
        if !body.errors.is_empty() {
            return Err(ApiError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        body.data.ok_or(ApiError::MissingData(document.name))
    }
}
