//! Minimal GraphQL transport shared by the entity repositories.
//!
//! Requests are posted as `{ query, variables }`. The first entry of a
//! response's `errors` array wins over the HTTP status so that the backend's
//! own message reaches the operator.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::repository::{GraphQlRepository, RepositoryError, RepositoryResult};

#[derive(Serialize)]
struct GraphQlRequest<'a, V> {
    query: &'a str,
    variables: V,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Deserialize)]
struct GraphQlErrorExtensions {
    code: Option<String>,
}

/// Error codes the API uses for missing or rejected credentials.
const AUTH_ERROR_CODES: [&str; 2] = ["UNAUTHENTICATED", "FORBIDDEN"];

impl GraphQlError {
    fn is_auth_error(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.code.as_deref())
            .is_some_and(|code| AUTH_ERROR_CODES.contains(&code))
    }
}

fn is_auth_status(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

impl GraphQlRepository {
    /// Executes one query or mutation and decodes its `data` payload.
    pub(crate) async fn execute<V, T>(&self, query: &str, variables: V) -> RepositoryResult<T>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&GraphQlRequest { query, variables });
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

pub(crate) fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> RepositoryResult<T> {
    let response: GraphQlResponse<T> = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(_) if is_auth_status(status) => return Err(RepositoryError::Unauthorized),
        Err(e) if status.is_success() => return Err(RepositoryError::Decode(e.to_string())),
        Err(_) => return Err(RepositoryError::Http(format!("HTTP {status}"))),
    };

    if let Some(error) = response.errors.into_iter().next() {
        if error.is_auth_error() {
            return Err(RepositoryError::Unauthorized);
        }
        return Err(RepositoryError::Server(error.message));
    }
    if is_auth_status(status) {
        return Err(RepositoryError::Unauthorized);
    }
    if !status.is_success() {
        return Err(RepositoryError::Http(format!("HTTP {status}")));
    }
    response
        .data
        .ok_or_else(|| RepositoryError::Decode("response carries no data".to_string()))
}
