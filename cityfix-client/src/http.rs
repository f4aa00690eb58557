//! Authenticated HTTP client
//!
//! Every request carries the session's bearer token. A 401 or 403 from any
//! endpoint ends the session: the provider is signed out and a login
//! redirect back to the current path is recorded on the session.

use std::sync::Arc;

use http::StatusCode;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{ApiResponse, ErrorCode};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.post(self.url(path))).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.client.patch(self.url(path)).json(body)).await
    }

    pub async fn patch_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        self.send(self.client.patch(self.url(path)).query(query)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send(self.client.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text).map_err(Into::into);
        }

        let body = serde_json::from_str::<ApiResponse<()>>(&text).ok();
        let code = body.as_ref().and_then(ApiResponse::error_code);
        let message = match body {
            Some(body) => body.message,
            None => text,
        };

        match status {
            StatusCode::UNAUTHORIZED => {
                self.session.expire().await;
                Err(ClientError::Unauthorized(message))
            }
            StatusCode::FORBIDDEN => {
                self.session.expire().await;
                Err(ClientError::Forbidden(message))
            }
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
            StatusCode::BAD_REQUEST => Err(ClientError::Validation(message)),
            StatusCode::CONFLICT => Err(ClientError::Conflict {
                code: code.unwrap_or(ErrorCode::Unknown),
                message,
            }),
            s if s.is_server_error() => {
                tracing::warn!(status = %s, code = ?code, "API unavailable");
                Err(ClientError::Unavailable(message))
            }
            _ => Err(ClientError::Api {
                code: code.unwrap_or(ErrorCode::Unknown),
                message,
            }),
        }
    }
}
