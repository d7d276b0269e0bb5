use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ApiClient, HttpMethod, QueryParams};
use crate::config::ApiConfig;
use crate::errors::{PortalError, Result};

/// 基于 reqwest 的 API 客户端
pub struct HttpApiClient {
    inner: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let inner = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeouts.request_ms))
            .connect_timeout(Duration::from_millis(config.timeouts.connect_ms))
            .build()?;

        debug!("HttpApiClient initialized with base url: {}", config.base_url);
        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// 拼接完整地址
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn request(&self, method: HttpMethod, path: &str) -> RequestBuilder {
        let url = self.url(path);
        let builder = match method {
            HttpMethod::Get => self.inner.get(url),
            HttpMethod::Post => self.inner.post(url),
            HttpMethod::Put => self.inner.put(url),
            HttpMethod::Patch => self.inner.patch(url),
            HttpMethod::Delete => self.inner.delete(url),
        };
        let token = self
            .token
            .read()
            .expect("Auth token lock poisoned")
            .clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, method: HttpMethod, path: &str, builder: RequestBuilder) -> Result<Value> {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!("[{}] {} {}", request_id, method, path);

        let response = builder
            .header("X-Request-Id", &request_id)
            .send()
            .await
            .map_err(|e| {
                warn!("[{}] {} {} failed: {}", request_id, method, path, e);
                PortalError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        debug!("[{}] {} {} -> {}", request_id, method, path, status);

        if !status.is_success() {
            return Err(status_error(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait::async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, path: &str, query: &QueryParams) -> Result<Value> {
        let builder = self.request(HttpMethod::Get, path).query(query);
        self.send(HttpMethod::Get, path, builder).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let builder = self.request(HttpMethod::Post, path).json(body);
        self.send(HttpMethod::Post, path, builder).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let builder = self.request(HttpMethod::Put, path).json(body);
        self.send(HttpMethod::Put, path, builder).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        let builder = self.request(HttpMethod::Patch, path).json(body);
        self.send(HttpMethod::Patch, path, builder).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        let builder = self.request(HttpMethod::Delete, path);
        self.send(HttpMethod::Delete, path, builder).await
    }

    fn set_auth_token(&self, token: Option<String>) {
        *self.token.write().expect("Auth token lock poisoned") = token;
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// 将非 2xx 响应映射为错误，优先使用后端返回的 message 字段
fn status_error(status: StatusCode, body: &str) -> PortalError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    let message = if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {detail}")
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortalError::authentication(message),
        StatusCode::NOT_FOUND => PortalError::not_found(message),
        _ => PortalError::network(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_handles_slashes() {
        assert_eq!(
            join_url("http://localhost:8080/api/", "/evaluations/7"),
            "http://localhost:8080/api/evaluations/7"
        );
        assert_eq!(
            join_url("http://localhost:8080/api", "evaluations"),
            "http://localhost:8080/api/evaluations"
        );
    }

    #[test]
    fn test_status_error_classification() {
        let err = status_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err, PortalError::authentication("HTTP 401 Unauthorized"));

        let err = status_error(StatusCode::NOT_FOUND, r#"{"message":"评价不存在"}"#);
        assert_eq!(err, PortalError::not_found("HTTP 404 Not Found: 评价不存在"));

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, PortalError::Network(_)));
    }
}
