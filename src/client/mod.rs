//! 后端 REST API 访问层
//!
//! 所有业务服务只依赖 `ApiClient` trait：成功时返回解析后的 JSON，
//! 非 2xx 或传输失败时返回错误，不做任何重试。

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpApiClient;

/// 请求方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// 查询参数
pub type QueryParams = [(String, String)];

#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    // GET 请求
    async fn get(&self, path: &str, query: &QueryParams) -> Result<Value>;
    // POST 请求
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
    // PUT 请求
    async fn put(&self, path: &str, body: &Value) -> Result<Value>;
    // PATCH 请求
    async fn patch(&self, path: &str, body: &Value) -> Result<Value>;
    // DELETE 请求
    async fn delete(&self, path: &str) -> Result<Value>;

    /// 设置或清除后续请求携带的 Bearer 令牌
    fn set_auth_token(&self, _token: Option<String>) {}
}

pub fn create_client() -> Result<Arc<dyn ApiClient>> {
    let config = AppConfig::get();
    let client = HttpApiClient::new(&config.api)?;
    Ok(Arc::new(client))
}
