//! 测试用的脚本化 API 客户端

use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

use super::{ApiClient, HttpMethod, QueryParams};
use crate::errors::Result;

struct MockRoute {
    method: HttpMethod,
    path: String,
    response: Result<Value>,
    delay: Option<Duration>,
}

/// 记录下来的一次调用
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// 按 (方法, 路径) 匹配预设响应；同一路径预设多次时按顺序消费，最后一条会被重复使用
#[derive(Default)]
pub struct MockApiClient {
    routes: Mutex<Vec<MockRoute>>,
    calls: Mutex<Vec<RecordedCall>>,
    token: Mutex<Option<String>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: HttpMethod, path: &str, response: Result<Value>) -> &Self {
        self.push(method, path, response, None)
    }

    pub fn on_delayed(
        &self,
        method: HttpMethod,
        path: &str,
        response: Result<Value>,
        delay: Duration,
    ) -> &Self {
        self.push(method, path, response, Some(delay))
    }

    fn push(
        &self,
        method: HttpMethod,
        path: &str,
        response: Result<Value>,
        delay: Option<Duration>,
    ) -> &Self {
        self.routes.lock().unwrap().push(MockRoute {
            method,
            path: path.to_string(),
            response,
            delay,
        });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: HttpMethod, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    async fn respond(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
        });

        let (response, delay) = {
            let mut routes = self.routes.lock().unwrap();
            let matching: Vec<usize> = routes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.method == method && r.path == path)
                .map(|(i, _)| i)
                .collect();
            match matching.as_slice() {
                [] => panic!("no mock response registered for {method} {path}"),
                [only] => {
                    let route = &routes[*only];
                    (route.response.clone(), route.delay)
                }
                [first, ..] => {
                    let route = routes.remove(*first);
                    (route.response, route.delay)
                }
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}

#[async_trait::async_trait]
impl ApiClient for MockApiClient {
    async fn get(&self, path: &str, query: &QueryParams) -> Result<Value> {
        self.respond(HttpMethod::Get, path, query, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.respond(HttpMethod::Post, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.respond(HttpMethod::Put, path, &[], Some(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.respond(HttpMethod::Patch, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.respond(HttpMethod::Delete, path, &[], None).await
    }

    fn set_auth_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }
}
