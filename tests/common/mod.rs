// Scripted requester shared by the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use csrfprobe::config::RequestConfig;
use csrfprobe::engine::Requester;
use csrfprobe::errors::AuditResult;
use csrfprobe::models::HttpReply;

/// What the code under test sent.
#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub params: HashMap<String, String>,
    pub user_agent: Option<String>,
    pub is_get: bool,
}

/// Answers every request through `handler(call_index, call)`.
pub struct MockRequester<F> {
    handler: F,
    counter: AtomicUsize,
    pub calls: Mutex<Vec<Call>>,
}

impl<F> MockRequester<F>
where
    F: Fn(usize, &Call) -> AuditResult<HttpReply> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            counter: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> Requester for MockRequester<F>
where
    F: Fn(usize, &Call) -> AuditResult<HttpReply> + Send + Sync,
{
    async fn request(
        &self,
        url: &str,
        params: &HashMap<String, String>,
        config: &RequestConfig,
        is_get: bool,
    ) -> AuditResult<HttpReply> {
        let call = Call {
            url: url.to_string(),
            params: params.clone(),
            user_agent: config.header("User-Agent").map(str::to_string),
            is_get,
        };
        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call.clone());
        (self.handler)(index, &call)
    }
}

/// A page with one POST form carrying `token` in a hidden field.
pub fn token_page(action: &str, token: &str) -> String {
    format!(
        r#"<html><body><form action="{}" method="post">
            <input type="hidden" name="csrf_token" value="{}">
            <input type="text" name="email" value="me@example.com">
        </form></body></html>"#,
        action, token
    )
}
