// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Scripted in-memory transport for tests
//!
//! Responses are replayed in the order they were pushed and every executed
//! request is recorded for later assertions.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ContentsError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

enum Scripted {
    Respond(HttpResponse),
    Fail(String),
    Hang,
}

/// Transport that answers from a queue of canned responses
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.enqueue(Scripted::Respond(response))
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) -> &Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.push_response(HttpResponse::json(status, &body))
    }

    /// Fail the next request at the transport level (connection reset etc.)
    pub fn push_failure(&self, message: &str) -> &Self {
        self.enqueue(Scripted::Fail(message.to_string()))
    }

    /// Never answer the next request; only a deadline gets it unstuck
    pub fn push_hang(&self) -> &Self {
        self.enqueue(Scripted::Hang)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or_default()
    }

    fn enqueue(&self, step: Scripted) -> &Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());

        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ContentsError::Transport(message)),
            Some(Scripted::Hang) => std::future::pending().await,
            None => Err(ContentsError::Transport("no scripted response left".to_string())),
        }
    }
}
