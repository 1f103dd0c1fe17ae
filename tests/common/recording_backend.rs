#![allow(dead_code)]

use async_trait::async_trait;
use chat_relay::{ChatTurn, Completion, CompletionBackend, CompletionParams, UpstreamError};
use std::sync::{Arc, Mutex};

/// In-process backend that records every call and answers from a script
pub struct RecordingBackend {
    reply: Result<String, String>,
    calls: Mutex<Vec<(Vec<ChatTurn>, CompletionParams)>>,
}

impl RecordingBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Vec<ChatTurn>, CompletionParams)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(
        &self,
        messages: &[ChatTurn],
        params: &CompletionParams,
    ) -> Result<Completion, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), params.clone()));
        match &self.reply {
            Ok(text) => Ok(Completion { text: text.clone() }),
            Err(message) => Err(UpstreamError::Backend(message.clone())),
        }
    }
}
