use crate::io_struct::{ChatRequest, ChatResponse, ChatTurn, ErrorDetail};
use crate::upstream::{CompletionBackend, CompletionParams, UpstreamError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("ChatGPT API error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDetail {
            detail: self.to_string(),
        })
    }
}

/// Turns a chat request into one upstream completion call. Holds no
/// per-request state, so a single instance is shared by every worker.
#[derive(Clone)]
pub struct RelayHandler {
    backend: Arc<dyn CompletionBackend>,
    params: CompletionParams,
}

impl RelayHandler {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self::with_params(backend, CompletionParams::default())
    }

    pub fn with_params(backend: Arc<dyn CompletionBackend>, params: CompletionParams) -> Self {
        RelayHandler { backend, params }
    }

    pub fn params(&self) -> &CompletionParams {
        &self.params
    }

    pub fn build_messages(request: &ChatRequest) -> Vec<ChatTurn> {
        request.to_messages()
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let messages = Self::build_messages(&request);
        match self.backend.complete(&messages, &self.params).await {
            Ok(completion) => Ok(ChatResponse::assistant(completion.text)),
            Err(e) => {
                log::error!("Error: {}", e);
                Err(RelayError::Upstream(e))
            }
        }
    }
}
