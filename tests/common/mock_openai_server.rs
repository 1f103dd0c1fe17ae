//! Mock OpenAI chat completions server for testing

#![allow(dead_code)]

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, dev::ServerHandle, web};
use serde_json::{Value, json};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers `/v1/chat/completions`
#[derive(Clone, Debug)]
pub enum MockBehavior {
    Reply(String),
    ApiError { status: u16, message: String },
    PlainError { status: u16, body: String },
    NoChoices,
    NullContent,
    Garbage,
    Delay(Duration),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    behavior: MockBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockOpenAIServer {
    base_url: String,
    handle: ServerHandle,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockOpenAIServer {
    /// Start the mock on an ephemeral port
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(MockState {
            behavior,
            requests: requests.clone(),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .route("/v1/chat/completions", web::post().to(mock_chat_completions))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{}/v1", addr),
            handle,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn mock_chat_completions(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<MockState>,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let body = body.into_inner();
    let model = body["model"].as_str().unwrap_or("gpt-3.5-turbo").to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        authorization,
        body,
    });

    match &state.behavior {
        MockBehavior::Reply(text) => HttpResponse::Ok().json(completion(&model, json!(text))),
        MockBehavior::ApiError { status, message } => {
            HttpResponse::build(actix_web::http::StatusCode::from_u16(*status).unwrap()).json(
                json!({
                    "error": {
                        "message": message,
                        "type": "requests",
                        "param": null,
                        "code": null
                    }
                }),
            )
        }
        MockBehavior::PlainError { status, body } => {
            HttpResponse::build(actix_web::http::StatusCode::from_u16(*status).unwrap())
                .body(body.clone())
        }
        MockBehavior::NoChoices => HttpResponse::Ok().json(json!({
            "id": "chatcmpl-123456789",
            "object": "chat.completion",
            "model": model,
            "choices": []
        })),
        MockBehavior::NullContent => HttpResponse::Ok().json(completion(&model, Value::Null)),
        MockBehavior::Garbage => HttpResponse::Ok()
            .content_type("application/json")
            .body("{\"choices\": [{\"message\": "),
        MockBehavior::Delay(delay) => {
            tokio::time::sleep(*delay).await;
            HttpResponse::Ok().json(completion(&model, json!("too late")))
        }
    }
}

fn completion(model: &str, content: Value) -> Value {
    json!({
        "id": "chatcmpl-123456789",
        "object": "chat.completion",
        "created": 1677652288,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 9,
            "completion_tokens": 12,
            "total_tokens": 21
        }
    })
}
