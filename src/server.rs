use crate::config::RelayConfig;
use crate::io_struct::{ChatRequest, ErrorDetail, ServiceStatus};
use crate::relay::{RelayError, RelayHandler};
use actix_cors::Cors;
use actix_web::{HttpRequest, HttpResponse, HttpServer, error, get, post, web};
use std::io::Write;

pub struct AppState {
    pub relay: RelayHandler,
}

impl AppState {
    pub fn new(relay: RelayHandler) -> Self {
        AppState { relay }
    }
}

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(ServiceStatus::default())
}

#[post("/chat")]
pub async fn chat(
    req: web::Json<ChatRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, RelayError> {
    let resp = app_state.relay.handle(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

// Malformed bodies get the same `{detail}` shape as upstream failures.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("JSON payload error: {}", err);
    let (status, detail) = match &err {
        error::JsonPayloadError::OverflowKnownLength { length, limit } => (
            actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "Payload too large: {} bytes exceeds limit of {} bytes",
                length, limit
            ),
        ),
        error::JsonPayloadError::Overflow { limit } => (
            actix_web::http::StatusCode::PAYLOAD_TOO_LARGE,
            format!("Payload exceeds limit of {} bytes", limit),
        ),
        _ => (
            actix_web::http::StatusCode::BAD_REQUEST,
            format!("Invalid JSON payload: {}", err),
        ),
    };
    let resp = HttpResponse::build(status).json(ErrorDetail { detail });
    error::InternalError::from_response(err, resp).into()
}

pub fn json_config(max_payload_size: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_size)
        .error_handler(json_error_handler)
}

/// Allow-listed origins get credentials plus any method and header. Other
/// origins are still served, just without any CORS headers.
pub fn cors(allowed_origins: &[String]) -> Cors {
    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .block_on_origin_mismatch(false)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(root).service(chat);
}

/// Default level is info; `RUST_LOG` takes precedence when set. Fails if a
/// logger is already installed.
pub fn init_logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_env("RUST_LOG")
        .try_init()
}

pub async fn startup(config: RelayConfig, relay: RelayHandler) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(relay));

    log::info!("Starting server at {}:{}", config.host, config.port);
    log::info!("Upstream API base: {}", config.api_base);
    log::info!("Allowed origins: {:?}", config.allowed_origins);
    log::info!(
        "Max payload size: {} MB",
        config.max_payload_size / (1024 * 1024)
    );

    let allowed_origins = config.allowed_origins.clone();
    let max_payload_size = config.max_payload_size;
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(cors(&allowed_origins))
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .app_data(json_config(max_payload_size))
            .configure(configure)
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
