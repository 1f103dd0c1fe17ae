pub mod config;
pub mod io_struct;
pub mod relay;
pub mod server;
pub mod upstream;

pub use io_struct::{ChatRequest, ChatResponse, ChatTurn};
pub use relay::{RelayError, RelayHandler};
pub use upstream::{Completion, CompletionBackend, CompletionParams, OpenAIClient, UpstreamError};
