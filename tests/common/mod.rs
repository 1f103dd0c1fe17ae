pub mod mock_openai_server;
pub mod recording_backend;
