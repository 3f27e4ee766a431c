pub mod llm_client;

pub use llm_client::{build_client, GeminiClient, ModelClient, OpenAiClient};
