//! Conversational recommendation engine for Luxe.
//!
//! Detects greetings, keeps per-user conversation history, builds grounding
//! prompts from retrieved products, and calls the text-generation service
//! with a graceful fallback when it fails.

pub mod error;
pub mod greeting;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod store;

pub use error::ChatError;
pub use greeting::GreetingDetector;
pub use llm::{GeminiClient, GenerationParams, LlmClient, LlmError};
pub use orchestrator::{ChatOrchestrator, DEFAULT_TOP_K, DEFAULT_USER_ID, GREETING_REPLY};
pub use prompt::PromptBuilder;
pub use store::{ConversationStore, SessionGuard};
