//! Chat orchestrator: central coordinator for one incoming message.
//!
//! Per message: resolve the user, lock their history, append the user turn,
//! then either answer a greeting directly or retrieve products, build the
//! grounding prompt, and generate a reply. The history is saved once, at the
//! end, so a failure part-way through leaves it untouched.

use std::sync::Arc;

use tracing::{error, info};

use luxe_core::types::{ChatResponse, ConversationTurn, ProductCard};
use luxe_vector::RetrievalEngine;

use crate::error::ChatError;
use crate::greeting::GreetingDetector;
use crate::llm::LlmClient;
use crate::prompt::PromptBuilder;
use crate::store::ConversationStore;

/// User identifier used when a request does not name one.
pub const DEFAULT_USER_ID: &str = "default";

/// Fixed reply to greetings.
pub const GREETING_REPLY: &str = "Hello! 👋 Welcome to Luxe Fashion. If you’d like a personalized recommendation or have any questions about our premium collection, just let me know what you’re looking for!";

/// Products retrieved per message unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 2;

/// Coordinates greeting detection, retrieval, prompting, and generation.
pub struct ChatOrchestrator {
    retrieval: Arc<RetrievalEngine>,
    store: Arc<ConversationStore>,
    llm: Arc<dyn LlmClient>,
    prompt_builder: PromptBuilder,
    greeting_detector: GreetingDetector,
    top_k: usize,
}

impl ChatOrchestrator {
    pub fn new(
        retrieval: Arc<RetrievalEngine>,
        store: Arc<ConversationStore>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            retrieval,
            store,
            llm,
            prompt_builder: PromptBuilder,
            greeting_detector: GreetingDetector,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override how many products are retrieved per message.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Handle one chat message.
    ///
    /// Retrieval and generation failures never surface here; the only
    /// errors are conversation-store faults.
    pub async fn handle_message(
        &self,
        user_id: Option<&str>,
        message: &str,
    ) -> Result<ChatResponse, ChatError> {
        let user_id = user_id.unwrap_or(DEFAULT_USER_ID);
        info!(user_id, "Received message from user {}: {}", user_id, message);

        let mut session = self.store.lock(user_id).await?;
        let mut history = session.history().to_vec();
        history.push(ConversationTurn::user(message));

        if self.greeting_detector.is_greeting(message) {
            history.push(ConversationTurn::assistant(GREETING_REPLY));
            session.save(history.clone());
            return Ok(ChatResponse {
                result: GREETING_REPLY.to_string(),
                products: Vec::new(),
                history,
            });
        }

        let products = self.retrieval.search(message, self.top_k).await;
        info!(user_id, "Found {} products for query", products.len());

        let prompt = self.prompt_builder.build(&history, &products);

        let reply = match self.llm.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(user_id, error = %e, "LLM generation failed, using fallback reply");
                fallback_reply(&e)
            }
        };

        history.push(ConversationTurn::assistant(reply.clone()));
        session.save(history.clone());

        Ok(ChatResponse {
            result: reply,
            products: products.iter().map(ProductCard::from).collect(),
            history,
        })
    }
}

/// Apology shown when generation fails.
fn fallback_reply(err: &impl std::fmt::Display) -> String {
    format!(
        "I'm sorry, I'm having trouble generating a response right now. Error: {}",
        err
    )
}
