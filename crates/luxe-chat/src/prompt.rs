//! Grounding prompt construction.
//!
//! The prompt text is part of the service's observable behaviour: the
//! template wording, the transcript layout, and the 220-character
//! description cut are reproduced exactly.

use luxe_core::types::{ConversationTurn, ProductRecord};

/// Characters of each product description included in the prompt.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 220;

/// Builds the single prompt sent to the text-generation service.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render `history` and `products` into the consultant prompt.
    pub fn build(&self, history: &[ConversationTurn], products: &[ProductRecord]) -> String {
        let chat = render_history(history);
        let prods = render_products(products);

        format!(
            "You are a luxury fashion sales consultant. \
             Act warm, empathetic, and proactive in finding the perfect fit, \
             only recommending from the provided products.\n\n\
             Conversation so far:\n{chat}\n\n\
             if the conversation history is not relevant dont use it.\n\n\
             Products to recommend from:\n{prods}\n\n\
             Respond naturally, build on the conversation context, and explain why the product(s) \
             fit the customer's needs. \
             If the user asks for something not in the product list, \
             politely explain that you can only recommend from the provided products.\n\n"
        )
    }
}

/// One `Role: content` line per turn, oldest first.
fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A bullet per product: name, price, and a truncated description.
fn render_products(products: &[ProductRecord]) -> String {
    products
        .iter()
        .map(|p| {
            let preview: String = p.description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
            format!("- {} (${})\n  {}...", p.name, p.price, preview)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
