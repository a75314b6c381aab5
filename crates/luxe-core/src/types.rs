//! Shared domain types: catalog records, conversation turns, and the
//! response shapes returned to chat clients.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// Product identifier as written by the catalog build step.
///
/// Catalogs in the wild use both numeric and string identifiers, so both
/// are accepted and rendered verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Int(id) => write!(f, "{}", id),
            ProductId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId::Int(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

/// An immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// Kept as the catalog's JSON number so prompts render it unchanged.
    pub price: serde_json::Number,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductRecord {
    /// Storefront path for this product.
    pub fn link(&self) -> String {
        format!("/product/{}", self.id)
    }
}

// =============================================================================
// Conversation
// =============================================================================

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Capitalized label used when rendering transcripts.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Chronological turns for one user.
pub type ConversationHistory = Vec<ConversationTurn>;

// =============================================================================
// Responses
// =============================================================================

/// Compact product projection shown alongside a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCard {
    pub name: String,
    /// First image URL, or empty when the product has none.
    pub image: String,
    pub link: String,
}

impl From<&ProductRecord> for ProductCard {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            image: record.images.first().cloned().unwrap_or_default(),
            link: record.link(),
        }
    }
}

/// Reply to one chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub result: String,
    pub products: Vec<ProductCard>,
    pub history: ConversationHistory,
}

/// Process-wide readiness flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthStatus {
    pub api_key_configured: bool,
    pub products_loaded: bool,
    pub faiss_index_loaded: bool,
    pub embedder_loaded: bool,
}
