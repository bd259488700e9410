// Ponder - inference-time compute strategies over completion APIs
// Library exports

pub mod cli;
pub mod config;
pub mod conversation;
pub mod providers;
pub mod strategies;
pub mod usage;

pub use conversation::{Conversation, ScopedExtension};
pub use providers::{CompletionRequest, CompletionResponse, CompletionService, Message, Role};
pub use strategies::{Approach, ApproachOutput};
pub use usage::TokenUsage;
