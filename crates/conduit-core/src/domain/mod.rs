//! Domain model (IDs, message type keys, chat boundary types).

pub mod chat;
pub mod ids;
pub mod message;

pub use chat::{ChatMessage, ChatRole, TurnToken};
pub use ids::{ExecutorId, Id, IdMarker, RunId};
pub use message::{Message, MessageType};
