//! Value types shared by the extractors and the catalog engine.

pub mod location;
pub mod message;

pub use location::{LineIndex, Location};
pub use message::{Message, MessageKind};
