//! Chat-with-data: a single blocking round trip to the text-to-SQL service,
//! rendered either as one buffered value or as ordered event segments.

pub mod client;
pub mod events;

pub use client::{ChatClient, ChatResponse};
pub use events::{ChatEvent, ChatMode, render_sse, segments};
