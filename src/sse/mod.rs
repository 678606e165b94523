pub mod frames;
pub mod registry;
pub mod sse_handlers;

pub use frames::StreamFrame;
pub use registry::{ConnectionId, ConnectionRegistry};
pub use sse_handlers::notification_stream;
