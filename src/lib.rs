//! Reminder scheduling and real-time notification delivery for the task
//! dashboard: a daily due-date evaluator with idempotent email sends, an
//! SSE gateway fanning new notifications out to connected clients, and an
//! embeddable client that keeps an unread-count view alive through
//! reconnects and offline fallbacks.

pub mod auth;
pub mod client;
pub mod db;
pub mod error;
pub mod middleware;
pub mod notification;
pub mod reminder;
pub mod routes;
pub mod sse;
pub mod state;
pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_support;
