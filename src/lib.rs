pub mod chat;
pub mod config;
pub mod dispatch;
pub mod session;
pub mod snapshot;
