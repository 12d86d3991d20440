//! Tauri IPC command handlers.
//!
//! Handlers perform parameter parsing and forward to the `services` layer for
//! business logic. Errors are stringified for the frontend.

pub mod maps;
pub mod receive;
pub mod settings;
