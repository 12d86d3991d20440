//! Business logic layer.
//!
//! Map file reception, the installed map library, progress publishing and
//! retry handling. Called by the `commands` layer; delegates HTTP interactions
//! to the `api` layer and persistence to the `storage` layer.

pub mod map_library;
pub mod map_receiver;
pub mod progress;
pub mod receive_engine;
pub mod retry;
