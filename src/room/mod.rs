// Public API - what other modules can use
pub use cleanup_task::start_cleanup_task;
pub use directory::{ReapSummary, RoomDirectory};
pub use models::{Member, RoundState};
pub use service::{Room, RoomSweep};
pub use state::{Admission, Outbound, RoomState};

// Internal modules
pub mod cleanup_task;
mod directory;
pub mod models;
mod service;
mod state;
