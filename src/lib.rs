// Library crate for the rostrum debate coordinator
// This file exposes the public API for integration tests

pub mod debate;
pub mod event;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use debate::SessionCoordinator;
pub use event::{channel_name, EventBus, RoomEvent};
pub use room::models::{Ballot, DebateMode, Participant, Room, Side, Stage};
pub use room::store::RoomStore;
pub use shared::{AppError, AppState};
