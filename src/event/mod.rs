// Broadcast fan-out for room state changes
//
// The coordinator commits state first and publishes second; a lost or
// duplicated delivery is harmless because every payload carries the full
// room slice and clients replace rather than append.

// Public API - what other modules can use
pub use bus::EventBus;
pub use events::{channel_name, RoomEvent};

// Internal modules
mod bus;
mod events;
