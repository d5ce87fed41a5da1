// WebSocket delivery of room events to connected clients

// Public API
pub use socket::room_events;

// Internal modules
mod socket;
