// Session coordination: the turn-order state machine, vote resolution and
// the orchestration layer tying them to the room store and event bus.
//
// `scheduler` and `voting` are pure; `SessionCoordinator` is the only
// component in the crate that mutates room state.

// Public API - what other modules can use
pub use coordinator::SessionCoordinator;

pub mod scheduler;
pub mod voting;

// Internal modules
mod coordinator;
