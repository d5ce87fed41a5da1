// Room state, its authoritative store, and the HTTP surface over it

// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use handlers::{
    begin_debate, begin_voting, cast_vote, create_room, get_room, join_room, submit_turn,
};

pub mod models;
pub mod store;
pub mod types;

// Internal modules
mod cleanup_task;
mod handlers;
