// Server module entry
// Listener setup, connection serving, shutdown signals and store upkeep

pub mod connection;
pub mod listener;
pub mod signal;
pub mod sweep;

// Rust does not allow `loop` as a module name (keyword), so use server_loop
#[path = "loop.rs"]
pub mod server_loop;

// Re-export commonly used items
pub use listener::create_reusable_listener;
pub use server_loop::run_server;
