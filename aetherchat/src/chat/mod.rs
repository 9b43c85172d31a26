//! Chat session state and its terminal front end.

mod controller;
mod render;
mod repl;

pub use controller::{Conversation, Submission};
pub use render::{render_exchange, render_message};
pub use repl::run_repl;
