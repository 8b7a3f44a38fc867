//! Application module: the model the UI draws and the reducer that turns
//! messages into a new model plus side effects.
//!
//! The runtime owns the `App` value and replaces it with the output of
//! `update` on every message; effects are executed outside the reducer.

pub mod keymap;
mod model;
mod update;

pub use model::*;
pub use update::{Effect, Msg, update};
