//! Chatmask manages the masks of an LLM chat client: named assistant presets
//! bundling a model configuration, seed context messages, and display metadata.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the mask model, the persisted mask store with its
//!   versioned migrations, configuration, and session selection.
//! - [`api`] builds the normalized chat request a mask produces and decides
//!   which endpoint it goes to.
//! - [`utils`] holds id generation, URL helpers, and logging setup.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
