//! Core types for the Agora debate engine.
//!
//! The argument tree of a debate, the operations that grow it, the
//! reply-context composer, vote tallies, and the contract spoken with an
//! external analysis service. This crate is free of HTTP dependencies.

// Native `async fn`-returning traits; the futures carry explicit `Send`
// bounds where the runtime needs them.
#![allow(async_fn_in_trait)]

pub mod analysis;
pub mod composer;
pub mod debate;
pub mod error;
pub mod forest;
pub mod node;
pub mod participant;
pub mod session;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
