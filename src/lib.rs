//! treewalk: binary trees from array literals, laid out and replayed step by step.
//!
//! Layers, innermost first: [`domain`] (tree model and pure algorithms),
//! [`application`] (session context, playback, render frames),
//! [`infrastructure`] (slot store, ticker, DI container) and [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
