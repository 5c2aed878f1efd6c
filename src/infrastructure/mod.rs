//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up the session.

pub mod di;
pub mod error;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use traits::{
    FileSlotStore, InstantTicker, MemorySlotStore, RealTicker, SlotEntry, SlotStore, Ticker,
};
