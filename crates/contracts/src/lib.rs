//! # Contracts
//!
//! Frozen interface contracts shared by every radiator crate.
//! Business crates depend on this crate only, never the other way round.
//!
//! ## Data flow
//! - A `FetchFunction` produces `Content` on a channel's isolated worker
//! - A `RenderFunction` consumes the latest `Content` on the channel's consumer task
//! - Empty `Content` means "no data this cycle", never an error

mod blueprint;
mod content;
mod error;
mod fetch;
mod layout;

pub use blueprint::*;
pub use content::*;
pub use error::*;
pub use fetch::{into_fetch_function, ContentProvider, FetchFunction, RenderFunction};
pub use layout::ScreenLayout;
