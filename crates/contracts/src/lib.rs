//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! message value objects, the broker capability traits, the clock and the
//! error taxonomy. Business crates depend on this crate, never the reverse.
//!
//! ## Time Model
//! - Dispatches carry no timestamp; the writer stamps `WireMessage` from an
//!   injected [`Clock`] at translation time

mod channel;
mod clock;
mod config;
mod destination;
mod dispatch;
mod error;

pub use channel::{Channel, Controller};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::*;
pub use destination::{Destination, MAX_DESTINATION_LEN};
pub use dispatch::{DeliveryMode, Dispatch, WireMessage};
pub use error::*;
