//! Platform identification and board driver selection.
//!
//! The platform identifier is resolved once at startup ([`identify`]) and
//! mapped onto one of the drivers compiled into this build ([`Registry`]).
//! No code is loaded at runtime.

pub mod error;
mod platform;
mod registry;
mod virtual_board;

pub use crate::platform::{PLATFORM_ENV, identify, parse_machine_conf};
pub use crate::registry::{Constructor, Entry, Registry};
pub use crate::virtual_board::image::{self, VirtualImage};
pub use crate::virtual_board::{STATE_KEY, VirtualBoard};
