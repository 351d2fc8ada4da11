//! Host-side helpers for the `virtual-radar` engine.
//!
//! - [`classify_change`] compares two item lists by key and reports whether the new one is a
//!   prepend, an append, unchanged, or needs a reset.
//! - [`Controller`] owns a radar, its frame scheduler and the host, and turns item list updates
//!   into the matching radar calls.
//! - [`ScrollTween`] animates the scroll container towards an item.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod change;
mod controller;
mod tween;


pub use change::{Change, classify_change};
pub use controller::{Controller, EventPump};
pub use tween::{Easing, ScrollTween};
