//! A windowing and recycling engine for virtualized scrolling lists.
//!
//! Only a bounded window of items is materialized as live slots. The rest is represented by two
//! boundary markers sized like the hidden content. As the user scrolls, slots leaving the window
//! are recycled for items entering it, so DOM creation and movement stay proportional to the
//! scroll distance rather than the list length.
//!
//! The engine is host-agnostic. A host provides:
//! - a [`Dom`] implementation (tree edits, measurement, scroll offsets, events);
//! - a [`Scheduler`] that runs frame phases (a [`FrameScheduler`] is included);
//! - an [`ItemSource`] with the items.
//!
//! [`MemoryDom`] is an in-memory host used by the tests and demos.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod boundary;
mod error;
mod fenwick;
mod host;
mod items;
mod math;
mod measured_policy;
pub mod memory;
mod options;
mod policy;
mod pool;
mod radar;
pub mod scheduler;
mod slot;
mod static_policy;
mod types;

#[cfg(test)]
mod tests;

pub use boundary::{Boundary, Side};
pub use error::RadarError;
pub use host::{Dom, SlotBounds, insert_range_before};
pub use items::ItemSource;
pub use measured_policy::MeasuredPolicy;
pub use memory::MemoryDom;
pub use options::{EstimateSize, RadarOptions};
pub use policy::{IndexPolicy, Measurements, buffer_items};
pub use radar::Radar;
pub use scheduler::{FrameScheduler, Job, JobId, Phase, Scheduler, Token};
pub use slot::{Slot, SlotId};
pub use static_policy::StaticPolicy;
pub use types::{Action, Axis, ClientRect, EdgeLatch, Geometry, Lifecycle, Window};
