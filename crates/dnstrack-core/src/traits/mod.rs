//! Core traits for the tracker
//!
//! This module defines the abstract interfaces the poll loop depends on.
//!
//! - [`StateStore`]: Durable working set (load / persist)
//! - [`Resolver`]: DNS `A` lookups with a closed failure taxonomy
//! - [`Tracker`]: Append-only history of observed resolutions
//! - [`Clock`]: Source of Unix time

pub mod state_store;
pub mod resolver;
pub mod tracker;
pub mod clock;

pub use state_store::StateStore;
pub use resolver::{Resolver, Resolution, ResolveFailure, FailureKind};
pub use tracker::{Tracker, TrackEntry};
pub use clock::{Clock, SystemClock};
