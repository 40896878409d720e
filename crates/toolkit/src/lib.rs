//! GLib toolkit context consumed by the indicator binding.
//!
//! - [`Toolkit`]: explicit, thread-confined toolkit context with an
//!   init/teardown lifecycle. It owns a `glib::MainContext`; native objects
//!   queue their notifications there and nothing is delivered until an
//!   iteration runs.
//! - [`RemoteSender`]: the only cross-thread entry point.
//!
//! `glib` and `gio` are re-exported so that dependents build against the
//! same versions.

mod context;
pub mod error;
mod object;
mod remote;

pub use context::Toolkit;
pub use error::ToolkitError;
pub use object::{HandlerId, ObjectId};
pub use remote::RemoteSender;

pub use gio;
pub use glib;
