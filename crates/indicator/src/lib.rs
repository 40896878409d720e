//! Status-indicator binding on top of `appind-toolkit`.
//!
//! An [`IndicatorHandle`] owns one native indicator, a GObject with the
//! indicator's properties and signals, and mirrors its
//! properties (id, icon, category, status, attention icon, menu, secondary
//! activation target) with typed accessors. Property writes are applied to
//! the native object synchronously; the resulting signals are queued on the
//! toolkit's main context and reach handlers and [`IndicatorObserver`]s only
//! when the loop runs, for example through [`EventLoopBridge::drain`].
//!
//! ```
//! use appind_indicator::{Category, EventLoopBridge, IndicatorHandle, Status};
//! use appind_toolkit::Toolkit;
//!
//! let toolkit = Toolkit::init();
//! let indicator = IndicatorHandle::new(&toolkit, "example", "app-icon", Category::ApplicationStatus)?;
//! let observer = indicator.observe();
//!
//! indicator.set_status(Status::Active);
//! assert_eq!(observer.status(), Status::Passive);
//!
//! EventLoopBridge::new(&toolkit).drain();
//! assert_eq!(observer.status(), Status::Active);
//! # Ok::<(), appind_indicator::IndicatorError>(())
//! ```

mod bridge;
pub mod error;
mod handle;
mod library;
mod native;
mod observer;
mod signals;
pub mod types;

pub use bridge::EventLoopBridge;
pub use error::IndicatorError;
pub use handle::{IndicatorBuilder, IndicatorHandle};
pub use library::IndicatorLibrary;
pub use native::IndicatorSnapshot;
pub use observer::IndicatorObserver;
pub use types::{Category, Flavor, Property, ScrollDirection, Status};
