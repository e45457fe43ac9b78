//! Per-object runtime: a key-path data store with change notification, an
//! ordered multi-handler event bus, debounced invocation, and structural
//! class composition.
//!
//! Each capability is a trait with default methods over state the host
//! owns:
//!
//! - [`DebounceManager`] coalesces repeated calls of the same callable.
//! - [`EventsManager`] subscribes, unsubscribes and dispatches events.
//! - [`DataManager`] stores a JSON tree and emits `change:<path>` for the
//!   written path and each of its ancestors.
//!
//! [`Base`] implements all three and describes its named methods with a
//! [`Class`], composed by [`Class::mixin`].
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use class_base::{Base, Callback, ChangeEvent, DataManager, EventsManager};
//! use serde_json::json;
//!
//! let mut base = Base::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! base.on(
//!     "change:library",
//!     Callback::new(move |_: &mut Base, args| {
//!         let event = ChangeEvent::from_args(args).unwrap();
//!         assert_eq!(event.target, "library.book.name");
//!         counter.set(counter.get() + 1);
//!         Ok(())
//!     }),
//! );
//! base.set("library.book.name", json!("New York")).unwrap();
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! Nothing runs in the background. Debounced work waits in a timer queue
//! until [`DebounceManager::run_timers`] is called.

mod error;

pub mod base;
pub mod callback;
pub mod clock;
pub mod data;
pub mod debounce;
pub mod event;
pub mod mix;
pub mod options;
pub mod timer;

pub use base::{Base, BaseBuilder, INITIALIZE};
pub use callback::{CallableId, Callback, Handler, HandlerKey};
pub use clock::{Clock, ManualClock, SystemClock};
pub use data::{data_manager_class, ChangeEvent, DataManager};
pub use debounce::{debounce_manager_class, DebounceManager, DebounceRegistry};
pub use error::{BoxError, Error, Result};
pub use event::{events_manager_class, EventTable, EventsManager};
pub use mix::{Class, StaticFn, StaticMember, RESERVED_MEMBERS};
pub use options::Options;
pub use timer::{TimerId, TimerQueue, TimerTask};

pub use class_base_key_path as key_path;

/// Traits needed to call the capability methods on a host.
pub mod prelude {
    pub use crate::{DataManager, DebounceManager, EventsManager};
}
