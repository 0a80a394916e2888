//! Python-style call logging for Rust functions.
//!
//! A wrapped function logs `calling name(args)` before it runs. On success it
//! logs `'name' returned value` and returns `Some(value)`. If it returns `Err`
//! or panics, a diagnostic entry with the message and its context is logged
//! and the caller gets `None`. The error is not propagated.
//!
//! Functions are wrapped at their definition with the [`addlogging`]
//! attribute, or at runtime with [`AddLogging`] / [`logged!`]:
//!
//! ```
//! use std::sync::{Arc, LazyLock};
//! use addlogging::{addlogging, Level, MemorySink};
//!
//! static SINK: LazyLock<Arc<MemorySink>> = LazyLock::new(Default::default);
//!
//! #[addlogging(sink = SINK.clone())]
//! fn add_one(x: i32) -> i32 {
//!     x + 1
//! }
//!
//! #[addlogging(sink = SINK.clone())]
//! fn divide(a: i32, b: i32) -> i32 {
//!     a / b
//! }
//!
//! assert_eq!(add_one(41), Some(42));
//! assert_eq!(divide(1, 0), None);
//!
//! let entries = SINK.entries();
//! assert_eq!(entries[0].message, "calling add_one(41)");
//! assert_eq!(entries[1].message, "'add_one' returned 42");
//! assert_eq!(entries[2].message, "calling divide(1, 0)");
//! assert_eq!(entries[3].level, Level::Diagnostic);
//! assert!(entries[3].message.contains("divide by zero"));
//! ```
//!
//! Wrappers without an explicit sink log into [`shared_sink`], a
//! [`TracingSink`] unless the application installs its own with
//! [`install_shared_sink`]. With the `subscriber` feature, [`setup::init`]
//! installs a console and file `tracing` subscriber.
//!
//! Wrapping a wrapped function logs once per layer.

// lets `::addlogging::...` paths emitted by the attribute resolve inside this crate
extern crate self as addlogging;

mod call;
mod logged;
mod outcome;
mod render;
mod sink;

#[cfg(feature = "subscriber")]
pub mod setup;

pub use addlogging_macros::addlogging;
pub use call::{CallSite, invoke, invoke_async, invoke_async_result, invoke_result};
pub use logged::{
    AddLogging, Arguments, AsyncLayer, Callable, Logged, TryAsyncLayer, TryLayer,
};
pub use outcome::{Failure, FailureKind, Fallible, Outcome};
pub use render::{Invocation, render};
pub use sink::{
    Entry, IntoSink, Level, MemorySink, Sink, SinkAlreadyInstalled, SinkRef, TracingSink,
    install_shared_sink, shared_sink,
};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{Level, MemorySink, addlogging};

    #[test]
    fn attribute_expands_inside_the_crate() {
        let sink = Arc::new(MemorySink::new());

        #[addlogging(sink = sink)]
        fn double(sink: &Arc<MemorySink>, x: u8) -> u8 {
            x * 2
        }

        assert_eq!(double(&sink, 4), Some(8));
        let entries = sink.entries();
        assert!(entries[0].message.starts_with("calling double(MemorySink {"));
        assert!(entries[0].message.ends_with(", 4)"));
        assert_eq!(entries[1].level, Level::Info);
        assert_eq!(entries[1].message, "'double' returned 8");
    }
}
