//! Outcome of one wrapped call.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::fmt;
use std::panic;
use std::sync::Once;

use thiserror::Error;

/// What made a wrapped call fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The function returned `Err`.
    Error,
    /// The function panicked.
    Panic,
}

/// A failure absorbed at the wrapper boundary.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct Failure {
    kind: FailureKind,
    message: String,
    context: String,
}

impl Failure {
    /// Captures an `Err` value: its `Display` text as the message, its `Debug`
    /// form (and a backtrace when `RUST_BACKTRACE` enables one) as context.
    pub fn from_error<E: fmt::Display + fmt::Debug + ?Sized>(error: &E) -> Self {
        Self {
            kind: FailureKind::Error,
            message: error.to_string(),
            context: with_backtrace(format!("{error:?}")),
        }
    }

    /// Captures a panic payload, together with the location and backtrace
    /// recorded on this thread when the panic was raised.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = panic_message(payload);
        let context = match LAST_PANIC.with(|slot| slot.borrow_mut().take()) {
            Some(site) => site.describe(&message),
            None => format!("panicked: {message}"),
        };
        Self {
            kind: FailureKind::Panic,
            context,
            message,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Text of the diagnostic entry: the message, then the context.
    pub fn report(&self) -> String {
        format!("{}\n{}", self.message, self.context)
    }
}

fn with_backtrace(context: String) -> String {
    append_backtrace(context, &Backtrace::capture())
}

fn append_backtrace(mut context: String, backtrace: &Backtrace) -> String {
    if backtrace.status() == BacktraceStatus::Captured {
        context.push_str("\nstack backtrace:\n");
        context.push_str(&backtrace.to_string());
    }
    context
}

// Where the most recent panic on this thread was raised
struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

impl PanicSite {
    fn describe(self, message: &str) -> String {
        let context = match self.location {
            Some(location) => format!("panicked at {location}: {message}"),
            None => format!("panicked: {message}"),
        };
        append_backtrace(context, &self.backtrace)
    }
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

/// Installs (once per process) a panic hook that records the panic site for
/// [`Failure::from_panic`], then forgets any site left over on this thread.
///
/// The hook chains to the one installed before it, so panic reports printed
/// by the previous hook are unchanged. A hook installed afterwards replaces
/// it, and panic failures then carry only their message.
pub(crate) fn watch_panics() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::capture(),
            };
            // the slot is gone while the thread itself is being torn down
            let _ = LAST_PANIC.try_with(|slot| *slot.borrow_mut() = Some(site));
            previous(info);
        }));
    });
    LAST_PANIC.with(|slot| slot.borrow_mut().take());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Result of one wrapped call, tagged so that a failure can be told apart
/// from a successful `None`.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    /// Collapses the outcome to the sentinel form: `None` on failure.
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<Outcome<T>> for Result<T, Failure> {
    fn from(outcome: Outcome<T>) -> Self {
        outcome.into_result()
    }
}

/// Return types whose `Err` side counts as a failure of the wrapped call.
pub trait Fallible {
    type Ok;
    type Err;

    fn into_result(self) -> Result<Self::Ok, Self::Err>;
}

impl<T, E> Fallible for Result<T, E> {
    type Ok = T;
    type Err = E;

    fn into_result(self) -> Result<T, E> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk full ({free} bytes free)")]
    struct DiskFull {
        free: u64,
    }

    #[test]
    fn error_failure_keeps_message_and_debug_context() {
        let failure = Failure::from_error(&DiskFull { free: 0 });

        assert_eq!(failure.kind(), FailureKind::Error);
        assert_eq!(failure.message(), "disk full (0 bytes free)");
        assert!(failure.context().starts_with("DiskFull { free: 0 }"));
        assert!(
            failure
                .report()
                .starts_with("disk full (0 bytes free)\nDiskFull { free: 0 }")
        );
        assert_eq!(failure.to_string(), "disk full (0 bytes free)");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let opaque: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(Failure::from_panic(static_str.as_ref()).message(), "boom");
        assert_eq!(Failure::from_panic(owned.as_ref()).message(), "owned boom");
        assert_eq!(Failure::from_panic(opaque.as_ref()).message(), "Box<dyn Any>");
        assert_eq!(
            Failure::from_panic(static_str.as_ref()).kind(),
            FailureKind::Panic
        );
    }

    #[test]
    fn panic_site_is_named_in_the_context() {
        watch_panics();

        let line = line!() + 1;
        let payload = panic::catch_unwind(|| -> u8 { panic!("bottom of the stack") }).unwrap_err();
        let failure = Failure::from_panic(payload.as_ref());

        assert_eq!(failure.message(), "bottom of the stack");
        assert!(
            failure
                .context()
                .starts_with(&format!("panicked at {}:{line}:", file!())),
            "{}",
            failure.context()
        );
    }

    #[test]
    fn sentinel_and_tagged_views() {
        let ok: Outcome<Option<u8>> = Outcome::Success(None);
        assert!(ok.is_success());
        assert_eq!(ok.into_option(), Some(None));

        let failed: Outcome<Option<u8>> = Outcome::Failure(Failure::from_error("nope"));
        assert!(failed.is_failure());
        assert_eq!(failed.failure().map(Failure::message), Some("nope"));
        assert!(failed.into_result().is_err());
    }

    #[test]
    fn fallible_for_result() {
        let ok: Result<u8, String> = Ok(1);
        assert_eq!(Fallible::into_result(ok), Ok(1));
    }
}
