//! Logging around a single call, shared by the sync and async wrappers.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;

use crate::outcome::{self, Failure, Fallible, Outcome};
use crate::render::Invocation;
use crate::sink::{IntoSink, Level, SinkRef};

/// The wrapped function's name together with the sink it logs into.
#[derive(Clone)]
pub struct CallSite {
    name: Cow<'static, str>,
    sink: SinkRef,
}

impl CallSite {
    pub fn new(name: impl Into<Cow<'static, str>>, sink: impl IntoSink) -> Self {
        Self {
            name: name.into(),
            sink: sink.into_sink(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sink(&self) -> &SinkRef {
        &self.sink
    }

    /// Emits `calling <name>(<args>)`.
    pub fn calling(&self, invocation: &Invocation) {
        self.sink
            .emit(Level::Info, &format!("calling {}({invocation})", self.name));
    }

    /// Emits `'<name>' returned <value>`.
    pub fn returned(&self, value: &dyn fmt::Debug) {
        self.sink
            .emit(Level::Info, &format!("'{}' returned {value:?}", self.name));
    }

    /// Emits the diagnostic entry for a failed call.
    pub fn failed(&self, failure: &Failure) {
        self.sink.emit(Level::Diagnostic, &failure.report());
    }

    /// Emits the terminal entry matching `outcome` and hands it back.
    pub fn record<T: fmt::Debug>(&self, outcome: Outcome<T>) -> Outcome<T> {
        match &outcome {
            Outcome::Success(value) => self.returned(value),
            Outcome::Failure(failure) => self.failed(failure),
        }
        outcome
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallSite")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runs `f` on the current thread; a panic is the only failure.
pub fn invoke<R, F>(site: &CallSite, f: F) -> Outcome<R>
where
    F: FnOnce() -> R,
    R: fmt::Debug,
{
    outcome::watch_panics();
    let outcome = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Outcome::Success(value),
        Err(payload) => Outcome::Failure(Failure::from_panic(payload.as_ref())),
    };
    site.record(outcome)
}

/// Runs a `Result`-returning `f`; both `Err` and a panic are failures.
pub fn invoke_result<R, F>(site: &CallSite, f: F) -> Outcome<R::Ok>
where
    F: FnOnce() -> R,
    R: Fallible,
    R::Ok: fmt::Debug,
    R::Err: fmt::Display + fmt::Debug,
{
    outcome::watch_panics();
    let outcome = match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(returned) => settle(returned),
        Err(payload) => Outcome::Failure(Failure::from_panic(payload.as_ref())),
    };
    site.record(outcome)
}

/// Awaits `future`; a panic while polling is the only failure.
///
/// Dropping the returned future drops `future` and records nothing.
pub async fn invoke_async<R, Fut>(site: &CallSite, future: Fut) -> Outcome<R>
where
    Fut: Future<Output = R>,
    R: fmt::Debug,
{
    outcome::watch_panics();
    let outcome = match AssertUnwindSafe(future).catch_unwind().await {
        Ok(value) => Outcome::Success(value),
        Err(payload) => Outcome::Failure(Failure::from_panic(payload.as_ref())),
    };
    site.record(outcome)
}

/// Awaits a `Result`-producing `future`; both `Err` and a panic are failures.
pub async fn invoke_async_result<R, Fut>(site: &CallSite, future: Fut) -> Outcome<R::Ok>
where
    Fut: Future<Output = R>,
    R: Fallible,
    R::Ok: fmt::Debug,
    R::Err: fmt::Display + fmt::Debug,
{
    outcome::watch_panics();
    let outcome = match AssertUnwindSafe(future).catch_unwind().await {
        Ok(returned) => settle(returned),
        Err(payload) => Outcome::Failure(Failure::from_panic(payload.as_ref())),
    };
    site.record(outcome)
}

fn settle<R>(returned: R) -> Outcome<R::Ok>
where
    R: Fallible,
    R::Err: fmt::Display + fmt::Debug,
{
    match returned.into_result() {
        Ok(value) => Outcome::Success(value),
        Err(error) => Outcome::Failure(Failure::from_error(&error)),
    }
}
