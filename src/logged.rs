//! Wrapping of function values at runtime, for closures and for functions
//! that cannot carry the `#[addlogging]` attribute.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::call::{self, CallSite};
use crate::outcome::{Fallible, Outcome};
use crate::render::Invocation;
use crate::sink::{IntoSink, SinkRef, shared_sink};

/// Argument tuples that can be rendered into an [`Invocation`].
pub trait Arguments {
    fn invocation(&self) -> Invocation;
}

/// Functions callable with an argument tuple.
pub trait Callable<Args> {
    type Output;

    fn call_with(&self, args: Args) -> Self::Output;
}

macro_rules! tuple_impls {
    ($($name:ident)*) => {
        impl<$($name: fmt::Debug),*> Arguments for ($($name,)*) {
            #[allow(non_snake_case)]
            fn invocation(&self) -> Invocation {
                let ($($name,)*) = self;
                Invocation::new()$(.arg($name))*
            }
        }

        impl<Func, Ret, $($name),*> Callable<($($name,)*)> for Func
        where
            Func: Fn($($name),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn call_with(&self, ($($name,)*): ($($name,)*)) -> Ret {
                self($($name),*)
            }
        }
    };
}

tuple_impls!();
tuple_impls!(A);
tuple_impls!(A B);
tuple_impls!(A B C);
tuple_impls!(A B C D);
tuple_impls!(A B C D E);
tuple_impls!(A B C D E F);
tuple_impls!(A B C D E F G);
tuple_impls!(A B C D E F G H);

/// Wrapping configuration: the sink every wrapper built from it logs into.
///
/// ```
/// use std::sync::Arc;
/// use addlogging::{AddLogging, MemorySink};
///
/// let sink = Arc::new(MemorySink::new());
/// let add_one = AddLogging::with_sink(&sink).apply("add_one", |x: i32| x + 1);
///
/// assert_eq!(add_one.call((41,)), Some(42));
/// assert_eq!(sink.messages(), ["calling add_one(41)", "'add_one' returned 42"]);
/// ```
#[derive(Clone)]
pub struct AddLogging {
    sink: SinkRef,
}

impl AddLogging {
    /// Logs into [`shared_sink`].
    pub fn new() -> Self {
        Self {
            sink: shared_sink(),
        }
    }

    pub fn with_sink(sink: impl IntoSink) -> Self {
        Self {
            sink: sink.into_sink(),
        }
    }

    pub fn apply<F>(&self, name: impl Into<Cow<'static, str>>, f: F) -> Logged<F> {
        Logged {
            site: CallSite::new(name, &self.sink),
            f,
        }
    }
}

impl Default for AddLogging {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AddLogging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddLogging").finish_non_exhaustive()
    }
}

/// A function wrapped with call logging.
///
/// Arguments are passed as a tuple. `call*` methods return `None` on failure;
/// `outcome*` methods return the tagged [`Outcome`] instead. The `try_`
/// variants treat an `Err` return as a failure and unwrap `Ok`.
#[derive(Clone)]
pub struct Logged<F> {
    site: CallSite,
    f: F,
}

impl<F> Logged<F> {
    pub fn name(&self) -> &str {
        self.site.name()
    }

    pub fn sink(&self) -> &SinkRef {
        self.site.sink()
    }

    pub fn inner(&self) -> &F {
        &self.f
    }

    pub fn into_inner(self) -> F {
        self.f
    }

    pub fn outcome<A>(&self, args: A) -> Outcome<F::Output>
    where
        F: Callable<A>,
        F::Output: fmt::Debug,
        A: Arguments,
    {
        self.site.calling(&args.invocation());
        call::invoke(&self.site, || self.f.call_with(args))
    }

    pub fn call<A>(&self, args: A) -> Option<F::Output>
    where
        F: Callable<A>,
        F::Output: fmt::Debug,
        A: Arguments,
    {
        self.outcome(args).into_option()
    }

    pub fn try_outcome<A>(&self, args: A) -> Outcome<<F::Output as Fallible>::Ok>
    where
        F: Callable<A>,
        F::Output: Fallible,
        <F::Output as Fallible>::Ok: fmt::Debug,
        <F::Output as Fallible>::Err: fmt::Display + fmt::Debug,
        A: Arguments,
    {
        self.site.calling(&args.invocation());
        call::invoke_result(&self.site, || self.f.call_with(args))
    }

    pub fn try_call<A>(&self, args: A) -> Option<<F::Output as Fallible>::Ok>
    where
        F: Callable<A>,
        F::Output: Fallible,
        <F::Output as Fallible>::Ok: fmt::Debug,
        <F::Output as Fallible>::Err: fmt::Display + fmt::Debug,
        A: Arguments,
    {
        self.try_outcome(args).into_option()
    }

    pub async fn outcome_async<A>(&self, args: A) -> Outcome<<F::Output as Future>::Output>
    where
        F: Callable<A>,
        F::Output: Future,
        <F::Output as Future>::Output: fmt::Debug,
        A: Arguments,
    {
        self.site.calling(&args.invocation());
        // the future is created on first poll so a panic while building it is caught too
        call::invoke_async(&self.site, async move { self.f.call_with(args).await }).await
    }

    pub async fn call_async<A>(&self, args: A) -> Option<<F::Output as Future>::Output>
    where
        F: Callable<A>,
        F::Output: Future,
        <F::Output as Future>::Output: fmt::Debug,
        A: Arguments,
    {
        self.outcome_async(args).await.into_option()
    }

    pub async fn try_outcome_async<A>(
        &self,
        args: A,
    ) -> Outcome<<<F::Output as Future>::Output as Fallible>::Ok>
    where
        F: Callable<A>,
        F::Output: Future,
        <F::Output as Future>::Output: Fallible,
        <<F::Output as Future>::Output as Fallible>::Ok: fmt::Debug,
        <<F::Output as Future>::Output as Fallible>::Err: fmt::Display + fmt::Debug,
        A: Arguments,
    {
        self.site.calling(&args.invocation());
        call::invoke_async_result(&self.site, async move { self.f.call_with(args).await }).await
    }

    /// Lets this wrapper be wrapped again with its `Err` returns counted as
    /// failures, as [`Logged::try_call`] does.
    pub fn try_layer(self) -> TryLayer<F> {
        TryLayer(self)
    }

    /// Lets this async wrapper be wrapped again. Calls yield a boxed future
    /// driving [`Logged::call_async`].
    pub fn async_layer(self) -> AsyncLayer<F> {
        AsyncLayer(Arc::new(self))
    }

    /// Async counterpart of [`Logged::try_layer`].
    pub fn try_async_layer(self) -> TryAsyncLayer<F> {
        TryAsyncLayer(Arc::new(self))
    }

    pub async fn try_call_async<A>(
        &self,
        args: A,
    ) -> Option<<<F::Output as Future>::Output as Fallible>::Ok>
    where
        F: Callable<A>,
        F::Output: Future,
        <F::Output as Future>::Output: Fallible,
        <<F::Output as Future>::Output as Fallible>::Ok: fmt::Debug,
        <<F::Output as Future>::Output as Fallible>::Err: fmt::Display + fmt::Debug,
        A: Arguments,
    {
        self.try_outcome_async(args).await.into_option()
    }
}

// Lets a wrapper be wrapped again; each layer logs its own pair of entries.
// The inner layer runs through `call`, so `Err` is logged as a returned value
// and futures are not awaited; `try_layer` and the async layers cover those.
impl<F, A> Callable<A> for Logged<F>
where
    F: Callable<A>,
    F::Output: fmt::Debug,
    A: Arguments,
{
    type Output = Option<F::Output>;

    fn call_with(&self, args: A) -> Self::Output {
        self.call(args)
    }
}

/// A [`Logged`] that runs through [`Logged::try_call`] when wrapped again.
#[derive(Clone)]
pub struct TryLayer<F>(Logged<F>);

impl<F, A> Callable<A> for TryLayer<F>
where
    F: Callable<A>,
    F::Output: Fallible,
    <F::Output as Fallible>::Ok: fmt::Debug,
    <F::Output as Fallible>::Err: fmt::Display + fmt::Debug,
    A: Arguments,
{
    type Output = Option<<F::Output as Fallible>::Ok>;

    fn call_with(&self, args: A) -> Self::Output {
        self.0.try_call(args)
    }
}

/// A [`Logged`] async function that runs through [`Logged::call_async`] when
/// wrapped again.
pub struct AsyncLayer<F>(Arc<Logged<F>>);

impl<F> Clone for AsyncLayer<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F, A> Callable<A> for AsyncLayer<F>
where
    F: Callable<A> + Send + Sync + 'static,
    F::Output: Future + Send,
    <F::Output as Future>::Output: fmt::Debug + Send,
    A: Arguments + Send + 'static,
{
    type Output = BoxFuture<'static, Option<<F::Output as Future>::Output>>;

    fn call_with(&self, args: A) -> Self::Output {
        let logged = Arc::clone(&self.0);
        async move { logged.call_async(args).await }.boxed()
    }
}

/// A [`Logged`] async function that runs through [`Logged::try_call_async`]
/// when wrapped again.
pub struct TryAsyncLayer<F>(Arc<Logged<F>>);

impl<F> Clone for TryAsyncLayer<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F, A> Callable<A> for TryAsyncLayer<F>
where
    F: Callable<A> + Send + Sync + 'static,
    F::Output: Future + Send,
    <F::Output as Future>::Output: Fallible + Send,
    <<F::Output as Future>::Output as Fallible>::Ok: fmt::Debug + Send,
    <<F::Output as Future>::Output as Fallible>::Err: fmt::Display + fmt::Debug,
    A: Arguments + Send + 'static,
{
    type Output = BoxFuture<'static, Option<<<F::Output as Future>::Output as Fallible>::Ok>>;

    fn call_with(&self, args: A) -> Self::Output {
        let logged = Arc::clone(&self.0);
        async move { logged.try_call_async(args).await }.boxed()
    }
}

impl<F> fmt::Debug for Logged<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logged")
            .field("name", &self.site.name())
            .finish_non_exhaustive()
    }
}

/// Wraps a named function, keeping its name.
///
/// `logged!(f)` logs into the shared sink, `logged!(f, sink = s)` into `s`.
#[macro_export]
macro_rules! logged {
    ($f:ident) => {
        $crate::AddLogging::new().apply(::core::stringify!($f), $f)
    };
    ($f:ident, sink = $sink:expr $(,)?) => {
        $crate::AddLogging::with_sink($sink).apply(::core::stringify!($f), $f)
    };
}
