// macros/src/lib.rs
extern crate proc_macro;
use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Error, Expr, FnArg, Ident, ItemFn, Pat, ReturnType, Signature, Token, Type, parse::Parse,
    punctuated::Punctuated, spanned::Spanned,
};

// A single `key = value` option inside `#[addlogging(...)]`
struct LoggingOption {
    key: Ident,
    value: Expr,
}

impl Parse for LoggingOption {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Expr = input.parse()?;
        Ok(LoggingOption { key, value })
    }
}

// Parser for the comma-separated option list
struct LoggingArgs {
    sink: Option<Expr>,
}

impl Parse for LoggingArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let options: Punctuated<LoggingOption, Token![,]> = Punctuated::parse_terminated(input)?;

        let mut sink = None;
        for option in options {
            if option.key != "sink" {
                return Err(create_error(
                    option.key.span(),
                    &format!("unknown addlogging option `{}`", option.key),
                    Some("the only supported option is `sink = <expr>`"),
                ));
            }
            if sink.is_some() {
                return Err(create_error(
                    option.key.span(),
                    "duplicate `sink` option",
                    None,
                ));
            }
            sink = Some(option.value);
        }

        Ok(LoggingArgs { sink })
    }
}

// Builds a spanned error, optionally followed by a help note
fn create_error(span: proc_macro2::Span, message: &str, help: Option<&str>) -> Error {
    let mut err = Error::new(span, message);
    if let Some(help_msg) = help {
        err.combine(Error::new(span, help_msg));
    }
    err
}

/// How the wrapper classifies the value produced by the original body.
enum ReturnKind {
    /// `Result`-like: `Err` counts as a failure, the wrapper yields `Option<Ok>`.
    Fallible(Type),
    /// Anything else: only a panic counts as a failure.
    Plain(Type),
}

impl ReturnKind {
    fn of(output: &ReturnType) -> Self {
        match output {
            ReturnType::Default => ReturnKind::Plain(syn::parse_quote!(())),
            ReturnType::Type(_, ty) if is_result_type(ty) => ReturnKind::Fallible((**ty).clone()),
            ReturnType::Type(_, ty) => ReturnKind::Plain((**ty).clone()),
        }
    }

    fn original(&self) -> &Type {
        match self {
            ReturnKind::Fallible(ty) | ReturnKind::Plain(ty) => ty,
        }
    }

    fn wrapped_output(&self) -> ReturnType {
        match self {
            ReturnKind::Fallible(ty) => {
                syn::parse_quote!(-> ::core::option::Option<<#ty as ::addlogging::Fallible>::Ok>)
            }
            ReturnKind::Plain(ty) => syn::parse_quote!(-> ::core::option::Option<#ty>),
        }
    }
}

// `Result<T, E>`, `io::Result<T>`, `anyhow::Result<T>` and friends
fn is_result_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        Type::Paren(inner) => is_result_type(&inner.elem),
        Type::Group(inner) => is_result_type(&inner.elem),
        _ => false,
    }
}

fn validate_signature(sig: &Signature) -> syn::Result<()> {
    if sig.constness.is_some() {
        return Err(create_error(
            sig.constness.span(),
            "Cannot wrap const functions",
            Some("The addlogging attribute cannot be used with const functions"),
        ));
    }

    if let Some(variadic) = &sig.variadic {
        return Err(create_error(
            variadic.span(),
            "Cannot wrap variadic functions",
            None,
        ));
    }

    if let ReturnType::Type(_, ty) = &sig.output {
        if let Type::ImplTrait(_) = **ty {
            return Err(create_error(
                ty.span(),
                "Cannot wrap functions returning `impl Trait`",
                Some("Name the return type or box it so the wrapper can annotate it"),
            ));
        }
    }

    Ok(())
}

// Collects the parameter names rendered into the call record; receivers are skipped
fn rendered_params(sig: &Signature) -> syn::Result<Vec<Ident>> {
    let mut params = Vec::new();
    for input in &sig.inputs {
        let FnArg::Typed(typed) = input else {
            continue;
        };
        match &*typed.pat {
            Pat::Ident(pat) if pat.subpat.is_none() => params.push(pat.ident.clone()),
            other => {
                return Err(create_error(
                    other.span(),
                    "addlogging parameters must be plain identifiers",
                    Some("Bind the parameter to a name so its value can be rendered"),
                ));
            }
        }
    }
    Ok(params)
}

/// Wraps a function so every call logs its arguments before running and its
/// outcome afterwards.
///
/// The wrapped function keeps its name, attributes, visibility, generics and
/// parameters. Its return type `R` becomes `Option<R>`; when `R` is a
/// `Result<T, E>` it becomes `Option<T>`. Each call emits:
///
/// * `calling name(arg1, arg2)` at info level, arguments rendered with `Debug`;
/// * `'name' returned value` at info level when the body completes (or yields
///   `Ok`), after which `Some(value)` is returned;
/// * a diagnostic entry carrying the error or panic message and its context
///   when the body returns `Err` or panics, after which `None` is returned.
///
/// `async fn`s are wrapped the same way; the body is awaited once and nothing
/// is logged if the returned future is dropped before it completes.
///
/// # Options
///
/// * `sink = <expr>` - an expression evaluated on every call that yields the
///   sink to log into (anything implementing `addlogging::IntoSink`). Defaults
///   to `addlogging::shared_sink()`.
///
/// # Examples
///
/// ```rust,ignore
/// use addlogging::addlogging;
///
/// #[addlogging]
/// fn add_one(x: i32) -> i32 {
///     x + 1
/// }
///
/// assert_eq!(add_one(41), Some(42));
/// ```
///
/// Fallible functions collapse to the `Ok` value:
///
/// ```rust,ignore
/// use addlogging::addlogging;
///
/// #[addlogging]
/// fn parse_port(raw: &str) -> Result<u16, std::num::ParseIntError> {
///     raw.parse()
/// }
///
/// assert_eq!(parse_port("8080"), Some(8080));
/// assert_eq!(parse_port("http"), None);
/// ```
///
/// Logging into a specific sink:
///
/// ```rust,ignore
/// use std::sync::{Arc, LazyLock};
/// use addlogging::{addlogging, MemorySink};
///
/// static SINK: LazyLock<Arc<MemorySink>> = LazyLock::new(Default::default);
///
/// #[addlogging(sink = SINK.clone())]
/// fn greet(name: &str) -> String {
///     format!("hello, {name}")
/// }
///
/// greet("ferris");
/// assert_eq!(
///     SINK.messages(),
///     ["calling greet(\"ferris\")", "'greet' returned \"hello, ferris\""]
/// );
/// ```
#[proc_macro_attribute]
pub fn addlogging(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match syn::parse::<LoggingArgs>(attr) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    let input_fn = match syn::parse::<ItemFn>(item) {
        Ok(f) => f,
        Err(e) => return TokenStream::from(e.to_compile_error()),
    };

    match expand(args, input_fn) {
        Ok(output) => output.into(),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand(args: LoggingArgs, input_fn: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    validate_signature(&input_fn.sig)?;
    let params = rendered_params(&input_fn.sig)?;

    let ItemFn {
        attrs,
        vis,
        mut sig,
        block,
    } = input_fn;

    let name = sig.ident.to_string();
    let sink = match args.sink {
        Some(expr) => expr.into_token_stream(),
        None => quote!(::addlogging::shared_sink()),
    };

    let returns = ReturnKind::of(&sig.output);
    let ret = returns.original();

    // `async` blocks cannot name their output type; an unreachable typed
    // `return` pins it so `?` in the body knows what to convert into
    let typed_future = quote! {
        async move {
            #[allow(unreachable_code, clippy::diverging_sub_expression, clippy::empty_loop)]
            if false {
                let __addlogging_fake_return: #ret = loop {};
                return __addlogging_fake_return;
            }
            #block
        }
    };

    let call = match (&returns, sig.asyncness.is_some()) {
        (ReturnKind::Plain(_), false) => quote! {
            ::addlogging::invoke(&__addlogging_site, move || -> #ret #block)
        },
        (ReturnKind::Fallible(_), false) => quote! {
            ::addlogging::invoke_result(&__addlogging_site, move || -> #ret #block)
        },
        (ReturnKind::Plain(_), true) => quote! {
            ::addlogging::invoke_async::<#ret, _>(&__addlogging_site, #typed_future).await
        },
        (ReturnKind::Fallible(_), true) => quote! {
            ::addlogging::invoke_async_result::<#ret, _>(&__addlogging_site, #typed_future)
                .await
        },
    };
    sig.output = returns.wrapped_output();

    Ok(quote! {
        #(#attrs)*
        #vis #sig {
            let __addlogging_site = ::addlogging::CallSite::new(#name, #sink);
            __addlogging_site.calling(&::addlogging::Invocation::new()#(.arg(&#params))*);
            #call.into_option()
        }
    })
}
