use std::fmt::Debug;

use addlogging::addlogging;

#[addlogging]
fn identity<T: Debug>(x: T) -> T {
    x
}

#[addlogging]
fn pair<'a, A, B>(a: &'a A, b: B) -> (&'a A, B)
where
    A: Debug,
    B: Debug + Clone,
{
    (a, b)
}

#[addlogging]
fn describe(value: impl Debug) -> String {
    format!("{value:?}")
}

fn main() {
    assert_eq!(identity(42), Some(42));
    assert_eq!(identity("hi"), Some("hi"));
    assert_eq!(pair(&1u8, 'b'), Some((&1u8, 'b')));
    assert_eq!(describe(vec![1, 2]).as_deref(), Some("[1, 2]"));
}
