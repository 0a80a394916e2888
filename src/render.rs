//! Rendering of a call's arguments into the text of the `calling` entry.

use std::fmt;

/// Textual record of one call's arguments.
///
/// Positional entries come first in the order they were added, then named
/// entries as `key=value`, everything rendered with `Debug` and joined with
/// `", "`. Values are neither truncated nor redacted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    positional: Vec<String>,
    named: Vec<String>,
}

impl Invocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg<T: fmt::Debug + ?Sized>(mut self, value: &T) -> Self {
        self.positional.push(format!("{value:?}"));
        self
    }

    /// Appends a named argument, rendered as `key=value`.
    pub fn named<T: fmt::Debug + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.named.push(format!("{key}={value:?}"));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.positional.iter().chain(&self.named).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(entry)?;
        }
        Ok(())
    }
}

/// Renders positional and named arguments in one go.
pub fn render(positional: &[&dyn fmt::Debug], named: &[(&str, &dyn fmt::Debug)]) -> String {
    let invocation = positional
        .iter()
        .fold(Invocation::new(), |invocation, value| invocation.arg(value));
    named
        .iter()
        .fold(invocation, |invocation, (key, value)| invocation.named(key, value))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_before_named() {
        assert_eq!(render(&[&1, &'x'], &[("key", &2)]), "1, 'x', key=2");
    }

    #[test]
    fn named_keep_insertion_order() {
        let rendered = Invocation::new()
            .named("zeta", &1)
            .arg(&"first")
            .named("alpha", &None::<u8>)
            .to_string();

        assert_eq!(rendered, "\"first\", zeta=1, alpha=None");
    }

    #[test]
    fn empty_call_renders_nothing() {
        let invocation = Invocation::new();
        assert!(invocation.is_empty());
        assert_eq!(invocation.to_string(), "");
        assert_eq!(render(&[], &[]), "");
    }

    #[test]
    fn uses_debug_representation() {
        let rendered = Invocation::new()
            .arg("quoted")
            .arg(&vec![1, 2])
            .arg(&Some(1.5))
            .to_string();

        assert_eq!(rendered, "\"quoted\", [1, 2], Some(1.5)");
    }

    #[test]
    fn long_values_are_not_truncated() {
        let long = "a".repeat(4096);
        assert_eq!(Invocation::new().arg(&long).to_string().len(), 4096 + 2);
    }
}
