//! Analyzer descriptors.

use crate::error::RunError;
use crate::facts::FactKind;
use crate::pass::Pass;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The value produced by one analyzer for one unit.
///
/// Results are memoized per (analyzer, unit) and visible only to
/// analyzers of the same unit that declared the producer in `requires`.
/// Analyzers without a meaningful result return [`no_result`].
pub type PassResult = Arc<dyn Any + Send + Sync>;

/// Signature of an analyzer's run function.
pub type RunFn = fn(&mut Pass<'_>) -> Result<PassResult, RunError>;

/// An empty result for analyzers that only report diagnostics.
#[must_use]
pub fn no_result() -> PassResult {
    Arc::new(())
}

/// An immutable analysis pass descriptor.
///
/// Analyzers are declared as statics and wired together through
/// `requires`, mirroring how the driver consumes them:
///
/// ```ignore
/// pub static REGISTRY_INDEX: Analyzer = Analyzer {
///     name: "registryindex",
///     doc: "extracts declared resource names from the provider registry",
///     requires: &[],
///     fact_kinds: &[],
///     run: run_registry_index,
/// };
/// ```
pub struct Analyzer {
    /// Unique analyzer name; suppression directives match against it.
    pub name: &'static str,
    /// One-line description.
    pub doc: &'static str,
    /// Analyzers whose results this one reads via
    /// [`Pass::result_of`](crate::Pass::result_of). Their runs for a
    /// unit complete before this analyzer's run for that unit starts.
    pub requires: &'static [&'static Analyzer],
    /// Fact kinds this analyzer may export. Declaring any kind makes
    /// the driver visit imported units even when they were not
    /// requested, since whole-corpus fact aggregation needs their data.
    pub fact_kinds: &'static [FactKind],
    /// The run function.
    pub run: RunFn,
}

impl Analyzer {
    /// Returns true if `other` is declared as a direct requirement.
    #[must_use]
    pub fn declares_requirement(&self, other: &Analyzer) -> bool {
        self.requires.iter().any(|r| r.name == other.name)
    }

    /// Returns true if the given fact kind is declared.
    #[must_use]
    pub fn declares_fact_kind(&self, kind: FactKind) -> bool {
        self.fact_kinds.contains(&kind)
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("requires", &self.requires.iter().map(|r| r.name).collect::<Vec<_>>())
            .field("fact_kinds", &self.fact_kinds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Pass<'_>) -> Result<PassResult, RunError> {
        Ok(no_result())
    }

    static BASE: Analyzer = Analyzer {
        name: "base",
        doc: "test",
        requires: &[],
        fact_kinds: &[FactKind("k")],
        run: noop,
    };

    static TOP: Analyzer = Analyzer {
        name: "top",
        doc: "test",
        requires: &[&BASE],
        fact_kinds: &[],
        run: noop,
    };

    #[test]
    fn declared_requirements() {
        assert!(TOP.declares_requirement(&BASE));
        assert!(!BASE.declares_requirement(&TOP));
    }

    #[test]
    fn declared_fact_kinds() {
        assert!(BASE.declares_fact_kind(FactKind("k")));
        assert!(!BASE.declares_fact_kind(FactKind("other")));
    }

    #[test]
    fn debug_shows_wiring() {
        let repr = format!("{TOP:?}");
        assert!(repr.contains("top"));
        assert!(repr.contains("base"));
    }
}
