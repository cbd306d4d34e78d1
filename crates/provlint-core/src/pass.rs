//! The per-(analyzer, unit) execution environment.

use crate::analyzer::{Analyzer, PassResult};
use crate::config::CheckConfig;
use crate::diagnostics::{Diagnostic, Location};
use crate::error::PassError;
use crate::facts::{FactKind, FactStore, FactValue};
use crate::unit::{Corpus, Symbol, SymbolId, SymbolKey, Unit};

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Execution environment handed to an analyzer's run function.
///
/// Grants access to the unit under analysis, the cached results of
/// declared requirements for this same unit, the shared fact store
/// (filtered to what this unit may observe), and a diagnostic sink.
pub struct Pass<'a> {
    /// The analyzer being run.
    pub analyzer: &'static Analyzer,
    /// The unit being analyzed.
    pub unit: &'a Unit,
    /// The whole corpus (unit metadata, processing order, config).
    pub corpus: &'a Corpus,
    results: &'a HashMap<&'static str, PassResult>,
    facts: &'a FactStore,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Pass<'a> {
    pub(crate) fn new(
        analyzer: &'static Analyzer,
        unit: &'a Unit,
        corpus: &'a Corpus,
        results: &'a HashMap<&'static str, PassResult>,
        facts: &'a FactStore,
    ) -> Self {
        Self {
            analyzer,
            unit,
            corpus,
            results,
            facts,
            diagnostics: Vec::new(),
        }
    }

    /// The check configuration of the corpus.
    #[must_use]
    pub fn config(&self) -> &'a CheckConfig {
        self.corpus.check()
    }

    /// Returns the result a declared requirement produced for this unit.
    ///
    /// # Errors
    ///
    /// Fails immediately if `analyzer` is not listed in the calling
    /// analyzer's `requires`, if the requirement produced no result for
    /// this unit, or if the result is not a `T`.
    pub fn result_of<T: Any>(&self, analyzer: &'static Analyzer) -> Result<&'a T, PassError> {
        if !self.analyzer.declares_requirement(analyzer) {
            return Err(PassError::UndeclaredDependency {
                analyzer: self.analyzer.name,
                requested: analyzer.name,
            });
        }
        let result = self
            .results
            .get(analyzer.name)
            .ok_or(PassError::MissingResult {
                requested: analyzer.name,
                unit: self.unit.name.clone(),
            })?;
        result
            .downcast_ref::<T>()
            .ok_or(PassError::ResultType {
                requested: analyzer.name,
            })
    }

    /// Emits a diagnostic at `location`.
    ///
    /// Diagnostics never interrupt scheduling; suppression filtering
    /// happens after the unit's chain completes.
    pub fn report(&mut self, location: Location, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(location, message, self.analyzer.name));
    }

    /// Exports a fact for a symbol declared by the current unit.
    ///
    /// Overwrites any existing fact of the same kind for the symbol.
    ///
    /// # Errors
    ///
    /// Fails if the symbol belongs to another unit or the kind was not
    /// declared in the analyzer's `fact_kinds`.
    pub fn export_fact(
        &self,
        symbol: SymbolKey,
        kind: FactKind,
        value: impl FactValue,
    ) -> Result<(), PassError> {
        if symbol.unit != self.unit.id {
            return Err(PassError::ForeignSymbol {
                analyzer: self.analyzer.name,
                unit: self.unit.name.clone(),
            });
        }
        if !self.analyzer.declares_fact_kind(kind) {
            return Err(PassError::UndeclaredFactKind {
                analyzer: self.analyzer.name,
                kind: kind.0,
            });
        }
        self.facts.insert(symbol, kind, Arc::new(value));
        Ok(())
    }

    /// Returns the fact of one kind for a symbol, if present and if the
    /// declaring unit is visible from the current unit.
    #[must_use]
    pub fn fact(&self, symbol: SymbolKey, kind: FactKind) -> Option<Arc<dyn FactValue>> {
        if !self.corpus.is_visible_from(self.unit.id, symbol.unit) {
            return None;
        }
        self.facts.get(symbol, kind)
    }

    /// Returns every visible fact of one kind, ordered by corpus
    /// processing rank of the declaring unit, then symbol id.
    ///
    /// Only facts from units required to precede this one (its import
    /// closure) plus the unit itself are observed, so the snapshot is
    /// consistent regardless of what sibling units are doing.
    #[must_use]
    pub fn facts_of_kind(&self, kind: FactKind) -> Vec<(SymbolKey, Arc<dyn FactValue>)> {
        let mut facts: Vec<(SymbolKey, Arc<dyn FactValue>)> = self
            .facts
            .of_kind(kind)
            .into_iter()
            .filter(|(key, _)| self.corpus.is_visible_from(self.unit.id, key.unit))
            .collect();
        facts.sort_by_key(|(key, _)| (self.corpus.processing_rank(key.unit), key.symbol));
        facts
    }

    /// Resolves a symbol key to its declaration.
    #[must_use]
    pub fn symbol(&self, key: SymbolKey) -> Option<&'a Symbol> {
        self.corpus.unit(key.unit).symbols.get(key.symbol)
    }

    /// The key for a symbol of the current unit.
    #[must_use]
    pub fn local_symbol(&self, id: SymbolId) -> SymbolKey {
        SymbolKey {
            unit: self.unit.id,
            symbol: id,
        }
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
