//! The scheduler: plans the analyzer graph and drives it over a corpus.

use crate::analyzer::{Analyzer, PassResult};
use crate::diagnostics::{sort_diagnostics, Diagnostic};
use crate::error::{ConfigurationError, PassFailure};
use crate::facts::FactStore;
use crate::graph::DependencyGraph;
use crate::pass::Pass;
use crate::suppress::SuppressionIndex;
use crate::unit::{Corpus, UnitId};

use rayon::prelude::*;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Identifier of an analyzer within a driver's plan, used to key
/// memoized results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnalyzerId(u32);

/// Executes a planned set of analyzers over a corpus.
///
/// Construction validates the whole configuration: the transitive
/// Requires set is collected, duplicate names rejected, and the
/// dependency graph topologically ordered. Any cycle is reported here,
/// before any run starts.
#[derive(Debug)]
pub struct Driver {
    /// All planned analyzers, dependencies first.
    analyzers: Vec<&'static Analyzer>,
    ids: HashMap<&'static str, AnalyzerId>,
    uses_facts: bool,
}

impl Driver {
    /// Plans the transitive closure of the requested analyzers.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for duplicate analyzer names or
    /// a Requires cycle.
    pub fn new(requested: &[&'static Analyzer]) -> Result<Self, ConfigurationError> {
        let mut seen: HashMap<&'static str, &'static Analyzer> = HashMap::new();
        let mut discovered: Vec<&'static Analyzer> = Vec::new();
        let mut stack: Vec<&'static Analyzer> = requested.to_vec();

        while let Some(analyzer) = stack.pop() {
            match seen.get(analyzer.name) {
                Some(&existing) if std::ptr::eq(existing, analyzer) => continue,
                Some(_) => {
                    return Err(ConfigurationError::DuplicateAnalyzer(
                        analyzer.name.to_string(),
                    ))
                }
                None => {
                    seen.insert(analyzer.name, analyzer);
                    discovered.push(analyzer);
                    stack.extend(analyzer.requires.iter().copied());
                }
            }
        }

        let index_of: HashMap<&'static str, usize> = discovered
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name, i))
            .collect();
        let mut graph = DependencyGraph::new();
        for analyzer in &discovered {
            graph.add_node(analyzer.name);
        }
        for (i, analyzer) in discovered.iter().enumerate() {
            for require in analyzer.requires {
                graph.add_edge(i, index_of[require.name]);
            }
        }
        let order = graph
            .topo_order()
            .map_err(|cycle| ConfigurationError::RequiresCycle { cycle })?;

        let analyzers: Vec<&'static Analyzer> = order.into_iter().map(|i| discovered[i]).collect();
        let ids = analyzers
            .iter()
            .enumerate()
            .map(|(i, a)| (a.name, AnalyzerId(u32::try_from(i).unwrap_or(u32::MAX))))
            .collect();
        let uses_facts = analyzers.iter().any(|a| !a.fact_kinds.is_empty());

        Ok(Self {
            analyzers,
            ids,
            uses_facts,
        })
    }

    /// The planned analyzers, dependencies first.
    #[must_use]
    pub fn analyzers(&self) -> &[&'static Analyzer] {
        &self.analyzers
    }

    /// Runs every planned analyzer over every unit of the corpus.
    #[must_use]
    pub fn run(&self, corpus: &Corpus) -> RunReport {
        let all: Vec<UnitId> = corpus.units().map(|u| u.id).collect();
        self.run_units(corpus, &all)
    }

    /// Runs over a subset of units.
    ///
    /// When any planned analyzer declares fact kinds, the subset widens
    /// to its transitive import closure: whole-corpus fact aggregation
    /// needs the imported units' data even if they were not requested.
    #[must_use]
    pub fn run_units(&self, corpus: &Corpus, requested: &[UnitId]) -> RunReport {
        let selected: HashSet<UnitId> = if self.uses_facts {
            corpus.closure_of(requested).into_iter().collect()
        } else {
            requested.iter().copied().collect()
        };

        info!(
            analyzers = self.analyzers.len(),
            units = selected.len(),
            "starting analysis"
        );

        let facts = FactStore::new();
        let mut results: HashMap<(AnalyzerId, UnitId), PassResult> = HashMap::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut failures: Vec<PassFailure> = Vec::new();
        let mut aborted: Vec<AbortedPass> = Vec::new();

        // Waves are safe to parallelize: every unit's imports finished
        // in an earlier wave, so all facts a unit may observe exist
        // before it starts.
        for wave in corpus.waves() {
            let ready: Vec<UnitId> = wave
                .iter()
                .copied()
                .filter(|id| selected.contains(id))
                .collect();
            let outcomes: Vec<UnitOutcome> = ready
                .into_par_iter()
                .map(|id| self.run_unit(corpus, id, &facts))
                .collect();

            for outcome in outcomes {
                diagnostics.extend(outcome.diagnostics);
                failures.extend(outcome.failures);
                aborted.extend(outcome.aborted);
                for (analyzer, result) in outcome.results {
                    // First writer wins; each pair is computed once per
                    // invocation, so this never discards anything.
                    results.entry((analyzer, outcome.unit)).or_insert(result);
                }
            }
        }

        sort_diagnostics(&mut diagnostics);

        info!(
            diagnostics = diagnostics.len(),
            failures = failures.len(),
            "analysis complete"
        );

        RunReport {
            diagnostics,
            failures,
            aborted,
            results,
            ids: self.ids.clone(),
            facts,
        }
    }

    /// Runs the full analyzer chain, in dependency order, on one unit.
    fn run_unit(&self, corpus: &Corpus, id: UnitId, facts: &FactStore) -> UnitOutcome {
        let unit = corpus.unit(id);
        let suppression = SuppressionIndex::build(unit);

        let mut local: HashMap<&'static str, PassResult> = HashMap::new();
        let mut diagnostics = Vec::new();
        let mut failures = Vec::new();
        let mut aborted = Vec::new();
        let mut published = Vec::new();

        for analyzer in &self.analyzers {
            // A missing requirement result means it failed or was
            // aborted earlier in the chain; the chain below it aborts
            // too, while independent subtrees keep running.
            if let Some(missing) = analyzer
                .requires
                .iter()
                .find(|r| !local.contains_key(r.name))
            {
                debug!(
                    analyzer = analyzer.name,
                    unit = %unit.name,
                    requirement = missing.name,
                    "aborted: requirement has no result"
                );
                aborted.push(AbortedPass {
                    analyzer: analyzer.name,
                    unit: unit.name.clone(),
                    requirement: missing.name,
                });
                continue;
            }

            debug!(analyzer = analyzer.name, unit = %unit.name, "running pass");
            let mut pass = Pass::new(analyzer, unit, corpus, &local, facts);
            let outcome = (analyzer.run)(&mut pass);
            diagnostics.extend(pass.take_diagnostics());

            match outcome {
                Ok(result) => {
                    published.push((self.ids[analyzer.name], std::sync::Arc::clone(&result)));
                    local.insert(analyzer.name, result);
                }
                Err(error) => {
                    warn!(
                        analyzer = analyzer.name,
                        unit = %unit.name,
                        %error,
                        "pass failed"
                    );
                    failures.push(PassFailure {
                        analyzer: analyzer.name,
                        unit: unit.name.clone(),
                        error,
                    });
                }
            }
        }

        UnitOutcome {
            unit: id,
            results: published,
            diagnostics: suppression.filter(diagnostics),
            failures,
            aborted,
        }
    }
}

/// What one unit's chain produced.
struct UnitOutcome {
    unit: UnitId,
    results: Vec<(AnalyzerId, PassResult)>,
    diagnostics: Vec<Diagnostic>,
    failures: Vec<PassFailure>,
    aborted: Vec<AbortedPass>,
}

/// A pass skipped because one of its requirements produced no result
/// for the unit.
#[derive(Debug, Clone)]
pub struct AbortedPass {
    /// The skipped analyzer.
    pub analyzer: &'static str,
    /// The unit it was skipped on.
    pub unit: String,
    /// The requirement with no result.
    pub requirement: &'static str,
}

/// The outcome of one driver invocation.
pub struct RunReport {
    diagnostics: Vec<Diagnostic>,
    failures: Vec<PassFailure>,
    aborted: Vec<AbortedPass>,
    results: HashMap<(AnalyzerId, UnitId), PassResult>,
    ids: HashMap<&'static str, AnalyzerId>,
    facts: FactStore,
}

impl RunReport {
    /// Suppression-filtered diagnostics, sorted by position.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Analyzer failures, in processing order.
    #[must_use]
    pub fn failures(&self) -> &[PassFailure] {
        &self.failures
    }

    /// Passes skipped because a requirement failed or was itself
    /// aborted.
    #[must_use]
    pub fn aborted(&self) -> &[AbortedPass] {
        &self.aborted
    }

    /// Returns true if any analyzer failed on any unit.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The memoized result one analyzer produced for one unit.
    #[must_use]
    pub fn result_of<T: Any>(&self, analyzer: &'static Analyzer, unit: UnitId) -> Option<&T> {
        let id = self.ids.get(analyzer.name)?;
        self.results
            .get(&(*id, unit))
            .and_then(|r| r.downcast_ref::<T>())
    }

    /// The fact store as it stood at the end of the run.
    #[must_use]
    pub fn facts(&self) -> &FactStore {
        &self.facts
    }
}
