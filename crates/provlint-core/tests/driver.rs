//! End-to-end driver tests: scheduling, result isolation, fact
//! propagation, failure handling, and suppression.

use provlint_core::{
    no_result, Analyzer, ConfigurationError, Corpus, Driver, FactKind, Location, Pass, PassResult,
    RunError, UnitSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};

const LIB_SRC: &str = "pub fn create() {}\npub fn delete() {}\n";

fn three_unit_corpus() -> Corpus {
    Corpus::builder()
        .unit(UnitSource::new("lib").file("api.rs", LIB_SRC))
        .unit(UnitSource::new("consumer").file("main.rs", "use lib::create;\n"))
        .unit(UnitSource::new("stranger").file("other.rs", "pub fn lonely() {}\n"))
        .build()
        .expect("corpus builds")
}

// ── Requires ordering and result isolation ──

fn run_producer(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    Ok(std::sync::Arc::new(pass.unit.name.clone()))
}

static PRODUCER: Analyzer = Analyzer {
    name: "producer",
    doc: "produces the unit name",
    requires: &[],
    fact_kinds: &[],
    run: run_producer,
};

fn run_wrapper(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let inner: &String = pass.result_of(&PRODUCER)?;
    Ok(std::sync::Arc::new(format!("{inner}!")))
}

static WRAPPER: Analyzer = Analyzer {
    name: "wrapper",
    doc: "decorates the producer result",
    requires: &[&PRODUCER],
    fact_kinds: &[],
    run: run_wrapper,
};

#[test]
fn dependency_results_are_unit_local() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&WRAPPER]).expect("acyclic plan");
    let report = driver.run(&corpus);

    assert!(!report.has_failures(), "{:?}", report.failures());
    for unit in corpus.units() {
        let wrapped: &String = report
            .result_of(&WRAPPER, unit.id)
            .expect("wrapper ran everywhere");
        assert_eq!(*wrapped, format!("{}!", unit.name));
    }
}

// ── Undeclared dependency access fails immediately ──

fn run_sneaky(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let _: &String = pass.result_of(&PRODUCER)?;
    Ok(no_result())
}

static SNEAKY: Analyzer = Analyzer {
    name: "sneaky",
    doc: "reads a result it never declared",
    requires: &[],
    fact_kinds: &[],
    run: run_sneaky,
};

#[test]
fn undeclared_dependency_is_a_failure() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&PRODUCER, &SNEAKY]).expect("acyclic plan");
    let report = driver.run(&corpus);

    assert_eq!(report.failures().len(), corpus.len());
    for failure in report.failures() {
        assert_eq!(failure.analyzer, "sneaky");
        assert!(failure.error.to_string().contains("did not declare"));
    }
}

// ── Requires cycle and duplicate names are pre-run fatal ──

fn run_noop(_: &mut Pass<'_>) -> Result<PassResult, RunError> {
    Ok(no_result())
}

static CYCLE_A: Analyzer = Analyzer {
    name: "cycle-a",
    doc: "half of a cycle",
    requires: &[&CYCLE_B],
    fact_kinds: &[],
    run: run_noop,
};

static CYCLE_B: Analyzer = Analyzer {
    name: "cycle-b",
    doc: "other half of a cycle",
    requires: &[&CYCLE_A],
    fact_kinds: &[],
    run: run_noop,
};

#[test]
fn requires_cycle_detected_before_any_run() {
    let err = Driver::new(&[&CYCLE_A]).expect_err("cycle");
    assert!(matches!(err, ConfigurationError::RequiresCycle { .. }));
}

static DUP_ONE: Analyzer = Analyzer {
    name: "dup",
    doc: "first of two with one name",
    requires: &[],
    fact_kinds: &[],
    run: run_noop,
};

static DUP_TWO: Analyzer = Analyzer {
    name: "dup",
    doc: "second of two with one name",
    requires: &[],
    fact_kinds: &[],
    run: run_noop,
};

#[test]
fn duplicate_analyzer_name_rejected() {
    let err = Driver::new(&[&DUP_ONE, &DUP_TWO]).expect_err("duplicate");
    assert!(matches!(err, ConfigurationError::DuplicateAnalyzer(_)));
}

// ── Each (analyzer, unit) pair runs exactly once per invocation ──

static COUNTED_RUNS: AtomicUsize = AtomicUsize::new(0);

fn run_counted(_: &mut Pass<'_>) -> Result<PassResult, RunError> {
    COUNTED_RUNS.fetch_add(1, Ordering::SeqCst);
    Ok(no_result())
}

static COUNTED: Analyzer = Analyzer {
    name: "counted",
    doc: "counts its runs",
    requires: &[],
    fact_kinds: &[],
    run: run_counted,
};

fn run_left(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let _: &() = pass.result_of(&COUNTED)?;
    Ok(no_result())
}

static LEFT: Analyzer = Analyzer {
    name: "left",
    doc: "first dependent",
    requires: &[&COUNTED],
    fact_kinds: &[],
    run: run_left,
};

fn run_right(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let _: &() = pass.result_of(&COUNTED)?;
    Ok(no_result())
}

static RIGHT: Analyzer = Analyzer {
    name: "right",
    doc: "second dependent",
    requires: &[&COUNTED],
    fact_kinds: &[],
    run: run_right,
};

#[test]
fn shared_requirement_runs_once_per_unit() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&LEFT, &RIGHT]).expect("acyclic plan");
    let report = driver.run(&corpus);

    assert!(!report.has_failures(), "{:?}", report.failures());
    assert_eq!(COUNTED_RUNS.load(Ordering::SeqCst), corpus.len());
}

// ── RunError aborts only the downstream chain in that unit ──

fn run_flaky(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    if pass.unit.name == "consumer" {
        return Err(RunError::message("boom"));
    }
    Ok(no_result())
}

static FLAKY: Analyzer = Analyzer {
    name: "flaky",
    doc: "fails on one unit",
    requires: &[],
    fact_kinds: &[],
    run: run_flaky,
};

fn run_downstream(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let _: &() = pass.result_of(&FLAKY)?;
    Ok(std::sync::Arc::new(true))
}

static DOWNSTREAM: Analyzer = Analyzer {
    name: "downstream",
    doc: "depends on the flaky analyzer",
    requires: &[&FLAKY],
    fact_kinds: &[],
    run: run_downstream,
};

fn run_sibling(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    Ok(std::sync::Arc::new(pass.unit.name.len()))
}

static SIBLING: Analyzer = Analyzer {
    name: "sibling",
    doc: "independent of the flaky analyzer",
    requires: &[],
    fact_kinds: &[],
    run: run_sibling,
};

#[test]
fn failure_skips_dependents_but_not_siblings() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&DOWNSTREAM, &SIBLING]).expect("acyclic plan");
    let report = driver.run(&corpus);

    let consumer = corpus.unit_by_name("consumer").expect("present").id;
    let lib = corpus.unit_by_name("lib").expect("present").id;

    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].analyzer, "flaky");
    assert_eq!(report.failures()[0].unit, "consumer");

    assert_eq!(report.aborted().len(), 1);
    assert_eq!(report.aborted()[0].analyzer, "downstream");
    assert_eq!(report.aborted()[0].unit, "consumer");
    assert_eq!(report.aborted()[0].requirement, "flaky");

    // Downstream aborted only where its requirement failed.
    assert!(report.result_of::<bool>(&DOWNSTREAM, consumer).is_none());
    assert!(report.result_of::<bool>(&DOWNSTREAM, lib).is_some());

    // The independent subtree is unaffected everywhere.
    for unit in corpus.units() {
        assert!(report.result_of::<usize>(&SIBLING, unit.id).is_some());
    }
}

// ── Fact propagation across the import graph ──

const KIND_EXPORT: FactKind = FactKind("export");

fn run_exporter(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    if pass.unit.name == "lib" {
        for (id, symbol) in pass.unit.symbols.iter() {
            if symbol.exported {
                pass.export_fact(pass.local_symbol(id), KIND_EXPORT, symbol.name.clone())?;
            }
        }
    }
    Ok(no_result())
}

static EXPORTER: Analyzer = Analyzer {
    name: "exporter",
    doc: "exports one fact per exported symbol of the lib unit",
    requires: &[],
    fact_kinds: &[KIND_EXPORT],
    run: run_exporter,
};

fn run_observer(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let names: Vec<String> = pass
        .facts_of_kind(KIND_EXPORT)
        .into_iter()
        .filter_map(|(_, v)| v.downcast_ref::<String>().cloned())
        .collect();
    Ok(std::sync::Arc::new(names))
}

static OBSERVER: Analyzer = Analyzer {
    name: "observer",
    doc: "collects visible export facts",
    requires: &[],
    fact_kinds: &[],
    run: run_observer,
};

#[test]
fn facts_visible_only_through_imports() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&EXPORTER, &OBSERVER]).expect("acyclic plan");
    let report = driver.run(&corpus);
    assert!(!report.has_failures(), "{:?}", report.failures());

    let consumer = corpus.unit_by_name("consumer").expect("present").id;
    let stranger = corpus.unit_by_name("stranger").expect("present").id;

    let seen: &Vec<String> = report.result_of(&OBSERVER, consumer).expect("observer ran");
    assert_eq!(seen, &vec!["create".to_string(), "delete".to_string()]);

    // No import edge, no facts: absent before any visible export.
    let unseen: &Vec<String> = report.result_of(&OBSERVER, stranger).expect("observer ran");
    assert!(unseen.is_empty());
}

#[test]
fn fact_kinds_widen_requested_units_to_imports() {
    let corpus = three_unit_corpus();
    let consumer = corpus.unit_by_name("consumer").expect("present").id;
    let lib = corpus.unit_by_name("lib").expect("present").id;

    let driver = Driver::new(&[&EXPORTER, &OBSERVER]).expect("acyclic plan");
    let report = driver.run_units(&corpus, &[consumer]);

    // The lib unit was visited although only the consumer was requested.
    assert!(report.result_of::<()>(&EXPORTER, lib).is_some());
    let seen: &Vec<String> = report.result_of(&OBSERVER, consumer).expect("observer ran");
    assert_eq!(seen.len(), 2);
}

// ── Diagnostics: determinism and suppression ──

fn run_flagger(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let symbols: Vec<(Location, String)> = pass
        .unit
        .symbols
        .iter()
        .filter(|(_, s)| s.exported)
        .map(|(_, s)| (s.location.clone(), s.name.clone()))
        .collect();
    for (location, name) in symbols {
        pass.report(location, format!("flagged {name}"));
    }
    Ok(no_result())
}

static FLAGGER: Analyzer = Analyzer {
    name: "flagger",
    doc: "flags every exported symbol",
    requires: &[],
    fact_kinds: &[],
    run: run_flagger,
};

#[test]
fn runs_are_deterministic() {
    let corpus = three_unit_corpus();
    let driver = Driver::new(&[&FLAGGER]).expect("acyclic plan");

    let first: Vec<String> = driver.run(&corpus).diagnostics().iter().map(ToString::to_string).collect();
    let second: Vec<String> = driver.run(&corpus).diagnostics().iter().map(ToString::to_string).collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn suppression_drops_only_the_named_analyzer() {
    let src = "//lintignore:flagger\npub fn hidden() {}\npub fn visible() {}\n";
    let corpus = Corpus::builder()
        .unit(UnitSource::new("solo").file("lib.rs", src))
        .build()
        .expect("corpus builds");
    let driver = Driver::new(&[&FLAGGER]).expect("acyclic plan");
    let report = driver.run(&corpus);

    let messages: Vec<&str> = report
        .diagnostics()
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(messages, vec!["flagged visible"]);
}
