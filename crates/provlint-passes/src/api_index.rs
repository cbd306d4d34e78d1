//! Exported API surface index.
//!
//! When run on the configured library unit, exports one fact per exported
//! symbol, tagged with the symbol's category and declaring file. On every
//! unit it then materializes the visible facts into an [`ApiIndex`], which
//! groups the library's exported names by the file that declares them.
//!
//! Consumers of the library see the same index through fact visibility;
//! units that do not import the library see an empty one. Symbols declared
//! in test files are never indexed.

use provlint_core::{Analyzer, FactKind, Pass, PassResult, RunError, SymbolKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Fact kind for an exported type, type alias, or constant.
pub const FACT_API_TYPE: FactKind = FactKind("api-type");

/// Fact kind for an exported free function.
pub const FACT_API_FUNC: FactKind = FactKind("api-func");

/// Fact kind for an exported inherent method.
pub const FACT_API_METHOD: FactKind = FactKind("api-method");

/// Fact kind for an exported struct field.
pub const FACT_API_FIELD: FactKind = FactKind("api-field");

/// Indexes the exported surface of the configured library unit.
pub static API_INDEX: Analyzer = Analyzer {
    name: "apiindex",
    doc: "indexes the exported API surface of the library unit",
    requires: &[],
    fact_kinds: &[FACT_API_TYPE, FACT_API_FUNC, FACT_API_METHOD, FACT_API_FIELD],
    run,
};

/// An exported symbol name together with its declaring file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameInFile {
    /// Declared name.
    pub name: String,
    /// Base name of the declaring file.
    pub filename: String,
}

/// Names grouped by declaring filename, sorted both ways.
pub type NamesByFile = BTreeMap<String, Vec<String>>;

/// The visible exported surface of the library unit.
#[derive(Debug, Clone, Default)]
pub struct ApiIndex {
    /// Exported types per file.
    pub types: NamesByFile,
    /// Exported free functions per file.
    pub funcs: NamesByFile,
    /// Exported inherent methods per file.
    pub methods: NamesByFile,
    /// Exported struct fields per file.
    pub fields: NamesByFile,
}

impl ApiIndex {
    /// Returns true if no library surface is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.funcs.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
    }

    /// All filenames that declare at least one indexed symbol.
    #[must_use]
    pub fn filenames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .keys()
            .chain(self.funcs.keys())
            .chain(self.methods.keys())
            .chain(self.fields.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

fn fact_kind_for(kind: SymbolKind) -> FactKind {
    match kind {
        SymbolKind::Type => FACT_API_TYPE,
        SymbolKind::Func => FACT_API_FUNC,
        SymbolKind::Method => FACT_API_METHOD,
        SymbolKind::Field => FACT_API_FIELD,
    }
}

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    if normalize(&pass.unit.name) == normalize(&pass.config().library_unit) {
        let mut exported = 0usize;
        for (id, symbol) in pass.unit.symbols.iter() {
            if !symbol.exported || symbol.from_test_file {
                continue;
            }
            let value = NameInFile {
                name: symbol.name.clone(),
                filename: symbol.filename.clone(),
            };
            pass.export_fact(pass.local_symbol(id), fact_kind_for(symbol.kind), value)?;
            exported += 1;
        }
        debug!(unit = %pass.unit.name, exported, "exported API surface facts");
    }

    let index = ApiIndex {
        types: collect(pass, FACT_API_TYPE),
        funcs: collect(pass, FACT_API_FUNC),
        methods: collect(pass, FACT_API_METHOD),
        fields: collect(pass, FACT_API_FIELD),
    };
    Ok(Arc::new(index))
}

fn collect(pass: &Pass<'_>, kind: FactKind) -> NamesByFile {
    let mut map = NamesByFile::new();
    for (_, value) in pass.facts_of_kind(kind) {
        if let Some(entry) = value.downcast_ref::<NameInFile>() {
            map.entry(entry.filename.clone())
                .or_default()
                .push(entry.name.clone());
        }
    }
    for names in map.values_mut() {
        names.sort_unstable();
        names.dedup();
    }
    map
}
