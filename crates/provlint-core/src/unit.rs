//! Compilation units, declared symbols, and the corpus.
//!
//! A unit owns its source text and a symbol table built once at corpus
//! construction. The corpus precomputes everything scheduling needs:
//! import edges, reverse-topological execution waves (leaves first),
//! and per-unit transitive import closures for fact visibility.
//!
//! Syntax trees are not retained: `proc-macro2` spans are bound to the
//! thread that created them, and units cross threads during wave
//! execution. Sources are validated at build time and re-parsed by the
//! passes that need a tree.

use crate::config::CheckConfig;
use crate::diagnostics::Location;
use crate::error::{ConfigurationError, CorpusError};
use crate::graph::DependencyGraph;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stable identifier of a unit within its corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub u32);

impl UnitId {
    /// Returns the id as a usize index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a symbol within its declaring unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub u32);

/// Opaque stable key for a declared symbol: declaring unit + local id.
///
/// Fact keys use this instead of any reference into syntax trees, so
/// facts stay valid after the producing pass completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolKey {
    /// The declaring unit.
    pub unit: UnitId,
    /// The symbol within that unit.
    pub symbol: SymbolId,
}

/// Category of a declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A type, type alias, or constant declaration.
    Type,
    /// A free function.
    Func,
    /// An inherent method.
    Method,
    /// A named struct field.
    Field,
}

/// A declared entity of a unit.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Declared name.
    pub name: String,
    /// Symbol category.
    pub kind: SymbolKind,
    /// Whether the declaration is `pub` (for fields: field and its
    /// struct both `pub`).
    pub exported: bool,
    /// Base name of the declaring file.
    pub filename: String,
    /// Declaration position.
    pub location: Location,
    /// Whether the declaring file is a test file.
    pub from_test_file: bool,
}

/// The declared-symbol table of one unit.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Returns the symbol for a local id.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Iterates symbols with their ids, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(u32::try_from(i).unwrap_or(u32::MAX)), s))
    }

    /// Returns the number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the unit declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// One source file of a unit.
#[derive(Debug)]
pub struct SourceFile {
    /// Path as given to the builder.
    pub path: PathBuf,
    /// Raw file contents.
    pub content: String,
    /// Whether this is a test file by path convention.
    pub is_test: bool,
}

impl SourceFile {
    /// Parses the file into a syntax tree.
    ///
    /// The content was already parsed once during corpus construction;
    /// spans cannot cross threads, so passes parse their own copy.
    ///
    /// # Errors
    ///
    /// Returns a syntax error; cannot occur for files accepted by
    /// [`CorpusBuilder::build`].
    pub fn parse(&self) -> Result<syn::File, syn::Error> {
        syn::parse_file(&self.content)
    }

    /// Detects test files from path conventions.
    fn detect_test(path: &Path) -> bool {
        for component in path.components() {
            if let std::path::Component::Normal(s) = component {
                let s = s.to_string_lossy();
                if s == "tests" || s == "benches" {
                    return true;
                }
            }
        }
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_test.rs") || n.starts_with("test_"))
    }
}

/// A compilation unit: identity, syntax trees, symbols, import edges.
#[derive(Debug)]
pub struct Unit {
    /// Stable identity within the corpus.
    pub id: UnitId,
    /// Unit name (unique within the corpus).
    pub name: String,
    /// The unit's source files.
    pub files: Vec<SourceFile>,
    /// Declared symbols.
    pub symbols: SymbolTable,
    /// Direct imports.
    pub imports: Vec<UnitId>,
}

impl Unit {
    /// Returns true if every file of this unit is a test file.
    #[must_use]
    pub fn is_test_unit(&self) -> bool {
        !self.files.is_empty() && self.files.iter().all(|f| f.is_test)
    }
}

/// Source input for one unit, fed to [`CorpusBuilder`].
#[derive(Debug, Default)]
pub struct UnitSource {
    name: String,
    files: Vec<(PathBuf, String)>,
    imports: Vec<String>,
}

impl UnitSource {
    /// Starts a unit with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            imports: Vec::new(),
        }
    }

    /// Adds a source file.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Adds an explicit import edge to another unit by name.
    ///
    /// Import edges are also derived from `use` declarations whose
    /// leading segment matches another unit's name.
    #[must_use]
    pub fn import(mut self, name: impl Into<String>) -> Self {
        self.imports.push(name.into());
        self
    }
}

/// Builder for a [`Corpus`].
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    units: Vec<UnitSource>,
    docs_root: Option<PathBuf>,
    check: CheckConfig,
}

impl CorpusBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a unit.
    #[must_use]
    pub fn unit(mut self, unit: UnitSource) -> Self {
        self.units.push(unit);
        self
    }

    /// Sets the documentation root directory.
    #[must_use]
    pub fn docs_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.docs_root = Some(path.into());
        self
    }

    /// Sets the check configuration.
    #[must_use]
    pub fn check(mut self, check: CheckConfig) -> Self {
        self.check = check;
        self
    }

    /// Parses all sources and assembles the corpus.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate unit names, parse failures,
    /// unresolvable explicit imports, or an import cycle.
    pub fn build(self) -> Result<Corpus, CorpusError> {
        let mut by_name: HashMap<String, UnitId> = HashMap::new();
        for (i, source) in self.units.iter().enumerate() {
            let id = UnitId(u32::try_from(i).unwrap_or(u32::MAX));
            if by_name.insert(normalize(&source.name), id).is_some() {
                return Err(CorpusError::DuplicateUnit(source.name.clone()));
            }
        }

        let mut units = Vec::with_capacity(self.units.len());
        for (i, source) in self.units.into_iter().enumerate() {
            let id = UnitId(u32::try_from(i).unwrap_or(u32::MAX));
            units.push(parse_unit(id, source, &by_name)?);
        }

        // Import graph: a unit depends on what it imports, so waves put
        // leaves first and imported units always precede their importers.
        let mut graph = DependencyGraph::new();
        for unit in &units {
            graph.add_node(unit.name.clone());
        }
        for unit in &units {
            for &import in &unit.imports {
                graph.add_edge(unit.id.index(), import.index());
            }
        }
        let waves: Vec<Vec<UnitId>> = graph
            .waves()
            .map_err(|cycle| ConfigurationError::ImportCycle { cycle })?
            .into_iter()
            .map(|wave| {
                wave.into_iter()
                    .map(|i| UnitId(u32::try_from(i).unwrap_or(u32::MAX)))
                    .collect()
            })
            .collect();

        let mut rank = vec![0usize; units.len()];
        for (r, id) in waves.iter().flatten().enumerate() {
            rank[id.index()] = r;
        }

        // Transitive import closures, computed leaves first.
        let mut closures: Vec<HashSet<UnitId>> = vec![HashSet::new(); units.len()];
        for &id in waves.iter().flatten() {
            let mut closure = HashSet::new();
            for &import in &units[id.index()].imports {
                closure.insert(import);
                closure.extend(closures[import.index()].iter().copied());
            }
            closures[id.index()] = closure;
        }

        debug!(units = units.len(), waves = waves.len(), "corpus built");

        Ok(Corpus {
            units,
            by_name,
            waves,
            rank,
            closures,
            docs_root: self.docs_root,
            check: self.check,
        })
    }
}

/// An immutable collection of units with a valid processing order.
#[derive(Debug)]
pub struct Corpus {
    units: Vec<Unit>,
    by_name: HashMap<String, UnitId>,
    waves: Vec<Vec<UnitId>>,
    rank: Vec<usize>,
    closures: Vec<HashSet<UnitId>>,
    docs_root: Option<PathBuf>,
    check: CheckConfig,
}

impl Corpus {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::new()
    }

    /// Returns the unit for an id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this corpus.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.index()]
    }

    /// Looks up a unit by name.
    #[must_use]
    pub fn unit_by_name(&self, name: &str) -> Option<&Unit> {
        self.by_name.get(&normalize(name)).map(|&id| self.unit(id))
    }

    /// Iterates all units in registration order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Returns the number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the corpus has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Execution waves in reverse topological import order: every unit's
    /// imports sit in earlier waves, and units within one wave are
    /// mutually independent.
    #[must_use]
    pub fn waves(&self) -> &[Vec<UnitId>] {
        &self.waves
    }

    /// Position of a unit in the flattened processing order.
    #[must_use]
    pub fn processing_rank(&self, id: UnitId) -> usize {
        self.rank[id.index()]
    }

    /// Whether `declaring` precedes-or-equals `viewer` in the import
    /// order, i.e. facts on symbols of `declaring` are visible to
    /// analyses of `viewer`.
    #[must_use]
    pub fn is_visible_from(&self, viewer: UnitId, declaring: UnitId) -> bool {
        viewer == declaring || self.closures[viewer.index()].contains(&declaring)
    }

    /// Expands a unit set to its transitive import closure.
    #[must_use]
    pub fn closure_of(&self, ids: &[UnitId]) -> Vec<UnitId> {
        let mut selected: HashSet<UnitId> = ids.iter().copied().collect();
        for &id in ids {
            selected.extend(self.closures[id.index()].iter().copied());
        }
        let mut out: Vec<UnitId> = selected.into_iter().collect();
        out.sort_unstable();
        out
    }

    /// The documentation root, if one was configured or discovered.
    #[must_use]
    pub fn docs_root(&self) -> Option<&Path> {
        self.docs_root.as_deref()
    }

    /// The check configuration.
    #[must_use]
    pub fn check(&self) -> &CheckConfig {
        &self.check
    }
}

/// Unit names may use `-` while `use` paths use `_`.
fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

fn parse_unit(
    id: UnitId,
    source: UnitSource,
    by_name: &HashMap<String, UnitId>,
) -> Result<Unit, CorpusError> {
    let mut files = Vec::with_capacity(source.files.len());
    let mut symbols = Vec::new();
    let mut derived: Vec<String> = Vec::new();

    for (path, content) in source.files {
        let ast = syn::parse_file(&content).map_err(|e| CorpusError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let file = SourceFile {
            is_test: SourceFile::detect_test(&path),
            path,
            content,
        };
        collect_items(&ast.items, &file, &mut symbols);
        collect_use_roots(&ast.items, &mut derived);
        files.push(file);
    }

    let mut imports: Vec<UnitId> = Vec::new();
    let add = |import: UnitId, imports: &mut Vec<UnitId>| {
        if import != id && !imports.contains(&import) {
            imports.push(import);
        }
    };
    // Explicit imports must resolve.
    for name in &source.imports {
        match by_name.get(&normalize(name)) {
            Some(&import) => add(import, &mut imports),
            None => {
                return Err(ConfigurationError::UnknownImport {
                    unit: source.name.clone(),
                    import: name.clone(),
                }
                .into())
            }
        }
    }
    // Derived `use` roots that match no unit are foreign crates.
    for name in &derived {
        if let Some(&import) = by_name.get(&normalize(name)) {
            add(import, &mut imports);
        }
    }
    imports.sort_unstable();

    Ok(Unit {
        id,
        name: source.name,
        files,
        symbols: SymbolTable { symbols },
        imports,
    })
}

fn push_symbol(
    out: &mut Vec<Symbol>,
    file: &SourceFile,
    name: &syn::Ident,
    kind: SymbolKind,
    exported: bool,
) {
    out.push(Symbol {
        name: name.to_string(),
        kind,
        exported,
        filename: file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        location: Location::from_span(file.path.clone(), name.span()),
        from_test_file: file.is_test,
    });
}

/// Walks items and records declared symbols, recursing into inline
/// modules.
fn collect_items(items: &[syn::Item], file: &SourceFile, out: &mut Vec<Symbol>) {
    for item in items {
        match item {
            syn::Item::Struct(s) => {
                let exported = is_pub(&s.vis);
                push_symbol(out, file, &s.ident, SymbolKind::Type, exported);
                for field in &s.fields {
                    if let Some(ident) = &field.ident {
                        push_symbol(
                            out,
                            file,
                            ident,
                            SymbolKind::Field,
                            exported && is_pub(&field.vis),
                        );
                    }
                }
            }
            syn::Item::Enum(e) => push_symbol(out, file, &e.ident, SymbolKind::Type, is_pub(&e.vis)),
            syn::Item::Type(t) => push_symbol(out, file, &t.ident, SymbolKind::Type, is_pub(&t.vis)),
            syn::Item::Const(c) => {
                push_symbol(out, file, &c.ident, SymbolKind::Type, is_pub(&c.vis));
            }
            syn::Item::Fn(f) => {
                push_symbol(out, file, &f.sig.ident, SymbolKind::Func, is_pub(&f.vis));
            }
            syn::Item::Impl(imp) if imp.trait_.is_none() => {
                for member in &imp.items {
                    if let syn::ImplItem::Fn(m) = member {
                        push_symbol(out, file, &m.sig.ident, SymbolKind::Method, is_pub(&m.vis));
                    }
                }
            }
            syn::Item::Mod(m) => {
                if let Some((_, nested)) = &m.content {
                    collect_items(nested, file, out);
                }
            }
            _ => {}
        }
    }
}

fn is_pub(vis: &syn::Visibility) -> bool {
    matches!(vis, syn::Visibility::Public(_))
}

/// Records the leading segment of every `use` declaration.
fn collect_use_roots(items: &[syn::Item], out: &mut Vec<String>) {
    for item in items {
        match item {
            syn::Item::Use(u) => use_roots(&u.tree, out),
            syn::Item::Mod(m) => {
                if let Some((_, nested)) = &m.content {
                    collect_use_roots(nested, out);
                }
            }
            _ => {}
        }
    }
}

fn use_roots(tree: &syn::UseTree, out: &mut Vec<String>) {
    match tree {
        syn::UseTree::Path(p) => out.push(p.ident.to_string()),
        syn::UseTree::Name(n) => out.push(n.ident.to_string()),
        syn::UseTree::Rename(r) => out.push(r.ident.to_string()),
        syn::UseTree::Group(g) => {
            for t in &g.items {
                use_roots(t, out);
            }
        }
        syn::UseTree::Glob(_) => {}
    }
}
