//! Provider registry index.
//!
//! Finds the registration table of a unit: struct expressions whose
//! `resources` and `data_sources` fields hold arrays of `("name", ...)`
//! tuples, the shape used by provider entry points to wire entity names to
//! their constructors. Each registered name is indexed together with the
//! location of its string literal so downstream checks can report there.

use provlint_core::{Analyzer, Location, Pass, PassResult, RunError};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use syn::visit::Visit;
use syn::{Expr, ExprStruct, Lit, Member};
use tracing::debug;

/// Indexes the registered resource and data source names of a unit.
pub static REGISTRY_INDEX: Analyzer = Analyzer {
    name: "registryindex",
    doc: "indexes registered resource and data source names",
    requires: &[],
    fact_kinds: &[],
    run,
};

/// Registered entity names of one unit, each with the location of its
/// registration.
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    /// Registered resource names.
    pub resources: BTreeMap<String, Location>,
    /// Registered data source names.
    pub data_sources: BTreeMap<String, Location>,
}

impl RegistryIndex {
    /// Returns true if the unit registers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.data_sources.is_empty()
    }
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let mut index = RegistryIndex::default();
    for file in &pass.unit.files {
        let ast = file.parse()?;
        let mut collector = RegistryCollector {
            path: &file.path,
            index: &mut index,
        };
        collector.visit_file(&ast);
    }
    debug!(
        unit = %pass.unit.name,
        resources = index.resources.len(),
        data_sources = index.data_sources.len(),
        "indexed registry"
    );
    Ok(Arc::new(index))
}

struct RegistryCollector<'a> {
    path: &'a Path,
    index: &'a mut RegistryIndex,
}

impl RegistryCollector<'_> {
    fn collect_field(&mut self, expr: &Expr, into_data_sources: bool) {
        for (name, location) in registered_names(self.path, expr) {
            if into_data_sources {
                self.index.data_sources.insert(name, location);
            } else {
                self.index.resources.insert(name, location);
            }
        }
    }
}

impl<'ast> Visit<'ast> for RegistryCollector<'_> {
    fn visit_expr_struct(&mut self, node: &'ast ExprStruct) {
        for field in &node.fields {
            let Member::Named(ident) = &field.member else {
                continue;
            };
            match ident.to_string().as_str() {
                "resources" => self.collect_field(&field.expr, false),
                "data_sources" => self.collect_field(&field.expr, true),
                _ => {}
            }
        }
        syn::visit::visit_expr_struct(self, node);
    }
}

/// Extracts `("name", ...)` entries from an array expression, looking
/// through references and `vec!`-free initializer shapes.
fn registered_names(path: &Path, expr: &Expr) -> Vec<(String, Location)> {
    let mut expr = expr;
    while let Expr::Reference(reference) = expr {
        expr = &reference.expr;
    }
    let Expr::Array(array) = expr else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for element in &array.elems {
        let Expr::Tuple(tuple) = element else {
            continue;
        };
        let Some(Expr::Lit(first)) = tuple.elems.first() else {
            continue;
        };
        let Lit::Str(lit) = &first.lit else {
            continue;
        };
        names.push((lit.value(), Location::from_span(path, lit.span())));
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index_of(src: &str) -> RegistryIndex {
        let ast: syn::File = syn::parse_str(src).unwrap();
        let mut index = RegistryIndex::default();
        let path = PathBuf::from("provider.rs");
        let mut collector = RegistryCollector {
            path: &path,
            index: &mut index,
        };
        collector.visit_file(&ast);
        index
    }

    #[test]
    fn collects_both_field_kinds() {
        let index = index_of(
            r#"
            pub fn provider() -> Provider {
                Provider {
                    resources: &[
                        ("gitlab_project", project::resource),
                        ("gitlab_group", group::resource),
                    ],
                    data_sources: &[("gitlab_user", user::data_source)],
                }
            }
            "#,
        );
        let resources: Vec<&str> = index.resources.keys().map(String::as_str).collect();
        assert_eq!(resources, vec!["gitlab_group", "gitlab_project"]);
        assert_eq!(index.data_sources.len(), 1);
        assert!(index.data_sources.contains_key("gitlab_user"));
    }

    #[test]
    fn records_literal_locations() {
        let index = index_of(
            "pub fn provider() -> Provider {\n    Provider {\n        resources: &[(\"gitlab_project\", p)],\n        data_sources: &[],\n    }\n}\n",
        );
        let location = &index.resources["gitlab_project"];
        assert_eq!(location.file, PathBuf::from("provider.rs"));
        assert_eq!(location.line, 3);
    }

    #[test]
    fn unrelated_struct_fields_are_ignored() {
        let index = index_of(
            r#"
            fn build() -> Settings {
                Settings { retries: 3, resources: limit() }
            }
            "#,
        );
        assert!(index.is_empty());
    }

    #[test]
    fn non_tuple_elements_are_skipped() {
        let index = index_of(
            r#"
            fn provider() -> Provider {
                Provider { resources: &[project()], data_sources: &[] }
            }
            "#,
        );
        assert!(index.is_empty());
    }
}
