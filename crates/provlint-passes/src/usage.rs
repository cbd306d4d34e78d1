//! Library usage collection.
//!
//! Records every reference a unit makes to the configured library: path
//! references through the library's leading segment, method calls, field
//! accesses, and struct literal keys. A bare `x.name` cannot be classified
//! as a method or field from syntax alone, so such names are recorded in
//! both sets and the coverage checks test membership per category.

use provlint_core::{Analyzer, Pass, PassResult, RunError};
use std::collections::BTreeSet;
use std::sync::Arc;
use syn::visit::Visit;
use syn::{ExprField, ExprMethodCall, ExprStruct, Member, Path};
use tracing::debug;

/// Collects the names a unit references on the library surface.
pub static USAGE: Analyzer = Analyzer {
    name: "usage",
    doc: "collects library symbol references made by a unit",
    requires: &[],
    fact_kinds: &[],
    run,
};

/// Names a unit references, split by the category they can belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    /// Referenced type names.
    pub types: BTreeSet<String>,
    /// Referenced free function names.
    pub funcs: BTreeSet<String>,
    /// Names that appear in method position.
    pub methods: BTreeSet<String>,
    /// Names that appear in field position.
    pub fields: BTreeSet<String>,
}

impl Usage {
    /// Total number of distinct referenced names across categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len() + self.funcs.len() + self.methods.len() + self.fields.len()
    }

    /// Returns true if the unit references nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.funcs.is_empty()
            && self.methods.is_empty()
            && self.fields.is_empty()
    }
}

fn run(pass: &mut Pass<'_>) -> Result<PassResult, RunError> {
    let mut collector = UsageCollector {
        library: pass.config().library_ident.clone(),
        usage: Usage::default(),
    };
    for file in &pass.unit.files {
        let ast = file.parse()?;
        collector.visit_file(&ast);
    }
    debug!(unit = %pass.unit.name, referenced = collector.usage.len(), "collected usage");
    Ok(Arc::new(collector.usage))
}

struct UsageCollector {
    library: String,
    usage: Usage,
}

impl UsageCollector {
    /// Records the segment adjacent to the library ident, classified by
    /// leading-case convention. `gitlab::Client::default()` references
    /// `Client`, not `default`.
    fn record_path(&mut self, path: &Path) {
        if path.segments.len() < 2 {
            return;
        }
        let Some(first) = path.segments.first() else {
            return;
        };
        if first.ident != self.library {
            return;
        }
        let Some(adjacent) = path.segments.iter().nth(1) else {
            return;
        };
        let name = adjacent.ident.to_string();
        if name.chars().next().is_some_and(char::is_uppercase) {
            self.usage.types.insert(name);
        } else {
            self.usage.funcs.insert(name);
        }
    }
}

impl<'ast> Visit<'ast> for UsageCollector {
    fn visit_path(&mut self, node: &'ast Path) {
        self.record_path(node);
        syn::visit::visit_path(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        let name = node.method.to_string();
        self.usage.methods.insert(name.clone());
        self.usage.fields.insert(name);
        syn::visit::visit_expr_method_call(self, node);
    }

    fn visit_expr_field(&mut self, node: &'ast ExprField) {
        if let Member::Named(ident) = &node.member {
            let name = ident.to_string();
            self.usage.methods.insert(name.clone());
            self.usage.fields.insert(name);
        }
        syn::visit::visit_expr_field(self, node);
    }

    fn visit_expr_struct(&mut self, node: &'ast ExprStruct) {
        let from_library = node
            .path
            .segments
            .first()
            .is_some_and(|s| s.ident == self.library);
        if from_library {
            for field in &node.fields {
                if let Member::Named(ident) = &field.member {
                    self.usage.fields.insert(ident.to_string());
                }
            }
        }
        syn::visit::visit_expr_struct(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_of(src: &str) -> Usage {
        let ast: syn::File = syn::parse_str(src).unwrap();
        let mut collector = UsageCollector {
            library: "gitlab".to_string(),
            usage: Usage::default(),
        };
        collector.visit_file(&ast);
        collector.usage
    }

    #[test]
    fn path_references_split_by_case() {
        let usage = usage_of(
            r#"
            fn main() {
                let client = gitlab::Client::default();
                gitlab::connect("https://example.com");
            }
            "#,
        );
        assert!(usage.types.contains("Client"));
        assert!(usage.funcs.contains("connect"));
        assert!(!usage.funcs.contains("Client"));
        assert!(!usage.funcs.contains("default"));
    }

    #[test]
    fn short_and_foreign_paths_are_ignored() {
        let usage = usage_of(
            r#"
            fn main() {
                let x = other::Client::new();
                helper();
            }
            "#,
        );
        assert!(usage.types.is_empty());
        assert!(usage.funcs.is_empty());
    }

    #[test]
    fn method_calls_land_in_both_ambiguous_sets() {
        let usage = usage_of("fn main() { client.projects().list(); }");
        assert!(usage.methods.contains("projects"));
        assert!(usage.fields.contains("projects"));
        assert!(usage.methods.contains("list"));
    }

    #[test]
    fn field_access_is_recorded() {
        let usage = usage_of("fn main() { let n = client.base_url; }");
        assert!(usage.fields.contains("base_url"));
        assert!(usage.methods.contains("base_url"));
    }

    #[test]
    fn struct_literal_keys_count_as_fields() {
        let usage = usage_of(
            r#"
            fn main() {
                let options = gitlab::ListOptions { per_page: 100, page: 1 };
                let other = local::Options { per_page: 5 };
            }
            "#,
        );
        assert!(usage.fields.contains("per_page"));
        assert!(usage.fields.contains("page"));
        assert!(usage.types.contains("ListOptions"));
        assert_eq!(usage.fields.len(), 2);
    }
}
