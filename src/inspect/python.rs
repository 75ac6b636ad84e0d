//! Python module syntax extraction via tree-sitter.
//!
//! Pulls the structural skeleton out of one source file: top-level import
//! bindings, class definitions (bases, methods, abstract marker), and free
//! functions. Anything else in the file is ignored. Malformed regions parse
//! to error nodes and are skipped, never fatal.

use tree_sitter::Node;

/// One `import`/`from` statement, reduced to the names it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStmt {
    /// `import a.b` / `import a.b as c`
    Import { path: String, alias: Option<String> },
    /// `from a.b import x, y as z` / `from . import x`. `level` counts the
    /// leading dots, `base` is the dotted path after them (if any).
    ImportFrom {
        level: usize,
        base: Option<String>,
        names: Vec<ImportedName>,
    },
}

/// A single name bound by a `from … import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// The name the import binds in the module namespace.
    pub fn bound(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A top-level class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSyntax {
    pub name: String,
    /// Base expressions as written: `Base`, `mod.Base`.
    pub bases: Vec<String>,
    /// Names of `def`s directly in the class body.
    pub methods: Vec<String>,
    /// True when the bases name `ABC` or the metaclass is `ABCMeta`.
    pub is_abstract: bool,
}

/// The structural skeleton of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSyntax {
    pub imports: Vec<ImportStmt>,
    pub classes: Vec<ClassSyntax>,
    pub functions: Vec<String>,
}

/// Parse one module. `None` only when the parser itself cannot run; partial
/// or broken source still produces a (possibly empty) skeleton.
pub fn parse_module(source: &str) -> Option<ModuleSyntax> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();

    let mut syntax = ModuleSyntax::default();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        extract_statement(&child, source.as_bytes(), &mut syntax);
    }
    Some(syntax)
}

/// Extract one top-level statement into the skeleton.
fn extract_statement(node: &Node, source: &[u8], syntax: &mut ModuleSyntax) {
    match node.kind() {
        "import_statement" => {
            syntax.imports.extend(extract_import(node, source));
        }
        "import_from_statement" => {
            if let Some(stmt) = extract_import_from(node, source) {
                syntax.imports.push(stmt);
            }
        }
        "function_definition" => {
            if let Some(name) = field_text(node, "name", source) {
                syntax.functions.push(name);
            }
        }
        "class_definition" => {
            if let Some(class) = extract_class(node, source) {
                syntax.classes.push(class);
            }
        }
        "decorated_definition" => {
            if let Some(inner) = node.child_by_field_name("definition") {
                extract_statement(&inner, source, syntax);
            }
        }
        _ => {}
    }
}

/// `import a.b, c as d`: one binding per listed path.
fn extract_import(node: &Node, source: &[u8]) -> Vec<ImportStmt> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" => {
                if let Some(path) = node_text(&name, source) {
                    out.push(ImportStmt::Import { path, alias: None });
                }
            }
            "aliased_import" => {
                let path = name
                    .child_by_field_name("name")
                    .and_then(|n| node_text(&n, source));
                let alias = name
                    .child_by_field_name("alias")
                    .and_then(|n| node_text(&n, source));
                if let Some(path) = path {
                    out.push(ImportStmt::Import { path, alias });
                }
            }
            _ => {}
        }
    }
    out
}

/// `from [.]*base import x, y as z`. Wildcard imports bind nothing we can
/// name statically and are dropped.
fn extract_import_from(node: &Node, source: &[u8]) -> Option<ImportStmt> {
    let module_name = node.child_by_field_name("module_name")?;
    let (level, base) = match module_name.kind() {
        "relative_import" => {
            let text = node_text(&module_name, source)?;
            let level = text.chars().take_while(|&c| c == '.').count();
            let rest = text.trim_start_matches('.');
            let base = if rest.is_empty() {
                None
            } else {
                Some(rest.to_string())
            };
            (level, base)
        }
        _ => (0, node_text(&module_name, source)),
    };

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" => {
                if let Some(text) = node_text(&name, source) {
                    names.push(ImportedName {
                        name: text,
                        alias: None,
                    });
                }
            }
            "aliased_import" => {
                let inner = name
                    .child_by_field_name("name")
                    .and_then(|n| node_text(&n, source));
                let alias = name
                    .child_by_field_name("alias")
                    .and_then(|n| node_text(&n, source));
                if let Some(inner) = inner {
                    names.push(ImportedName { name: inner, alias });
                }
            }
            _ => {}
        }
    }

    if names.is_empty() {
        // `from x import *`
        return None;
    }
    Some(ImportStmt::ImportFrom { level, base, names })
}

/// Class name, base expressions, direct methods, abstract marker.
fn extract_class(node: &Node, source: &[u8]) -> Option<ClassSyntax> {
    let name = field_text(node, "name", source)?;
    let mut bases = Vec::new();
    let mut is_abstract = false;

    if let Some(superclasses) = node.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for arg in superclasses.named_children(&mut cursor) {
            match arg.kind() {
                "identifier" | "attribute" => {
                    if let Some(text) = node_text(&arg, source) {
                        if is_abstract_marker(&text) {
                            is_abstract = true;
                        }
                        bases.push(text);
                    }
                }
                "keyword_argument" => {
                    let key = arg
                        .child_by_field_name("name")
                        .and_then(|n| node_text(&n, source));
                    let value = arg
                        .child_by_field_name("value")
                        .and_then(|n| node_text(&n, source));
                    if key.as_deref() == Some("metaclass")
                        && value.is_some_and(|v| v.contains("ABCMeta"))
                    {
                        is_abstract = true;
                    }
                }
                _ => {}
            }
        }
    }

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for stmt in body.named_children(&mut cursor) {
            match stmt.kind() {
                "function_definition" => {
                    if let Some(method) = field_text(&stmt, "name", source) {
                        methods.push(method);
                    }
                }
                "decorated_definition" => {
                    if let Some(inner) = stmt.child_by_field_name("definition") {
                        if inner.kind() == "function_definition" {
                            if let Some(method) = field_text(&inner, "name", source) {
                                methods.push(method);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    Some(ClassSyntax {
        name,
        bases,
        methods,
        is_abstract,
    })
}

fn is_abstract_marker(base: &str) -> bool {
    base == "ABC" || base == "ABCMeta" || base.ends_with(".ABC") || base.ends_with(".ABCMeta")
}

fn field_text(node: &Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| node_text(&n, source))
}

fn node_text(node: &Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ModuleSyntax {
        parse_module(source).unwrap()
    }

    #[test]
    fn extracts_plain_and_aliased_imports() {
        let syntax = parse("import os\nimport os.path as osp\nimport a.b.c\n");
        assert_eq!(
            syntax.imports,
            vec![
                ImportStmt::Import {
                    path: "os".into(),
                    alias: None
                },
                ImportStmt::Import {
                    path: "os.path".into(),
                    alias: Some("osp".into())
                },
                ImportStmt::Import {
                    path: "a.b.c".into(),
                    alias: None
                },
            ]
        );
    }

    #[test]
    fn extracts_from_imports() {
        let syntax = parse("from pkg.sub import alpha, beta as b\n");
        assert_eq!(
            syntax.imports,
            vec![ImportStmt::ImportFrom {
                level: 0,
                base: Some("pkg.sub".into()),
                names: vec![
                    ImportedName {
                        name: "alpha".into(),
                        alias: None
                    },
                    ImportedName {
                        name: "beta".into(),
                        alias: Some("b".into())
                    },
                ],
            }]
        );
    }

    #[test]
    fn extracts_relative_imports() {
        let syntax = parse("from . import sibling\nfrom ..up import thing\n");
        assert_eq!(
            syntax.imports,
            vec![
                ImportStmt::ImportFrom {
                    level: 1,
                    base: None,
                    names: vec![ImportedName {
                        name: "sibling".into(),
                        alias: None
                    }],
                },
                ImportStmt::ImportFrom {
                    level: 2,
                    base: Some("up".into()),
                    names: vec![ImportedName {
                        name: "thing".into(),
                        alias: None
                    }],
                },
            ]
        );
    }

    #[test]
    fn wildcard_import_binds_nothing() {
        let syntax = parse("from os.path import *\n");
        assert!(syntax.imports.is_empty());
    }

    #[test]
    fn extracts_functions_and_classes() {
        let syntax = parse(
            r#"
def top():
    pass

class Greeter:
    def hello(self):
        pass

    def goodbye(self):
        pass

def later():
    pass
"#,
        );
        assert_eq!(syntax.functions, vec!["top", "later"]);
        assert_eq!(syntax.classes.len(), 1);
        let class = &syntax.classes[0];
        assert_eq!(class.name, "Greeter");
        assert!(class.bases.is_empty());
        assert_eq!(class.methods, vec!["hello", "goodbye"]);
        assert!(!class.is_abstract);
    }

    #[test]
    fn extracts_bases_and_abstract_marker() {
        let syntax = parse(
            r#"
from abc import ABC

class Shape(ABC):
    def area(self):
        pass

class Square(Shape, mixins.Printable):
    pass

class Meta(metaclass=ABCMeta):
    pass
"#,
        );
        let shape = &syntax.classes[0];
        assert_eq!(shape.bases, vec!["ABC"]);
        assert!(shape.is_abstract);

        let square = &syntax.classes[1];
        assert_eq!(square.bases, vec!["Shape", "mixins.Printable"]);
        assert!(!square.is_abstract);

        let meta = &syntax.classes[2];
        assert!(meta.bases.is_empty());
        assert!(meta.is_abstract);
    }

    #[test]
    fn decorated_definitions_are_unwrapped() {
        let syntax = parse(
            r#"
@cached
def helper():
    pass

class Service:
    @property
    def value(self):
        return 1
"#,
        );
        assert_eq!(syntax.functions, vec!["helper"]);
        assert_eq!(syntax.classes[0].methods, vec!["value"]);
    }

    #[test]
    fn empty_source_yields_empty_skeleton() {
        let syntax = parse("");
        assert!(syntax.imports.is_empty());
        assert!(syntax.classes.is_empty());
        assert!(syntax.functions.is_empty());
    }

    #[test]
    fn malformed_source_is_not_fatal() {
        let syntax = parse("def broken( { class }}}\n\ndef fine():\n    pass\n");
        assert!(syntax.functions.contains(&"fine".to_string()));
    }
}
