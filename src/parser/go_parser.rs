use super::{Symbol, SymbolExtractor, SymbolKind};
use crate::error::ExtractError;
use tree_sitter::{Language, Node, Parser};

/// Go symbol extractor using tree-sitter for exact declaration spans
pub struct GoParser {
    language: Language,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::language(),
        }
    }

    /// Parse Go source and emit one symbol per top-level declaration
    pub fn parse(&self, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(self.language)
            .map_err(|e| ExtractError::Language(e.to_string()))?;

        let tree = parser.parse(source, None).ok_or(ExtractError::Parse)?;
        let root = tree.root_node();

        if root.has_error() {
            let line = first_error(root).map_or(1, |n| n.start_position().row + 1);
            return Err(ExtractError::Syntax { line });
        }

        let src = source.as_bytes();
        let mut symbols = Vec::new();
        let mut cursor = root.walk();

        for decl in root.named_children(&mut cursor) {
            match decl.kind() {
                "function_declaration" | "method_declaration" => {
                    symbols.push(self.function_symbol(decl, src));
                }
                "type_declaration" => {
                    for spec in collect(decl, &["type_spec", "type_alias"]) {
                        if let Some(sym) = self.type_symbol(spec, src) {
                            symbols.push(sym);
                        }
                    }
                }
                "const_declaration" => {
                    for spec in collect(decl, &["const_spec"]) {
                        symbols.extend(self.value_symbols(spec, SymbolKind::Const, src));
                    }
                }
                "var_declaration" => {
                    for spec in collect(decl, &["var_spec"]) {
                        symbols.extend(self.value_symbols(spec, SymbolKind::Var, src));
                    }
                }
                _ => {}
            }
        }

        Ok(symbols)
    }

    fn function_symbol(&self, node: Node, src: &[u8]) -> Symbol {
        let name = field_text(node, "name", src);

        let mut signature = format!("{}(", name);
        if let Some(params) = node.child_by_field_name("parameters") {
            signature.push_str(&format_params(params, src).join(", "));
        }
        signature.push(')');

        if let Some(result) = node.child_by_field_name("result") {
            let results = if result.kind() == "parameter_list" {
                format_results(result, src)
            } else {
                vec![format_type(result, src)]
            };
            match results.len() {
                0 => {}
                1 => {
                    signature.push(' ');
                    signature.push_str(&results[0]);
                }
                _ => signature.push_str(&format!(" ({})", results.join(", "))),
            }
        }

        let mut kind = SymbolKind::Function;
        let receiver = node
            .child_by_field_name("receiver")
            .and_then(|r| first_named(r, "parameter_declaration"))
            .and_then(|p| p.child_by_field_name("type"));
        if let Some(recv) = receiver {
            kind = SymbolKind::Method;
            signature = format!("({}) {}", format_type(recv, src), signature);
        }

        Symbol {
            name,
            kind,
            signature: Some(signature),
            start_line: node.start_position().row + 1,
            end_line: node.end_position().row + 1,
            children: Vec::new(),
        }
    }

    fn type_symbol(&self, spec: Node, src: &[u8]) -> Option<Symbol> {
        let name = spec.child_by_field_name("name")?;
        let name = text(name, src).to_string();
        let ty = spec.child_by_field_name("type")?;

        let mut children = Vec::new();
        let (kind, signature) = match ty.kind() {
            "interface_type" => {
                for method in collect(ty, &["method_spec", "method_elem"]) {
                    if let Some(method_name) = method.child_by_field_name("name") {
                        children.push(Symbol {
                            name: text(method_name, src).to_string(),
                            kind: SymbolKind::Method,
                            signature: None,
                            start_line: method.start_position().row + 1,
                            end_line: method.end_position().row + 1,
                            children: Vec::new(),
                        });
                    }
                }
                (SymbolKind::Interface, format!("interface {}", name))
            }
            "struct_type" => {
                let fields = collect(ty, &["field_declaration"]).len();
                (SymbolKind::Struct, format!("struct {} ({} fields)", name, fields))
            }
            _ => (SymbolKind::Type, format!("type {}", name)),
        };

        Some(Symbol {
            name,
            kind,
            signature: Some(signature),
            start_line: spec.start_position().row + 1,
            end_line: spec.end_position().row + 1,
            children,
        })
    }

    fn value_symbols(&self, spec: Node, kind: SymbolKind, src: &[u8]) -> Vec<Symbol> {
        let ty = spec.child_by_field_name("type").map(|t| format_type(t, src));
        let mut cursor = spec.walk();

        let symbols = spec
            .children_by_field_name("name", &mut cursor)
            .filter(|n| n.is_named())
            .map(|ident| {
                let name = text(ident, src).to_string();
                let signature = match &ty {
                    Some(ty) => format!("{} {} {}", kind.as_str(), name, ty),
                    None => format!("{} {}", kind.as_str(), name),
                };
                Symbol {
                    name,
                    kind,
                    signature: Some(signature),
                    start_line: spec.start_position().row + 1,
                    end_line: spec.end_position().row + 1,
                    children: Vec::new(),
                }
            })
            .collect();
        symbols
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolExtractor for GoParser {
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        self.parse(source)
    }
}

/// Render a parameter list as `name type` pairs, one per declared name.
fn format_params(list: Node, src: &[u8]) -> Vec<String> {
    let mut params = Vec::new();
    let mut cursor = list.walk();

    for param in list.named_children(&mut cursor) {
        let ty = match param.child_by_field_name("type") {
            Some(t) if param.kind() == "variadic_parameter_declaration" => {
                format!("...{}", format_type(t, src))
            }
            Some(t) => format_type(t, src),
            None => continue,
        };

        let mut name_cursor = param.walk();
        let names: Vec<&str> = param
            .children_by_field_name("name", &mut name_cursor)
            .filter(|n| n.is_named())
            .map(|n| text(n, src))
            .collect();

        if names.is_empty() {
            params.push(ty);
        } else {
            params.extend(names.into_iter().map(|n| format!("{} {}", n, ty)));
        }
    }

    params
}

/// Result lists contribute one type per declaration, named or not.
fn format_results(list: Node, src: &[u8]) -> Vec<String> {
    let mut cursor = list.walk();
    let results = list
        .named_children(&mut cursor)
        .filter_map(|param| {
            let ty = param.child_by_field_name("type")?;
            Some(if param.kind() == "variadic_parameter_declaration" {
                format!("...{}", format_type(ty, src))
            } else {
                format_type(ty, src)
            })
        })
        .collect();
    results
}

fn format_type(node: Node, src: &[u8]) -> String {
    match node.kind() {
        "type_identifier" | "identifier" | "qualified_type" | "generic_type" => {
            text(node, src).to_string()
        }
        "pointer_type" => match node.named_child(0) {
            Some(inner) => format!("*{}", format_type(inner, src)),
            None => "*any".to_string(),
        },
        "slice_type" => format!("[]{}", field_type(node, "element", src)),
        "array_type" => format!(
            "[{}]{}",
            node.child_by_field_name("length").map_or("", |l| text(l, src)),
            field_type(node, "element", src)
        ),
        "map_type" => format!(
            "map[{}]{}",
            field_type(node, "key", src),
            field_type(node, "value", src)
        ),
        "channel_type" => format!("chan {}", field_type(node, "value", src)),
        "interface_type" => "interface{}".to_string(),
        "function_type" => "func(...)".to_string(),
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => format_type(inner, src),
            None => "any".to_string(),
        },
        _ => "any".to_string(),
    }
}

fn field_type(node: Node, field: &str, src: &[u8]) -> String {
    node.child_by_field_name(field)
        .map_or_else(|| "any".to_string(), |t| format_type(t, src))
}

fn field_text(node: Node, field: &str, src: &[u8]) -> String {
    node.child_by_field_name(field)
        .map(|n| text(n, src).to_string())
        .unwrap_or_default()
}

fn text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

fn first_named<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    found
}

/// Descendants of `node` whose kind is in `kinds`, without looking inside a match.
///
/// Grammar versions differ on wrapper nodes (`var_spec_list`, `method_spec_list`),
/// so specs are searched for rather than read from fixed positions.
fn collect<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            found.push(child);
        } else if !matches!(child.kind(), "interface_type" | "struct_type" | "function_type") {
            found.extend(collect(child, kinds));
        }
    }
    found
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(err) = first_error(child) {
                return Some(err);
            }
        }
    }
    None
}
