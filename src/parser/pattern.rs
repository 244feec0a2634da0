//! Line-oriented extractors for languages without a grammar-aware parser.
//!
//! Every symbol found here spans exactly the line it was declared on: block
//! ends are not tracked, and nothing is nested.

use super::{Symbol, SymbolExtractor, SymbolKind};
use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

static TS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:async\s+)?function(?:\s*\*\s*|\s+)(\w+)\s*[<(]")
        .unwrap()
});
static TS_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(\w+)").unwrap()
});
static TS_INTERFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:export\s+)?interface\s+(\w+)").unwrap());
static TS_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:export\s+)?type\s+(\w+)(?:<[^=]*>)?\s*=").unwrap());
static TS_CONST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(?:export\s+)?const\s+(\w+)\s*[=:]").unwrap());

static PY_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(?:async\s+)?def\s+(\w+)\s*\(").unwrap());
static PY_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^class\s+(\w+)").unwrap());

static GENERIC_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:pub(?:lic)?\s+)?(?:static\s+)?(?:async\s+)?(?:\w+\s+)?(\w+)\s*\([^)]*\)\s*[{:]",
    )
    .unwrap()
});

/// Control-flow keywords that look like calls followed by a brace.
const NOT_FUNCTIONS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "match", "with",
];

/// TypeScript and JavaScript declarations anchored at column zero
pub struct ScriptExtractor;

impl SymbolExtractor for ScriptExtractor {
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        let mut symbols = Vec::new();

        for (i, line) in source.split('\n').enumerate() {
            let line_num = i + 1;

            if let Some(caps) = TS_FUNCTION.captures(line) {
                symbols.push(Symbol::at_line(&caps[1], SymbolKind::Function, line_num));
            }
            if let Some(caps) = TS_CLASS.captures(line) {
                symbols.push(Symbol::at_line(&caps[1], SymbolKind::Class, line_num));
            }
            if let Some(caps) = TS_INTERFACE.captures(line) {
                symbols.push(Symbol::at_line(&caps[1], SymbolKind::Interface, line_num));
            }
            if let Some(caps) = TS_TYPE.captures(line) {
                symbols.push(Symbol::at_line(&caps[1], SymbolKind::Type, line_num));
            }
            if let Some(caps) = TS_CONST.captures(line) {
                // Indented consts belong to a function or class body
                if caps[1].is_empty() {
                    symbols.push(Symbol::at_line(&caps[2], SymbolKind::Const, line_num));
                }
            }
        }

        Ok(symbols)
    }
}

/// Python `def`, `async def` and `class` statements
pub struct PythonExtractor;

impl SymbolExtractor for PythonExtractor {
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        let mut symbols = Vec::new();

        for (i, line) in source.split('\n').enumerate() {
            let line_num = i + 1;

            if let Some(caps) = PY_DEF.captures(line) {
                let kind = if caps[1].is_empty() {
                    SymbolKind::Function
                } else {
                    SymbolKind::Method
                };
                symbols.push(Symbol::at_line(&caps[2], kind, line_num));
            }
            if let Some(caps) = PY_CLASS.captures(line) {
                symbols.push(Symbol::at_line(&caps[1], SymbolKind::Class, line_num));
            }
        }

        Ok(symbols)
    }
}

/// Loose C-family function matcher for languages without a dedicated extractor
pub struct GenericExtractor;

impl SymbolExtractor for GenericExtractor {
    fn extract(&self, source: &str) -> Result<Vec<Symbol>, ExtractError> {
        let symbols = source
            .split('\n')
            .enumerate()
            .filter_map(|(i, line)| {
                let caps = GENERIC_FUNCTION.captures(line)?;
                let name = caps.get(1)?.as_str();
                if NOT_FUNCTIONS.contains(&name) {
                    return None;
                }
                Some(Symbol::at_line(name, SymbolKind::Function, i + 1))
            })
            .collect();

        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_export_class_on_line_five() {
        let code = "import x from 'y';\n\n// comment\n\nexport class Foo {\n}\n";
        let symbols = ScriptExtractor.extract(code).unwrap();

        assert_eq!(symbols, vec![Symbol::at_line("Foo", SymbolKind::Class, 5)]);
    }

    #[test]
    fn test_script_declarations() {
        let code = r#"
export function myFunction(arg: string): void {
  console.log(arg);
}

export class MyClass {
  constructor() {}
}

interface MyInterface {
  field: string;
}

export type MyType<T> = T | number;

const myConst = 42;
export async function load<T>(url: string) {
  const inner = 1;
}
"#;
        let symbols = ScriptExtractor.extract(code).unwrap();
        let found: Vec<_> = symbols.iter().map(|s| (s.name.as_str(), s.kind)).collect();

        assert_eq!(
            found,
            vec![
                ("myFunction", SymbolKind::Function),
                ("MyClass", SymbolKind::Class),
                ("MyInterface", SymbolKind::Interface),
                ("MyType", SymbolKind::Type),
                ("myConst", SymbolKind::Const),
                ("load", SymbolKind::Function),
            ]
        );
        assert!(symbols.iter().all(|s| s.start_line == s.end_line));
        assert_eq!(symbols[0].start_line, 2);
    }

    #[test]
    fn test_python_methods_from_indentation() {
        let code = r#"
def my_function(arg):
    return arg

async def async_function():
    pass

class MyClass:
    def __init__(self):
        pass

	def tabbed(self):
		pass
"#;
        let symbols = PythonExtractor.extract(code).unwrap();
        let found: Vec<_> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.kind, s.start_line))
            .collect();

        assert_eq!(
            found,
            vec![
                ("my_function", SymbolKind::Function, 2),
                ("async_function", SymbolKind::Function, 5),
                ("MyClass", SymbolKind::Class, 8),
                ("__init__", SymbolKind::Method, 9),
                ("tabbed", SymbolKind::Method, 12),
            ]
        );
    }

    #[test]
    fn test_generic_functions() {
        let code = r#"
public static int compute(int a) {
    if (a > 0) {
        return a;
    }
}

void helper() {
}
"#;
        let symbols = GenericExtractor.extract(code).unwrap();
        let names: Vec<_> = symbols.iter().map(|s| s.name.as_str()).collect();

        assert_eq!(names, vec!["compute", "helper"]);
        assert!(symbols.iter().all(|s| s.kind == SymbolKind::Function));
        assert_eq!(symbols[1].start_line, 8);
    }
}
