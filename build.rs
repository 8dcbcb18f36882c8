use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct OperatorsFile {
    operator: Vec<OperatorDef>,
}

#[derive(Debug, Deserialize)]
struct OperatorDef {
    id: String,
    token: String,
    spelling: String,
    description: String,
    relational: bool,
}

#[derive(Debug, Deserialize)]
struct TagsFile {
    tag: Vec<TagDef>,
}

#[derive(Debug, Deserialize)]
struct TagDef {
    key: String,
    kind: String,
    source: String,
    #[serde(default)]
    values: Vec<String>,
    #[serde(default)]
    max_suggested_values: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct DefaultSearchesFile {
    default_search: Vec<DefaultSearchDef>,
}

#[derive(Debug, Deserialize)]
struct DefaultSearchDef {
    value: String,
    description: String,
}

const VALID_KINDS: &[&str] = &[
    "string",
    "boolean",
    "integer",
    "duration",
    "date",
    "percentage",
];

const VALID_SOURCES: &[&str] = &["predefined", "releases", "members", "lookup"];

fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

fn validate_operators(operators: &[OperatorDef]) {
    let mut seen_ids = HashSet::new();
    let mut seen_tokens = HashSet::new();

    for op in operators {
        if !seen_ids.insert(&op.id) {
            panic!("Duplicate operator ID: {}", op.id);
        }
        if !seen_tokens.insert(&op.token) {
            panic!("Duplicate operator token '{}' for '{}'", op.token, op.id);
        }
        if !op.description.contains("{tag}") {
            panic!(
                "Operator '{}' description must contain a {{tag}} placeholder",
                op.id
            );
        }
    }

    if !operators.iter().any(|op| op.id == "default") {
        panic!("operators.toml must define a 'default' operator");
    }
}

fn validate_tags(tags: &[TagDef]) {
    let mut seen_keys = HashSet::new();

    for tag in tags {
        if !seen_keys.insert(&tag.key) {
            panic!("Duplicate tag key: {}", tag.key);
        }
        if tag.key.is_empty() || tag.key.contains(':') || tag.key.contains(char::is_whitespace) {
            panic!("Invalid tag key '{}'", tag.key);
        }
        if !VALID_KINDS.contains(&tag.kind.as_str()) {
            panic!(
                "Invalid kind '{}' for tag '{}'. Valid values: {:?}",
                tag.kind, tag.key, VALID_KINDS
            );
        }
        if !VALID_SOURCES.contains(&tag.source.as_str()) {
            panic!(
                "Invalid source '{}' for tag '{}'. Valid values: {:?}",
                tag.source, tag.key, VALID_SOURCES
            );
        }
    }
}

fn generate_operators_code(operators: &[OperatorDef]) -> String {
    let mut code = String::new();

    code.push_str("#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]\n");
    code.push_str("pub enum Operator {\n");
    for op in operators {
        code.push_str(&format!("    {},\n", to_pascal_case(&op.id)));
    }
    code.push_str("}\n\n");

    code.push_str("#[derive(Clone, Debug, PartialEq)]\n");
    code.push_str("pub struct OperatorSyntax {\n");
    code.push_str("    pub operator: Operator,\n");
    code.push_str("    /// Text following the colon in a filter\n");
    code.push_str("    pub token: &'static str,\n");
    code.push_str("    /// Text an accepted helper writes after the key\n");
    code.push_str("    pub spelling: &'static str,\n");
    code.push_str("    pub description: &'static str,\n");
    code.push_str("    pub relational: bool,\n");
    code.push_str("}\n\n");

    code.push_str("pub static OPERATORS: &[OperatorSyntax] = &[\n");
    for op in operators {
        code.push_str(&format!(
            "    OperatorSyntax {{\n        operator: Operator::{},\n        token: r#\"{}\"#,\n        spelling: r#\"{}\"#,\n        description: r#\"{}\"#,\n        relational: {},\n    }},\n",
            to_pascal_case(&op.id),
            op.token,
            op.spelling,
            op.description,
            op.relational
        ));
    }
    code.push_str("];\n\n");

    code.push_str("pub fn operator_syntax(operator: Operator) -> &'static OperatorSyntax {\n");
    code.push_str("    match operator {\n");
    for (i, op) in operators.iter().enumerate() {
        code.push_str(&format!(
            "        Operator::{} => &OPERATORS[{}],\n",
            to_pascal_case(&op.id),
            i
        ));
    }
    code.push_str("    }\n");
    code.push_str("}\n");

    code
}

fn generate_tags_code(tags: &[TagDef]) -> String {
    let mut code = String::new();

    code.push_str("#[derive(Clone, Debug, PartialEq)]\n");
    code.push_str("pub struct BuiltinTag {\n");
    code.push_str("    pub key: &'static str,\n");
    code.push_str("    pub kind: crate::tags::FieldKind,\n");
    code.push_str("    pub source: crate::tags::ValueSource,\n");
    code.push_str("    pub values: &'static [&'static str],\n");
    code.push_str("    pub max_suggested_values: Option<usize>,\n");
    code.push_str("}\n\n");

    code.push_str("pub static BUILTIN_TAGS: &[BuiltinTag] = &[\n");
    for tag in tags {
        let quoted: Vec<String> = tag.values.iter().map(|v| format!(r#""{v}""#)).collect();
        let max_str = match tag.max_suggested_values {
            Some(n) => format!("Some({n})"),
            None => "None".to_string(),
        };
        code.push_str(&format!(
            "    BuiltinTag {{\n        key: r#\"{}\"#,\n        kind: crate::tags::FieldKind::{},\n        source: crate::tags::ValueSource::{},\n        values: &[{}],\n        max_suggested_values: {},\n    }},\n",
            tag.key,
            to_pascal_case(&tag.kind),
            to_pascal_case(&tag.source),
            quoted.join(", "),
            max_str
        ));
    }
    code.push_str("];\n");

    code
}

fn generate_default_searches_code(searches: &[DefaultSearchDef]) -> String {
    let mut code = String::new();

    code.push_str("#[derive(Clone, Debug, PartialEq)]\n");
    code.push_str("pub struct DefaultSearch {\n");
    code.push_str("    pub value: &'static str,\n");
    code.push_str("    pub description: &'static str,\n");
    code.push_str("}\n\n");

    code.push_str("pub static DEFAULT_SEARCHES: &[DefaultSearch] = &[\n");
    for search in searches {
        code.push_str(&format!(
            "    DefaultSearch {{\n        value: r#\"{}\"#,\n        description: r#\"{}\"#,\n    }},\n",
            search.value, search.description
        ));
    }
    code.push_str("];\n");

    code
}

fn main() {
    let manifest_dir_str = env::var("CARGO_MANIFEST_DIR").unwrap();
    let manifest_dir = Path::new(&manifest_dir_str);
    let registry_dir = manifest_dir.join("src/registry");
    let out_dir = env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir).join("registry_generated.rs");

    println!("cargo:rerun-if-changed=src/registry/operators.toml");
    println!("cargo:rerun-if-changed=src/registry/tags.toml");
    println!("cargo:rerun-if-changed=src/registry/default_searches.toml");

    let operators_toml = fs::read_to_string(registry_dir.join("operators.toml"))
        .expect("Failed to read operators.toml");
    let tags_toml =
        fs::read_to_string(registry_dir.join("tags.toml")).expect("Failed to read tags.toml");
    let defaults_toml = fs::read_to_string(registry_dir.join("default_searches.toml"))
        .expect("Failed to read default_searches.toml");

    let operators: OperatorsFile =
        toml::from_str(&operators_toml).expect("Failed to parse operators.toml");
    let tags: TagsFile = toml::from_str(&tags_toml).expect("Failed to parse tags.toml");
    let defaults: DefaultSearchesFile =
        toml::from_str(&defaults_toml).expect("Failed to parse default_searches.toml");

    validate_operators(&operators.operator);
    validate_tags(&tags.tag);

    let mut code = String::new();

    code.push_str(&generate_operators_code(&operators.operator));
    code.push('\n');
    code.push_str(&generate_tags_code(&tags.tag));
    code.push('\n');
    code.push_str(&generate_default_searches_code(&defaults.default_search));

    fs::write(&out_path, code).expect("Failed to write generated code");
}
