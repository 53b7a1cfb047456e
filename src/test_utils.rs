use serde::Deserialize;

use crate::parser::{Options, Value};

pub const DIRECTIVE_TESTS_FILE: &str = "tests/directive_tests.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct TestStatement {
    pub sql: String,
    pub sheet: String,
    pub export: bool,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub options: toml::Table,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TestDirective {
    pub name: String,
    pub script: String,
    pub statements: Vec<TestStatement>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TestDirectiveData {
    pub tests: Vec<TestDirective>,
}

pub fn value_from_toml(value: &toml::Value) -> Value {
    match value {
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Integer(n) => Value::Int(*n),
        toml::Value::String(s) => Value::Text(s.clone()),
        toml::Value::Array(values) => Value::List(values.iter().map(value_from_toml).collect()),
        other => Value::Text(other.to_string()),
    }
}

pub fn options_from_toml(table: &toml::Table) -> Options {
    let mut options = Options::default();
    for (key, value) in table {
        options.insert(key.clone(), value_from_toml(value));
    }
    options
}
