use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One cell of an executed query's result.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of a cell. Text never coerces.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(text) => write!(f, "{}", text),
        }
    }
}

/// An executed query's column names and rows.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct ResultTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl ResultTable {
    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.column_names
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| {
                Error::Configuration(format!("Found no result column named `{}`", name))
            })
    }

    fn cell(&self, row: usize, column: usize) -> Result<&Scalar> {
        self.rows[row].get(column).ok_or_else(|| {
            Error::Execution(format!(
                "Result row {} holds {} cells for {} columns",
                row + 1,
                self.rows[row].len(),
                self.column_count()
            ))
        })
    }
}

/// Reshape a long-format table into a wide one: one row per distinct
/// `index` value, one column per distinct `columns` value (both in
/// first-occurrence order), cells taken from `values`. Distinctness goes
/// by the cells' rendered text. Duplicate (index, columns) pairs keep the
/// later row; combinations never observed stay `Null`.
pub fn pivot(table: &ResultTable, index: &str, columns: &str, values: &str) -> Result<ResultTable> {
    let index_idx = table.column_index(index)?;
    let columns_idx = table.column_index(columns)?;
    let values_idx = table.column_index(values)?;

    let mut index_cells: IndexMap<String, Scalar> = IndexMap::new();
    let mut column_keys: IndexSet<String> = IndexSet::new();
    let mut cells: IndexMap<String, IndexMap<String, Scalar>> = IndexMap::new();

    for row in 0..table.rows.len() {
        let index_cell = table.cell(row, index_idx)?.clone();
        let column_cell = table.cell(row, columns_idx)?;
        let value_cell = table.cell(row, values_idx)?.clone();

        let row_key = index_cell.to_string();
        let column_key = column_cell.to_string();
        index_cells.entry(row_key.clone()).or_insert(index_cell);
        column_keys.insert(column_key.clone());
        cells
            .entry(row_key)
            .or_default()
            .insert(column_key, value_cell);
    }

    let mut column_names = Vec::with_capacity(column_keys.len() + 1);
    column_names.push(table.column_names[index_idx].clone());
    column_names.extend(column_keys.iter().cloned());

    let mut rows = Vec::with_capacity(index_cells.len());
    for (row_key, index_cell) in &index_cells {
        let mut out_row = Vec::with_capacity(column_names.len());
        out_row.push(index_cell.clone());
        for column_key in &column_keys {
            let cell = cells
                .get(row_key)
                .and_then(|row_cells| row_cells.get(column_key))
                .cloned()
                .unwrap_or(Scalar::Null);
            out_row.push(cell);
        }
        rows.push(out_row);
    }

    Ok(ResultTable { column_names, rows })
}

/// Bind parameters accompanying one statement.
#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum SqlParams {
    Positional(Vec<Scalar>),
    Named(IndexMap<String, Scalar>),
}

/// Rewrite `?` placeholders to `:param_N` names, pairing each with its
/// positional value, for executors that only take named parameters.
/// Placeholders inside quoted text are left alone.
pub fn bind_positional(
    sql: &str,
    values: &[Scalar],
) -> Result<(String, IndexMap<String, Scalar>)> {
    let mut rewritten = String::with_capacity(sql.len());
    let mut named: IndexMap<String, Scalar> = IndexMap::new();
    let mut in_string: Option<char> = None;
    let mut n = 0;

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match in_string {
            Some(delimiter) => {
                rewritten.push(c);
                if c == delimiter {
                    // A doubled delimiter stays inside the literal.
                    if chars.peek() == Some(&delimiter) {
                        rewritten.push(delimiter);
                        chars.next();
                    } else {
                        in_string = None;
                    }
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_string = Some(c);
                    rewritten.push(c);
                }
                '?' => {
                    n += 1;
                    let name = format!("param_{}", n);
                    rewritten.push(':');
                    rewritten.push_str(&name);
                    if let Some(value) = values.get(n - 1) {
                        named.insert(name, value.clone());
                    }
                }
                _ => rewritten.push(c),
            },
        }
    }

    if n != values.len() {
        return Err(Error::Configuration(format!(
            "Found {} placeholders for {} parameters",
            n,
            values.len()
        )));
    }
    Ok((rewritten, named))
}
