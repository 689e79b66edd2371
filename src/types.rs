//! Core data model types for ingestion.
//!
//! Readers produce an in-memory [`DataSet`]: a [`Schema`] (ordered, typed [`Field`]s) plus
//! row-major [`Value`]s. Every value is carried as text; numeric and date coercion is left to the
//! storage layer, which declares each column with a [`ColumnType`].

use std::fmt;

use serde::Serialize;

/// Storage column type, rendered as a MySQL type string through [`fmt::Display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColumnType {
    /// `VARCHAR(n)`.
    Varchar(u32),
    /// `CHAR(n)`.
    Char(u32),
    /// `TEXT`.
    Text,
    /// `LONGTEXT`.
    LongText,
    /// `DECIMAL(precision, scale)`.
    Decimal { precision: u32, scale: u32 },
    /// `BIGINT`.
    BigInt,
    /// `INT`.
    Int,
    /// `DATE`.
    Date,
    /// `DATETIME`.
    DateTime,
    /// `DOUBLE`.
    Double,
    /// `TINYINT(1)`.
    TinyBool,
}

impl ColumnType {
    /// Whether values of this type are stored as free text.
    ///
    /// Non-text columns cannot hold an empty string, so loaders turn empty values into NULL
    /// before writing them.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::Varchar(_) | Self::Char(_) | Self::Text | Self::LongText
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Varchar(n) => write!(f, "VARCHAR({n})"),
            Self::Char(n) => write!(f, "CHAR({n})"),
            Self::Text => f.write_str("TEXT"),
            Self::LongText => f.write_str("LONGTEXT"),
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            Self::BigInt => f.write_str("BIGINT"),
            Self::Int => f.write_str("INT"),
            Self::Date => f.write_str("DATE"),
            Self::DateTime => f.write_str("DATETIME"),
            Self::Double => f.write_str("DOUBLE"),
            Self::TinyBool => f.write_str("TINYINT(1)"),
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Normalized column name.
    pub name: String,
    /// Declared (layout) or inferred storage type.
    pub column_type: ColumnType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    /// A free-text field, the type given to every column a reader discovers on its own.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single cell in a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Missing value, written as SQL `NULL`.
    Null,
    /// Raw text exactly as read (possibly empty).
    Text(String),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Borrow the text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.as_str()),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// A dataset with the given schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Insert a column holding `value` in every row at position 0.
    pub fn prepend_constant(&mut self, field: Field, value: Value) {
        self.schema.fields.insert(0, field);
        for row in &mut self.rows {
            row.insert(0, value.clone());
        }
    }

    /// Re-shape the dataset to exactly `target`'s fields, in `target`'s order.
    ///
    /// Columns missing from `self` are filled with [`Value::Null`]; columns not in `target` are
    /// dropped. Empty strings landing in non-textual columns become [`Value::Null`].
    pub fn align_to(&self, target: &Schema) -> DataSet {
        let sources: Vec<Option<usize>> = target
            .fields
            .iter()
            .map(|f| self.schema.index_of(&f.name))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                target
                    .fields
                    .iter()
                    .zip(&sources)
                    .map(|(field, src)| {
                        let value = src.and_then(|i| row.get(i)).cloned().unwrap_or(Value::Null);
                        match value {
                            Value::Text(s) if s.is_empty() && !field.column_type.is_textual() => {
                                Value::Null
                            }
                            other => other,
                        }
                    })
                    .collect()
            })
            .collect();

        DataSet::new(target.clone(), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataSet {
        DataSet::new(
            Schema::new(vec![Field::text("a"), Field::text("extra"), Field::text("b")]),
            vec![
                vec![Value::text("1"), Value::text("x"), Value::text("")],
                vec![Value::text("2"), Value::text("y"), Value::text("z")],
            ],
        )
    }

    #[test]
    fn column_types_render_mysql_names() {
        assert_eq!(ColumnType::Varchar(255).to_string(), "VARCHAR(255)");
        assert_eq!(
            ColumnType::Decimal { precision: 38, scale: 0 }.to_string(),
            "DECIMAL(38,0)"
        );
        assert_eq!(ColumnType::TinyBool.to_string(), "TINYINT(1)");
        assert_eq!(ColumnType::Char(6).to_string(), "CHAR(6)");
    }

    #[test]
    fn align_reorders_fills_and_drops() {
        let target = Schema::new(vec![
            Field::new("b", ColumnType::Int),
            Field::new("missing", ColumnType::Text),
            Field::new("a", ColumnType::Varchar(3)),
        ]);
        let out = sample().align_to(&target);

        assert_eq!(out.schema, target);
        assert_eq!(
            out.rows,
            vec![
                vec![Value::Null, Value::Null, Value::text("1")],
                vec![Value::text("z"), Value::Null, Value::text("2")],
            ]
        );
    }

    #[test]
    fn empty_strings_survive_in_text_columns() {
        let target = Schema::new(vec![Field::text("b")]);
        let out = sample().align_to(&target);
        assert_eq!(out.rows[0], vec![Value::text("")]);
    }

    #[test]
    fn prepend_constant_adds_leading_column() {
        let mut ds = sample();
        ds.prepend_constant(Field::new("competencia", ColumnType::Char(6)), Value::text("202301"));
        assert_eq!(ds.schema.index_of("competencia"), Some(0));
        assert_eq!(ds.get(1, "competencia"), Some(&Value::text("202301")));
        assert_eq!(ds.get(1, "a"), Some(&Value::text("2")));
    }
}
