use serde::Serialize;

/// A single typed cell. `DateTime` carries the Excel serial number as the
/// reader delivered it; no calendar conversion happens in the core.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(f64),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Missing
    }
}

/// Inferred scalar type of a cell or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Text,
    Number,
    Bool,
    Date,
    Unknown,
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl CellValue {
    /// Parse a raw CSV field into a typed cell.
    ///
    /// Typing is done on the trimmed field, but text keeps the original
    /// untrimmed string — emptiness analysis trims again at its own layer.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Missing;
        }

        if let Ok(num) = trimmed.parse::<f64>() {
            return CellValue::Number(num);
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Bool(false);
        }

        CellValue::Text(field.to_string())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn scalar_type(&self) -> ScalarType {
        match self {
            CellValue::Missing => ScalarType::Unknown,
            CellValue::Text(_) => ScalarType::Text,
            CellValue::Number(_) => ScalarType::Number,
            CellValue::Bool(_) => ScalarType::Bool,
            CellValue::DateTime(_) => ScalarType::Date,
        }
    }

    /// Textual rendering of the cell, as it should appear in CSV output.
    /// Missing renders as the empty string.
    pub fn display(&self) -> String {
        match self {
            CellValue::Missing => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => {
                if *b {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            CellValue::DateTime(serial) => format_number(*serial),
        }
    }
}

/// Integers render without decimals, everything else via the shortest
/// f64 representation.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
