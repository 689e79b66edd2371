//! Legacy layout type names → storage column types.

use crate::types::ColumnType;

const DEFAULT_VARCHAR_LEN: u32 = 255;
const MAX_CHAR_LEN: i64 = 255;
const MAX_VARCHAR_LEN: i64 = 65_535;
const MAX_DECIMAL_PRECISION: u32 = 65;
const MAX_DECIMAL_SCALE: u32 = 30;

/// Map a legacy type name (Oracle/DBF/SIGTAP vocabulary) plus optional declared length and scale
/// to a storage column type.
///
/// Matching is case-insensitive and by substring, in priority order: variable text, fixed text,
/// long text, decimals, integers, dates, floats, booleans. Anything unrecognized becomes
/// [`ColumnType::Text`]. Pure and total.
pub fn map_layout_type(type_name: &str, length: Option<i64>, scale: Option<i64>) -> ColumnType {
    let t = type_name.trim().to_ascii_lowercase();
    let length = length.filter(|&n| n > 0);

    if t.contains("varchar") {
        return match length {
            None => ColumnType::Varchar(DEFAULT_VARCHAR_LEN),
            Some(n) if n > MAX_VARCHAR_LEN => ColumnType::Text,
            Some(n) => ColumnType::Varchar(n as u32),
        };
    }
    if t.contains("char") {
        return match length {
            None => ColumnType::Char(1),
            Some(n) if n > MAX_VARCHAR_LEN => ColumnType::Text,
            Some(n) if n > MAX_CHAR_LEN => ColumnType::Varchar(n as u32),
            Some(n) => ColumnType::Char(n as u32),
        };
    }
    if t.contains("text") || t.contains("clob") || t.contains("memo") {
        return match length {
            Some(n) if n > MAX_VARCHAR_LEN => ColumnType::LongText,
            _ => ColumnType::Text,
        };
    }
    if t.contains("number") || t.contains("numeric") || t.contains("decimal") {
        return match length {
            Some(n) => {
                let precision = n.min(MAX_DECIMAL_PRECISION as i64) as u32;
                let scale = scale
                    .unwrap_or(0)
                    .clamp(0, MAX_DECIMAL_SCALE as i64) as u32;
                ColumnType::Decimal {
                    precision,
                    scale: scale.min(precision),
                }
            }
            None => ColumnType::Decimal {
                precision: 38,
                scale: 0,
            },
        };
    }
    if t.contains("bigint") {
        return ColumnType::BigInt;
    }
    if t.contains("int") {
        return ColumnType::Int;
    }
    if t.contains("date") && !t.contains("time") {
        return ColumnType::Date;
    }
    if t.contains("timestamp") || t.contains("datetime") || (t.contains("date") && t.contains("time")) {
        return ColumnType::DateTime;
    }
    if t.contains("float") || t.contains("double") {
        return ColumnType::Double;
    }
    if t.contains("bool") {
        return ColumnType::TinyBool;
    }
    ColumnType::Text
}
