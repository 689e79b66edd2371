//! Layout descriptors and legacy type mapping.
//!
//! - [`type_map`]: legacy type vocabulary → [`crate::types::ColumnType`]
//! - [`parser`]: descriptor tables → [`TableLayout`] (column specs + fixed-width positions)

pub mod parser;
pub mod type_map;

pub use parser::{
    parse_layout, read_layout_file, ColumnSpec, LayoutPosition, TableLayout,
    REQUIRED_LAYOUT_COLUMNS,
};
pub use type_map::map_layout_type;
