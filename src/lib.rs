//! `sigtap-loader` loads folders of heterogeneous tabular files into MySQL tables.
//!
//! Inputs are files of unknown encoding, delimiter and layout. Some are plain delimited text,
//! some are fixed-width text described by a companion `*_layout` descriptor, some are dBase
//! tables, and any of them may arrive inside `.zip` archives. The primary entrypoint is
//! [`loader::Loader::run`], which walks an input path, resolves every file to a target table and
//! writes it through a [`storage::TableSink`].
//!
//! ## What gets loaded
//!
//! **File formats (detected by extension):**
//!
//! - **Delimited text**: `.txt`, `.csv` (encoding and delimiter auto-detected)
//! - **Fixed-width text**: `.txt`, `.csv` governed by a layout descriptor
//! - **dBase**: `.dbf`
//! - **Archives**: `.zip`, expanded one level deep into scratch directories
//!
//! **Table naming:**
//!
//! - A file governed by a layout (`tb_procedimento_layout.csv` for `tb_procedimento_202301.txt`)
//!   loads into the layout's base table (`tb_procedimento`) with the layout's declared types.
//! - Any other file loads into its sanitized stem suffixed with the competency
//!   (`producao.txt` under `202301/` becomes `producao_202301`), with a leading `competencia`
//!   column holding the tag.
//!
//! Every value is carried as text ([`types::Value`]); coercion is left to the declared column
//! types ([`types::ColumnType`]).
//!
//! ## Quick example: dry run
//!
//! ```no_run
//! use std::path::Path;
//! use sigtap_loader::loader::{LoadOptions, Loader};
//! use sigtap_loader::storage::MemorySink;
//!
//! # fn main() -> Result<(), sigtap_loader::LoadError> {
//! let options = LoadOptions {
//!     dry_run: true,
//!     ..Default::default()
//! };
//! let summary = Loader::new(MemorySink::new(), options).run(Path::new("sigtap/202301"))?;
//! for plan in &summary.plans {
//!     println!("{} -> {} ({:?})", plan.path.display(), plan.table, plan.strategy);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Reading a single file
//!
//! ```rust
//! use sigtap_loader::ingestion::delimited::read_delimited_str;
//! use sigtap_loader::detect::detect_delimiter;
//!
//! let text = "CO_PROCEDIMENTO;NO_PROCEDIMENTO\n0301010072;CONSULTA MEDICA\n";
//! let ds = read_delimited_str(text, detect_delimiter(text)).unwrap();
//! assert_eq!(ds.schema.field_names().collect::<Vec<_>>(), ["co_procedimento", "no_procedimento"]);
//! assert_eq!(ds.row_count(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`detect`]: encoding and delimiter detection
//! - [`naming`]: identifier sanitizing and competency tags
//! - [`layout`]: layout descriptors and legacy type mapping
//! - [`ingestion`]: delimited, fixed-width and DBF readers
//! - [`storage`]: table sinks, DDL and provisioning (MySQL behind the `mysql` feature)
//! - [`loader`]: discovery, resolution and the load run
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types used across the crate

pub mod detect;
pub mod error;
pub mod ingestion;
pub mod layout;
pub mod loader;
pub mod naming;
pub mod storage;
pub mod types;

pub use error::{LoadError, LoadResult};
