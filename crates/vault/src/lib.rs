//! MDAI filesystem adapters.
//!
//! A *vault* is a directory of markdown documents. This crate implements the
//! host-side ports over it:
//!
//! - [`FsDocumentStore`]: [`pipeline::DocumentStore`] writing `<cid>.md` files
//!   into the vault root, never overwriting.
//! - [`FileEditor`]: [`pipeline::EditorSurface`] over one markdown file, with an
//!   optional line-range selection.
//! - [`SettingsStore`]: loads and persists the [`pipeline::Configuration`] JSON
//!   blob, merging over defaults.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All file-system I/O lives here; the [`pipeline`] and
//! `operations` crates never touch the disk.

pub mod documents;
pub mod editor;
pub mod settings;

pub use documents::FsDocumentStore;
pub use editor::{FileEditor, LineRange, LineRangeError};
pub use settings::{SettingsError, SettingsStore};
