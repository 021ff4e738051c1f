//! MDAI directive operations.
//!
//! This crate provides the input gatherer and the [`DirectiveRunner`], which
//! drives the four user-facing operations:
//!
//! | Operation | Input | Result |
//! |-----------|-------|--------|
//! | execute directive | full document | new `<cid>.md` document |
//! | execute directive with input | document + prompted line | new `<cid>.md` document |
//! | generate directive | selection, else document, behind the directive template | new `<cid>.md` document |
//! | complete in place | selection only | selection replaced |
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Operations sequence calls between business logic in
//! the [`pipeline`] crate and the port traits (completion client, document
//! store, editor, prompt). They contain no transport details of their own.
//!
//! Every operation returns an [`OperationReport`]; failures are logged and
//! reported, never raised.

pub mod gather;
pub mod report;
pub mod runner;

pub use report::{OperationKind, OperationOutcome, OperationReport, OperationState};
pub use runner::DirectiveRunner;
