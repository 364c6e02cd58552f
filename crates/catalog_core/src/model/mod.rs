//! Catalog domain model.
//!
//! # Responsibility
//! - Define vehicles, owners and the sparse shapes used to filter and edit them.
//!
//! # Invariants
//! - Owner identity is the `(name, surname, patronymic)` tuple.
//! - Sparse shapes carry presence explicitly (`Option`), never as zero values.

pub mod vehicle;
