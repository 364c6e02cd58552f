//! Catalog query building blocks.
//!
//! # Responsibility
//! - Build bound-parameter SQL fragments from sparse filters and patches.
//! - Compute pagination metadata for filtered listings.
//!
//! Both are pure: nothing in this module touches a connection.

pub mod pagination;
pub mod predicate;
