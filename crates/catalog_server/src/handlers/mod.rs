pub mod catalog;
pub mod create;
pub mod delete;
pub mod edit;
