pub mod diag_store;
pub mod proptests;
