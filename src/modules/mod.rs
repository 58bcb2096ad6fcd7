//! Modules layer - adapters for the backing services
//!
//! `backend` gives typed access to the metadata tables, `storage` to the
//! object bucket holding file contents.

pub mod backend;
pub mod storage;
