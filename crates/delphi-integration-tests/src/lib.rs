//! Integration test crate for the Delphi oracle.
//!
//! This crate has no library code. It only contains integration tests
//! that exercise end-to-end flows across the engine, the SQLite store and
//! signed action envelopes.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p delphi-integration-tests
//! ```
