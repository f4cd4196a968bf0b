//! Database query functions organized by table.

pub mod observations;
pub mod reporters;
pub mod stats;
