//! SeaORM entities for the two application tables.
//!
//! The tables themselves are created and evolved by [`crate::migration`]; these
//! declarations only describe the shape the migrations leave behind.

pub mod todo;
pub mod user;
