//! Domain model module declarations.

pub mod survey;
