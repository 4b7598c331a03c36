//! Dialogue model: settings, identifiers, exchanged pairs and terminal reports.

pub mod entities;
pub mod value_objects;
