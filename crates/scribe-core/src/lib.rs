//! Core pipeline for scribe: prompt construction, response extraction,
//! hierarchy assembly, and transactional persistence.

pub mod generator;
pub mod wbs;
