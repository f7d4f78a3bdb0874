//! Output formats for lookup, funnel and remediation results.

pub mod csv;
pub mod json;
pub mod table;
