pub mod facet;
pub mod structure;
