/// Derived analytics over factor tables.
pub mod correlation;
pub mod returns;
