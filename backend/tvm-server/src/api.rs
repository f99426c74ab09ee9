pub mod error;
pub mod extractors;
pub mod identity;
pub mod scope;
