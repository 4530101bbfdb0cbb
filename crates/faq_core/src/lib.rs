pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod knowledge;
pub mod lexical;
pub mod query;
pub mod rank;
pub mod smalltalk;
pub mod text;
