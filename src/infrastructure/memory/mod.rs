pub mod backend;
pub mod statement;
