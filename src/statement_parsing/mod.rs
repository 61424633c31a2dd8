pub mod generic;
pub mod line;
pub mod normalize;
pub mod parser;
pub mod statement;
