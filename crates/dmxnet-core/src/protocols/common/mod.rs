pub(crate) mod reader;
pub mod text;
pub(crate) mod writer;
