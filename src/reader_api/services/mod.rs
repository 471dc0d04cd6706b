pub mod contents;
pub mod feed;
pub mod health;
pub mod reader;
