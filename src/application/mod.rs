//! Application services orchestrating the book cache and its ports.

pub mod book_info;
pub mod catalog;
pub mod error;
