pub mod catalog;
pub mod chat;
