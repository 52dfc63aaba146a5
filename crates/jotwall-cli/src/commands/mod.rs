pub mod add;
pub mod auth_cmd;
pub mod board;
pub mod colors;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
