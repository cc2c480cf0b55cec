pub mod app;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod recipes;
pub mod response;
pub mod state;
pub mod users;
pub mod validate;
pub mod web;
