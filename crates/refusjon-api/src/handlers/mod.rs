pub mod application;
pub mod auth;
pub mod board_case;
pub mod expense;
pub mod forms;
pub mod health;
pub mod support;
pub mod upload;
pub mod users;
