pub mod auth_client;
pub mod backend;
pub mod commands;
pub mod errors;
pub mod input;
pub mod match_client;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod service;
pub mod settings_store;
pub mod token_store;
pub mod upload_client;
pub mod validator;
