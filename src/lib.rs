pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod context;
pub mod daemon;
pub mod error;
pub mod gateway;
pub mod menu;
pub mod prompt;
pub mod settings;
pub mod tools;
