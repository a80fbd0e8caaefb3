pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod flatten;
pub mod output;
pub mod pokeapi;
pub mod report;
pub mod store;
