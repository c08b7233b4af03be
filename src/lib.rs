pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod mixer;
pub mod mvi;
pub mod persistence;
pub mod widget;
