pub mod api;
pub mod app;
pub mod automation;
pub mod bridge;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod global;
pub mod integrations;
pub mod meeting;
pub mod persistence;
pub mod scheduler;
pub mod zoom;
