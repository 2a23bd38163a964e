pub mod capture;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalizer;
pub mod output;
pub mod scanner;
pub mod service;
pub mod strategy;
