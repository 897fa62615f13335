pub mod aggregate;
pub mod category;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod feed;
pub mod logging;
pub mod render;
pub mod selection;
pub mod stats;
pub mod timeseries;
