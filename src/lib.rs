pub mod catalog;
pub mod change_detect;
pub mod classify;
pub mod config;
pub mod demo_feed;
pub mod engine;
pub mod error;
pub mod espn_fetch;
pub mod feed;
pub mod game;
pub mod http_cache;
pub mod http_client;
pub mod logging;
pub mod present;
pub mod rotator;
pub mod scheduler;
