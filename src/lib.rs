pub mod browser;
pub mod cli;
pub mod color;
pub mod live_config;
pub mod logging;
pub mod signals;
pub mod theme;
pub mod tui;
