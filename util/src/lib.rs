pub mod config;
pub mod lang;
pub mod logging;
pub mod paths;
