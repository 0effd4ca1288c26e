pub mod data;
pub mod io;

pub use data::{path_display, AppConfig};
pub use io::ConfigError;

#[cfg(test)]
pub mod tests;
