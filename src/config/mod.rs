pub mod app_config;
#[cfg(test)]
pub mod test_config;

pub use app_config::{AppConfig, ClientConfig};
#[cfg(test)]
pub use test_config::create_test_config;
