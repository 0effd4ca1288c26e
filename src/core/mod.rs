pub mod config;
pub mod lang;
pub mod mask;
pub mod mask_store;
pub mod model_config;
pub mod persist;
pub mod session;
