//! Service configuration with layered resolution.

mod lintel_config;

pub use lintel_config::{
    AuthConfig, DatabaseConfig, EvaluatorConfig, LintelConfig, RetentionConfig, ServerConfig,
};
