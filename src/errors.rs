use crate::config::ConfigError;
use crate::metrics::client::ClientError;
use thiserror::Error;

/// Failure to construct a plugin.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin {plugin}: {source}")]
    Config {
        plugin: String,
        #[source]
        source: ConfigError,
    },
    #[error("plugin {plugin}: {source}")]
    Client {
        plugin: String,
        #[source]
        source: ClientError,
    },
}
