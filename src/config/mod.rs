mod defaults;
mod loader;

pub use defaults::{CLIENT_SECTION, ClientConfig};
pub use loader::{client_config, get_default_config, load_client_config, load_configuration, write_config_to};
