mod loader;
mod types;

pub use loader::{CREDENTIAL_SERVICE, ConfigLoader};
pub use types::RawZaiConfig;
