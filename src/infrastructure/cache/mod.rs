//! Cache infrastructure - backends, registration and the provider factory

mod builder;
mod connection;
mod definition;
mod distributed;
mod factory;
mod in_process;

pub use builder::CacheRegistrationBuilder;
pub use connection::{DEFAULT_REDIS_PORT, EndpointConfig};
pub use definition::{ProviderDefinition, ProviderOptions};
pub use distributed::{DistributedOptions, DistributedProvider};
pub use factory::CacheProviderFactory;
pub use in_process::{InProcessOptions, InProcessProvider};
