pub mod backend;
pub mod error;
pub mod resolver;
pub mod volume;

pub use backend::{Backend, BackendKind, Entry, EntryKind};
pub use error::{ConfigError, ErrorKind, VolumeError, VolumeResult};
pub use resolver::{Environment, PathResolver, ProcessEnvironment, StaticEnvironment};
pub use volume::{Volume, VolumeConfig};
