pub mod env;
pub mod swarm_file;

pub use env::{EnvConfig, DEBUG_ENV};
pub use swarm_file::{AgentEntry, SwarmFile};
