pub mod agent;
pub mod builtin;
pub mod config;
pub mod directive;
pub mod factory;
pub mod message;
pub mod response;

pub use agent::{Agent, AgentEvent, AgentObserver};
pub use builtin::RolePreset;
pub use config::{AgentConfig, AgentRole};
pub use directive::{ControlDirective, Directive, DirectiveSet};
pub use factory::{AgentFactory, AgentFactoryRegistry, AgentSpec};
pub use message::{Message, MessageRole};
pub use response::{AgentResponse, ResponseStatus};
