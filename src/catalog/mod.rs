//! Action catalog: metadata types, resolution, caching, and the registry.
//!
//! An action starts life as a bare reference (`owner/repo@ref`) and is
//! progressively enriched by the resolver with the metadata declared in its
//! repository's descriptor file. Built-in pseudo-actions (`_shell/*`) never
//! touch the network.

mod cache;
mod registry;
mod resolver;
mod types;

pub use cache::MetadataCache;
pub use registry::ActionRegistry;
pub use resolver::ActionResolver;
pub use types::{
    parse_reference, Action, ActionInput, ActionOutput, ActionStats, ActionUrls, PortType,
    BUILTIN_PREFIX, SHELL_PREFIX,
};
