//! Document configuration
//!
//! Configuration is threaded explicitly through [`crate::document::Document`]
//! construction; nothing in the crate consults process-global state. It is
//! read-mostly: mutate it during setup, before objects are wrapped.

use crate::object::Name;
use crate::schema::DictClass;
use crate::types;
use std::collections::HashMap;

/// Tunables and registries consumed by the object model core
#[derive(Debug, Clone)]
pub struct Config {
    /// Maps `/Type` names to typed-dictionary classes; consulted by
    /// [`crate::document::Document::wrap`] and for lazy field type tags
    type_map: HashMap<Name, &'static DictClass>,
    /// Flate compression level, 0-9
    pub flate_compression: u32,
    /// Upgrade the document version automatically when a written field
    /// needs a newer one; when off such writes fail instead
    pub auto_upgrade_version: bool,
    /// Chunk size used when driving stream payloads through filters
    pub stream_chunk_size: usize,
}

impl Config {
    pub fn new() -> Self {
        let mut config = Self {
            type_map: HashMap::new(),
            flate_compression: 6,
            auto_upgrade_version: true,
            stream_chunk_size: 8192,
        };
        for class in types::BUILTIN_CLASSES {
            if let Some(type_name) = class.type_name {
                config.register_type(type_name, class);
            }
        }
        // Classes addressed by name that have no distinct /Type value
        config.register_type("Info", &types::INFO);
        config
    }

    /// Register (or replace) a class under a `/Type` name
    pub fn register_type(&mut self, name: &str, class: &'static DictClass) {
        self.type_map.insert(Name::new(name), class);
    }

    /// Resolve a `/Type` name to its class
    pub fn class_for(&self, name: &str) -> Option<&'static DictClass> {
        self.type_map.get(name).copied()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
