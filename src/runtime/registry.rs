//! Canonical construction of the method registry.
//!
//! Every entrypoint (library, CLI, tests) builds its registry through these
//! functions, so the whitelist a program is parsed against is the same one its
//! calls are dispatched through.
//!
//! ## Usage Workflow
//! ```rust
//! use trellis::config::RegistryConfig;
//! use trellis::runtime::registry::{build_default_registry, build_registry};
//!
//! let standard = build_default_registry();
//! assert!(standard.is_allowed("vstack"));
//!
//! let config = RegistryConfig { disabled_methods: vec!["image".into()] };
//! let restricted = build_registry(&config);
//! assert!(!restricted.is_allowed("image"));
//! ```

use log::{debug, warn};

use crate::config::RegistryConfig;
use crate::methods::MethodRegistry;

/// The standard whitelist with nothing disabled.
#[inline]
pub fn build_default_registry() -> MethodRegistry {
    MethodRegistry::standard()
}

/// The standard whitelist minus the configured disabled methods.
pub fn build_registry(config: &RegistryConfig) -> MethodRegistry {
    let mut registry = MethodRegistry::standard();
    for name in &config.disabled_methods {
        if !registry.is_allowed(name) {
            warn!("disabled method '{}' is not a standard method", name);
        }
        registry.disable(name);
    }
    debug!("built method registry with {} methods", registry.len());
    registry
}
