//! Cache configuration.
//!
//! Selects the cache backend and toggles the optional write-path persistence, via the `[cache]`
//! table of `storefront.toml`.

/// Where cached views are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// Concurrent map inside the server process.
    Memory,
    /// Shared Redis instance.
    Redis { url: String },
}

impl CacheBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CacheBackend::Memory => "memory",
            CacheBackend::Redis { .. } => "redis",
        }
    }

    /// Whether entries outlive the process that wrote them.
    pub fn is_shared(&self) -> bool {
        matches!(self, CacheBackend::Redis { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Also insert submitted comments into the backing store.
    pub persist_comments: bool,
    /// Run the population job before the HTTP listener binds.
    pub warm_on_startup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            persist_comments: false,
            warm_on_startup: true,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend.clone(),
            persist_comments: settings.persist_comments,
            warm_on_startup: settings.warm_on_startup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_memory_without_persistence() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert!(!config.persist_comments);
        assert!(config.warm_on_startup);
    }

    #[test]
    fn backend_names() {
        assert_eq!(CacheBackend::Memory.name(), "memory");
        assert_eq!(
            CacheBackend::Redis {
                url: "redis://127.0.0.1/".to_string()
            }
            .name(),
            "redis"
        );
    }

    #[test]
    fn only_redis_outlives_the_process() {
        assert!(!CacheBackend::Memory.is_shared());
        assert!(
            CacheBackend::Redis {
                url: "redis://127.0.0.1/".to_string()
            }
            .is_shared()
        );
    }
}
