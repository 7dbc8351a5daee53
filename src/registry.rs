use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("source URL is empty")]
    Empty,
    #[error("not an absolute URL: {0}")]
    InvalidUrl(String),
    #[error("source already exists: {0}")]
    Duplicate(String),
    #[error("source not found: {0}")]
    NotFound(String),
}

/// In-memory, insertion-ordered list of feed URLs. Entries are unique.
pub struct SourceRegistry {
    sources: RwLock<Vec<String>>,
}

impl SourceRegistry {
    /// Creates a registry seeded with `initial`, keeping the first occurrence
    /// of any repeated URL.
    pub fn new(initial: Vec<String>) -> Self {
        let mut sources: Vec<String> = Vec::with_capacity(initial.len());
        for url in initial {
            if !sources.contains(&url) {
                sources.push(url);
            }
        }

        Self {
            sources: RwLock::new(sources),
        }
    }

    /// Snapshot of the current sources, in registry order.
    pub async fn list(&self) -> Vec<String> {
        self.sources.read().await.clone()
    }

    /// Appends `url` (trimmed). Returns the stored value.
    pub async fn add(&self, url: &str) -> Result<String, RegistryError> {
        let url = validate_url(url)?;

        let mut sources = self.sources.write().await;
        if sources.contains(&url) {
            return Err(RegistryError::Duplicate(url));
        }
        sources.push(url.clone());
        Ok(url)
    }

    pub async fn remove(&self, url: &str) -> Result<(), RegistryError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut sources = self.sources.write().await;
        let index = sources
            .iter()
            .position(|s| s == url)
            .ok_or_else(|| RegistryError::NotFound(url.to_string()))?;
        sources.remove(index);
        Ok(())
    }
}

/// Trims `url` and checks that it is non-empty and absolute.
pub fn validate_url(url: &str) -> Result<String, RegistryError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(RegistryError::Empty);
    }
    Url::parse(url).map_err(|_| RegistryError::InvalidUrl(url.to_string()))?;
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn registry(urls: &[&str]) -> SourceRegistry {
        SourceRegistry::new(urls.iter().map(|u| u.to_string()).collect())
    }

    #[tokio::test]
    async fn test_new_preserves_order() {
        let registry = registry(&["https://a/rss", "https://b/rss", "https://c/rss"]);
        assert_eq!(
            registry.list().await,
            vec!["https://a/rss", "https://b/rss", "https://c/rss"]
        );
    }

    #[tokio::test]
    async fn test_new_drops_repeated_urls() {
        let registry = registry(&["https://a/rss", "https://b/rss", "https://a/rss"]);
        assert_eq!(registry.list().await, vec!["https://a/rss", "https://b/rss"]);
    }

    #[tokio::test]
    async fn test_add_appends() {
        let registry = registry(&["https://a/rss"]);
        let added = registry.add("https://x/rss").await.unwrap();

        assert_eq!(added, "https://x/rss");
        assert_eq!(registry.list().await, vec!["https://a/rss", "https://x/rss"]);
    }

    #[tokio::test]
    async fn test_add_trims() {
        let registry = registry(&[]);
        registry.add("  https://x/rss \n").await.unwrap();
        assert_eq!(registry.list().await, vec!["https://x/rss"]);
    }

    #[tokio::test]
    async fn test_add_duplicate_is_conflict() {
        let registry = registry(&[]);
        registry.add("https://x/rss").await.unwrap();

        let err = registry.add("https://x/rss").await.unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("https://x/rss".to_string()));
        assert_eq!(registry.list().await, vec!["https://x/rss"]);
    }

    #[tokio::test]
    async fn test_add_duplicate_after_trimming() {
        let registry = registry(&["https://x/rss"]);
        let err = registry.add(" https://x/rss ").await.unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_add_empty() {
        let registry = registry(&["https://a/rss"]);
        assert_eq!(registry.add("").await, Err(RegistryError::Empty));
        assert_eq!(registry.add("   ").await, Err(RegistryError::Empty));
        assert_eq!(registry.list().await, vec!["https://a/rss"]);
    }

    #[tokio::test]
    async fn test_add_relative_url_rejected() {
        let registry = registry(&["https://a/rss"]);

        let err = registry.add("not-a-url").await.unwrap_err();
        assert_eq!(err, RegistryError::InvalidUrl("not-a-url".to_string()));

        assert!(registry.add("/just/a/path").await.is_err());
        assert_eq!(registry.list().await, vec!["https://a/rss"]);
    }

    #[tokio::test]
    async fn test_remove_preserves_order() {
        let registry = registry(&["https://a/rss", "https://b/rss", "https://c/rss"]);
        registry.remove("https://b/rss").await.unwrap();
        assert_eq!(registry.list().await, vec!["https://a/rss", "https://c/rss"]);
    }

    #[tokio::test]
    async fn test_remove_trims() {
        let registry = registry(&["https://a/rss"]);
        registry.remove(" https://a/rss ").await.unwrap();
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let registry = registry(&["https://a/rss"]);

        let err = registry.remove("https://not-present").await.unwrap_err();
        assert_eq!(err, RegistryError::NotFound("https://not-present".to_string()));
        assert_eq!(registry.list().await, vec!["https://a/rss"]);
    }

    #[tokio::test]
    async fn test_remove_empty() {
        let registry = registry(&["https://a/rss"]);
        assert_eq!(registry.remove("  ").await, Err(RegistryError::Empty));
    }

    #[tokio::test]
    async fn test_list_is_a_snapshot() {
        let registry = registry(&["https://a/rss"]);
        let snapshot = registry.list().await;

        registry.add("https://b/rss").await.unwrap();

        assert_eq!(snapshot, vec!["https://a/rss"]);
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_same_url() {
        let registry = Arc::new(registry(&[]));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move { registry.add("https://x/rss").await })
            })
            .collect();

        let mut added = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                added += 1;
            }
        }

        assert_eq!(added, 1);
        assert_eq!(registry.list().await, vec!["https://x/rss"]);
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url(" https://example.com/feed "),
            Ok("https://example.com/feed".to_string())
        );
        assert_eq!(validate_url(""), Err(RegistryError::Empty));
        assert!(matches!(
            validate_url("example.com/feed"),
            Err(RegistryError::InvalidUrl(_))
        ));
    }
}
