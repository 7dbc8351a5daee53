use tracing::{info, warn};

use crate::fetcher::{FeedItem, Fetcher};
use crate::registry::SourceRegistry;

/// Fetches every registered source in turn and merges the results, newest
/// first. Sources that fail are logged and left out; the rest are still
/// returned.
pub async fn aggregate(fetcher: &Fetcher, registry: &SourceRegistry) -> Vec<FeedItem> {
    // Snapshot so no lock is held across network calls
    let sources = registry.list().await;

    let mut all = Vec::new();
    let mut failed = 0;
    for source in &sources {
        match fetcher.fetch_feed(source).await {
            Ok(items) => all.extend(items),
            Err(e) => {
                warn!("could not fetch {}: {}", source, e);
                failed += 1;
            }
        }
    }

    sort_newest_first(&mut all);
    info!(
        "Aggregated {} items from {} sources ({} failed)",
        all.len(),
        sources.len(),
        failed
    );
    all
}

/// Stable sort by publish time, descending.
pub fn sort_newest_first(items: &mut [FeedItem]) {
    items.sort_by(|a, b| b.published.cmp(&a.published));
}
