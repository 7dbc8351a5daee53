use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use rss::Channel;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::dates::pub_date_or_now;

const USER_AGENT: &str = concat!("Stenella/", env!("CARGO_PKG_VERSION"), " (RSS Aggregator)");

/// One entry from a feed, normalized for the merged listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: DateTime<Utc>,
    /// Title of the feed the item came from
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid feed URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    Status(u16),
    #[error("decode RSS: {0}")]
    Rss(#[from] rss::Error),
    #[error("decode Atom: {0}")]
    Atom(#[from] feed_rs::parser::ParseFeedError),
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher whose requests give up after `timeout`. `None` means
    /// a stalled upstream blocks its fetch indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<FeedItem>, FetchError> {
        let base = Url::parse(feed_url)?;
        debug!("Fetching feed: {}", feed_url);

        let response = self.client.get(feed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;

        let items = parse_feed(&bytes, &base)?;
        debug!("Parsed {} items from {}", items.len(), feed_url);
        Ok(items)
    }
}

/// Decodes an RSS document, or an Atom one when the root element is not RSS.
pub fn parse_feed(body: &[u8], base: &Url) -> Result<Vec<FeedItem>, FetchError> {
    match Channel::read_from(body) {
        Ok(channel) => Ok(items_from_channel(&channel, base)),
        Err(rss::Error::InvalidStartTag) => {
            let feed = feed_rs::parser::parse(body)?;
            Ok(items_from_atom(feed, base))
        }
        Err(e) => Err(e.into()),
    }
}

fn items_from_channel(channel: &Channel, base: &Url) -> Vec<FeedItem> {
    let source = channel.title().trim().to_string();

    channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: clean(item.title()),
            link: resolve_link(base, item.link().unwrap_or_default()),
            description: clean(item.description()),
            published: pub_date_or_now(item.pub_date().unwrap_or_default()),
            source: source.clone(),
        })
        .collect()
}

fn items_from_atom(feed: feed_rs::model::Feed, base: &Url) -> Vec<FeedItem> {
    let source = feed
        .title
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();

    feed.entries
        .into_iter()
        .map(|entry| {
            let published = entry.published.or(entry.updated).unwrap_or_else(|| {
                warn!("Entry {:?} has no date, using current time", entry.id);
                Utc::now()
            });
            let link = entry
                .links
                .first()
                .map(|l| resolve_link(base, &l.href))
                .unwrap_or_default();
            let description = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            FeedItem {
                title: clean(entry.title.as_ref().map(|t| t.content.as_str())),
                link,
                description: description.trim().to_string(),
                published,
                source: source.clone(),
            }
        })
        .collect()
}

fn clean(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_string()
}

/// Resolves a possibly relative item link against the URL of its feed.
/// Absolute links are returned as written; empty links stay empty.
pub fn resolve_link(base: &Url, link: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        return String::new();
    }

    match Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) => base
            .join(link)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| link.to_string()),
        _ => link.to_string(),
    }
}
