//! RSS feeds for the website and for every project.
//!
//! A feed lists the same [`Entry`]s as the index page of its container, in
//! the same order, and is written next to that page as [`FEED_FILE`].

use chrono::{NaiveDate, Utc};
use rss::{Channel, ChannelBuilder, Item, ItemBuilder};

use crate::build::Entry;

/// File name of a feed inside its container's output directory.
pub const FEED_FILE: &str = "rss.xml";

/// Header of one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedInfo {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl From<&Entry> for Item {
    fn from(entry: &Entry) -> Self {
        ItemBuilder::default()
            .title(entry.title.clone())
            .link(entry.url.clone())
            .description(entry.summary.clone())
            .pub_date(entry.published.map(rfc2822))
            .build()
    }
}

/// Dates carry no time of day; items are published at midnight UTC.
fn rfc2822(date: NaiveDate) -> String {
    date.and_time(chrono::NaiveTime::MIN).and_utc().to_rfc2822()
}

pub fn channel(info: FeedInfo, entries: &[Entry]) -> Channel {
    ChannelBuilder::default()
        .title(info.title)
        .link(info.link)
        .description(info.description)
        .last_build_date(Utc::now().to_rfc2822())
        .items(entries.iter().map(Item::from).collect::<Vec<_>>())
        .build()
}
