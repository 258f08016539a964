//! RSS / Atom parsing
//!
//! Thin layer over `feed-rs`, which handles RSS 0.9x/2.0, RSS 1.0 (RDF),
//! Atom and JSON Feed along with their encodings. Only the handful of fields
//! the dashboard shows are kept.

use super::FeedResult;
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Text};

/// A parsed feed document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

/// One `<item>` or `<entry>`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl ParsedEntry {
    /// Best available publication date
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }
}

impl From<Entry> for ParsedEntry {
    fn from(entry: Entry) -> Self {
        let link = entry_link(&entry);
        Self {
            title: entry.title.as_ref().and_then(plain_text),
            link,
            published: entry.published,
            updated: entry.updated,
        }
    }
}

/// Parse a feed document
pub fn parse_feed(bytes: &[u8]) -> FeedResult<ParsedFeed> {
    let feed = feed_rs::parser::parse(bytes)?;

    Ok(ParsedFeed {
        title: feed.title.as_ref().and_then(plain_text),
        entries: feed.entries.into_iter().map(ParsedEntry::from).collect(),
    })
}

/// The entry's page: the alternate link, else the first link, else a
/// URL-shaped id (RSS items that only carry a `<guid>`)
fn entry_link(entry: &Entry) -> Option<String> {
    entry
        .links
        .iter()
        .find(|link| matches!(link.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .map(|link| link.href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
        })
}

/// Title text on one line; HTML and XHTML markup is flattened
fn plain_text(text: &Text) -> Option<String> {
    let content = match text.content_type.subty().as_str() {
        "html" | "xhtml" => decode_entities(&strip_tags(&text.content)),
        _ => text.content.clone(),
    };
    Some(collapse_whitespace(&content)).filter(|t| !t.is_empty())
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>DataBreaches.Net</title>
    <link>https://databreaches.net</link>
    <item>
      <title>Acme Corp &amp; friends
        hit by ransomware</title>
      <link>https://databreaches.net/acme</link>
      <pubDate>Mon, 01 Jan 2024 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title><![CDATA[Hospital records leaked]]></title>
      <guid>https://databreaches.net/?p=42</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>The Hacker News</title>
  <id>urn:thn</id>
  <updated>2024-01-05T09:00:00Z</updated>
  <link href="https://thehackernews.com/" rel="alternate"/>
  <entry>
    <title type="html">New zero-day</title>
    <id>urn:thn:1</id>
    <link rel="replies" href="https://thehackernews.com/comments"/>
    <link rel="alternate" href="https://thehackernews.com/zero-day"/>
    <updated>2024-01-03T09:00:00Z</updated>
  </entry>
  <entry>
    <title type="xhtml"><div xmlns="http://www.w3.org/1999/xhtml">Patch <b>now</b></div></title>
    <id>urn:thn:2</id>
    <link href="https://thehackernews.com/patch"/>
    <published>2024-01-04T09:00:00Z</published>
    <updated>2024-01-05T09:00:00Z</updated>
  </entry>
</feed>"#;

    const RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://sector035.nl">
    <title>Sector035</title>
    <link>https://sector035.nl</link>
    <description>Week in OSINT</description>
  </channel>
  <item rdf:about="https://sector035.nl/week-1">
    <title>Week in OSINT #1</title>
    <link>https://sector035.nl/week-1</link>
  </item>
</rdf:RDF>"#;

    #[test]
    fn test_parse_rss() {
        let feed = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("DataBreaches.Net"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.title.as_deref(), Some("Acme Corp & friends hit by ransomware"));
        assert_eq!(first.link.as_deref(), Some("https://databreaches.net/acme"));
        assert_eq!(
            first.published_at(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap())
        );

        let second = &feed.entries[1];
        assert_eq!(second.title.as_deref(), Some("Hospital records leaked"));
        assert_eq!(second.published_at(), None);
    }

    #[test]
    fn test_guid_only_item_keeps_its_url() {
        let feed = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(
            feed.entries[1].link.as_deref(),
            Some("https://databreaches.net/?p=42")
        );
    }

    #[test]
    fn test_parse_atom() {
        let feed = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("The Hacker News"));
        assert_eq!(feed.entries.len(), 2);

        let first = &feed.entries[0];
        assert_eq!(first.title.as_deref(), Some("New zero-day"));
        assert_eq!(first.link.as_deref(), Some("https://thehackernews.com/zero-day"));
        assert_eq!(
            first.published_at(),
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap())
        );

        let second = &feed.entries[1];
        assert_eq!(second.link.as_deref(), Some("https://thehackernews.com/patch"));
        assert_eq!(
            second.published_at(),
            Some(Utc.with_ymd_and_hms(2024, 1, 4, 9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_xhtml_title_is_flattened() {
        let feed = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(feed.entries[1].title.as_deref(), Some("Patch now"));
    }

    #[test]
    fn test_parse_rdf() {
        let feed = parse_feed(RDF.as_bytes()).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Sector035"));
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].title.as_deref(), Some("Week in OSINT #1"));
        assert_eq!(
            feed.entries[0].link.as_deref(),
            Some("https://sector035.nl/week-1")
        );
    }

    #[test]
    fn test_rejects_non_feed() {
        assert!(parse_feed(b"<html><body>nope</body></html>").is_err());
        assert!(parse_feed(b"").is_err());
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(collapse_whitespace(&strip_tags("<div>a <b>b</b></div>")), "a b");
        assert_eq!(strip_tags("a > b"), "a > b");
        assert_eq!(decode_entities("Tom &amp;amp; Jerry &lt;3"), "Tom &amp; Jerry <3");
    }
}
