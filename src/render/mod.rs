//! Dashboard rendering
//!
//! Projects a [`Payload`] into the panel's four containers. Rendering never
//! fails on bad data: missing fields fall back to placeholders and missing
//! lists fall back to a single "no data" card. The only error is a missing
//! container, in which case the panel is left exactly as it was.

mod panel;

pub use panel::{Card, Container, Panel};

use crate::payload::{BreachItem, FeedItem, Payload};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;
use thiserror::Error;

/// Default number of cards per list
pub const DEFAULT_MAX_ITEMS: usize = 10;

pub const BREACH_FALLBACK: &str =
    "No recent breach/leak headlines yet. Will retry on the next update.";
pub const NEWS_FALLBACK: &str = "No news items yet.";
pub const SUMMARY_FALLBACK: &str = "No summary yet.";

const ITEM_CLASS: &str = "card item";
const FALLBACK_CLASS: &str = "card";

/// Errors that can occur while rendering
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Container not found: #{0}")]
    MissingContainer(String),
}

/// Container ids the renderer writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub breaches: String,
    pub rss: String,
    pub summary: String,
    pub timestamp: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            breaches: "breaches".to_string(),
            rss: "rss".to_string(),
            summary: "summary".to_string(),
            timestamp: "timestamp".to_string(),
        }
    }
}

impl Layout {
    /// Use a different id for the news container (e.g. `rss-feed`)
    pub fn with_rss_container(mut self, id: impl Into<String>) -> Self {
        self.rss = id.into().trim_start_matches('#').to_string();
        self
    }

    pub fn ids(&self) -> [&str; 4] {
        [
            self.breaches.as_str(),
            self.rss.as_str(),
            self.summary.as_str(),
            self.timestamp.as_str(),
        ]
    }

    /// An empty panel holding exactly this layout's containers
    pub fn empty_panel(&self) -> Panel {
        Panel::with_containers(self.ids())
    }
}

/// Renders payloads into a panel
#[derive(Debug, Clone)]
pub struct Renderer {
    layout: Layout,
    max_items: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Layout::default())
    }
}

impl Renderer {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Render into `panel` using the local time zone and the current time
    pub fn render(&self, panel: &mut Panel, payload: &Payload) -> Result<(), RenderError> {
        self.render_at(panel, payload, Utc::now(), &chrono::Local)
    }

    /// Render with an explicit clock and display time zone
    ///
    /// All-or-nothing: `panel` is only replaced once every container has
    /// been rendered.
    pub fn render_at<Tz>(
        &self,
        panel: &mut Panel,
        payload: &Payload,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<(), RenderError>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut next = panel.clone();

        render_list(
            container(&mut next, &self.layout.breaches)?,
            payload.breaches.as_deref(),
            self.max_items,
            format_breach,
            BREACH_FALLBACK,
        );

        render_list(
            container(&mut next, &self.layout.rss)?,
            payload.rss.as_deref(),
            self.max_items,
            format_news,
            NEWS_FALLBACK,
        );

        let summary = payload
            .summary
            .as_deref()
            .map(escape_html)
            .unwrap_or_else(|| SUMMARY_FALLBACK.to_string());
        container(&mut next, &self.layout.summary)?.set_inner_html(summary);

        container(&mut next, &self.layout.timestamp)?
            .set_text(updated_label(payload, now, tz));

        *panel = next;
        Ok(())
    }
}

fn container<'a>(panel: &'a mut Panel, id: &str) -> Result<&'a mut Container, RenderError> {
    panel
        .get_mut(id)
        .ok_or_else(|| RenderError::MissingContainer(id.to_string()))
}

/// Replace a container's content with up to `max_items` cards
///
/// An absent or empty list renders one fallback card instead.
pub fn render_list<T, F>(
    container: &mut Container,
    items: Option<&[T]>,
    max_items: usize,
    format: F,
    fallback: &str,
) where
    F: Fn(&T) -> String,
{
    container.clear();

    match items {
        Some(items) if !items.is_empty() => {
            for item in items.iter().take(max_items) {
                container.append(Card::new(ITEM_CLASS, format(item)));
            }
        }
        _ => container.append(Card::new(FALLBACK_CLASS, escape_html(fallback))),
    }
}

pub fn format_breach(item: &BreachItem) -> String {
    let headline = item.headline().unwrap_or("Unknown org");
    format!(
        "<b>{}</b>\n<div class=\"small\">{}</div>",
        escape_html(headline),
        byline(item.source.as_deref(), item.published.as_deref())
    )
}

pub fn format_news(item: &FeedItem) -> String {
    let title = escape_html(item.title.as_deref().unwrap_or("Item"));
    let title = match item.url.as_deref() {
        Some(url) if is_web_url(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape_html(url),
            title
        ),
        _ => title,
    };
    format!(
        "<b>{}</b>\n<div class=\"small\">{}</div>",
        title,
        byline(item.source.as_deref(), item.published.as_deref())
    )
}

fn byline(source: Option<&str>, published: Option<&str>) -> String {
    format!(
        "{} • {}",
        escape_html(source.unwrap_or("")),
        escape_html(published.unwrap_or(""))
    )
}

fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `Updated <time>` for the header
///
/// Uses `generated_at` when it resolves, otherwise `now`.
pub fn updated_label<Tz>(payload: &Payload, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let at = match &payload.generated_at {
        Some(generated) => generated.resolve(tz).unwrap_or_else(|| {
            tracing::warn!(?generated, "Unreadable generated_at, showing current time");
            now
        }),
        None => now,
    };
    format!(
        "Updated {}",
        at.with_timezone(tz).format("%-m/%-d/%Y, %-I:%M:%S %p")
    )
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
