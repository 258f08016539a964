//! Panel model
//!
//! An in-process stand-in for the page's DOM: a fixed set of containers
//! addressed by id, each holding cards, raw inner HTML, or text.

use super::escape_html;
use serde::Serialize;
use std::collections::BTreeMap;

/// One rendered element: a list item or a fallback message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub class: String,
    pub inner_html: String,
}

impl Card {
    pub fn new(class: impl Into<String>, inner_html: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            inner_html: inner_html.into(),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"{}\">{}</div>",
            escape_html(&self.class),
            self.inner_html
        )
    }
}

/// What a container currently holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Content {
    #[default]
    Empty,
    Cards(Vec<Card>),
    Html(String),
    Text(String),
}

/// A named region of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    id: String,
    content: Content,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: Content::Empty,
        }
    }

    pub fn clear(&mut self) {
        self.content = Content::Empty;
    }

    /// Append a card, replacing any non-card content
    pub fn append(&mut self, card: Card) {
        match &mut self.content {
            Content::Cards(cards) => cards.push(card),
            other => *other = Content::Cards(vec![card]),
        }
    }

    pub fn set_inner_html(&mut self, html: impl Into<String>) {
        self.content = Content::Html(html.into());
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = Content::Text(text.into());
    }

    /// Cards currently in the container (empty for non-card content)
    pub fn cards(&self) -> &[Card] {
        match &self.content {
            Content::Cards(cards) => cards,
            _ => &[],
        }
    }

    /// Text content, when the container holds a text node
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn inner_html(&self) -> String {
        match &self.content {
            Content::Empty => String::new(),
            Content::Cards(cards) => cards.iter().map(Card::to_html).collect::<Vec<_>>().join("\n"),
            Content::Html(html) => html.clone(),
            Content::Text(text) => escape_html(text),
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div id=\"{}\">{}</div>",
            escape_html(&self.id),
            self.inner_html()
        )
    }
}

/// The set of containers making up the dashboard page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    containers: BTreeMap<String, Container>,
}

impl Panel {
    /// Create a panel with the given container ids
    pub fn with_containers<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let containers = ids
            .into_iter()
            .map(|id| {
                let id = id.into();
                (id.clone(), Container::new(id))
            })
            .collect();
        Self { containers }
    }

    /// Look up a container by id; a leading `#` is accepted
    pub fn get(&self, selector: &str) -> Option<&Container> {
        self.containers.get(selector.trim_start_matches('#'))
    }

    pub fn get_mut(&mut self, selector: &str) -> Option<&mut Container> {
        self.containers.get_mut(selector.trim_start_matches('#'))
    }

    /// Container id mapped to its inner HTML
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.containers
            .iter()
            .map(|(id, container)| (id.clone(), container.inner_html()))
            .collect()
    }

    /// Render the whole page around the given container order
    ///
    /// With `reload_secs` set, the page asks the browser to reload itself
    /// on that cadence.
    pub fn to_page(&self, title: &str, layout: &[&str], reload_secs: Option<u64>) -> String {
        let mut body = String::new();
        for selector in layout {
            if let Some(container) = self.get(selector) {
                body.push_str("    <section class=\"quadrant\">\n      ");
                body.push_str(&container.to_html());
                body.push_str("\n    </section>\n");
            }
        }

        let reload = reload_secs
            .map(|secs| format!("\n  <meta http-equiv=\"refresh\" content=\"{}\">", secs))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">{reload}
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
  <header><h1>{title}</h1></header>
  <main class="grid">
{body}  </main>
</body>
</html>
"#,
            title = escape_html(title),
            body = body,
            reload = reload,
        )
    }
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#0b0f14;color:#e6edf3}\
header{padding:.5rem 1rem}\
.grid{display:grid;grid-template-columns:1fr 1fr;gap:1rem;padding:1rem}\
.card{background:#161b22;border-radius:6px;padding:.5rem;margin-bottom:.5rem}\
.small{font-size:.8rem;color:#8b949e}\
a{color:inherit}";
