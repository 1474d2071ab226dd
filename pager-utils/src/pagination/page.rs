//! Page content descriptor and pure pagination math helpers.

use twilight_model::{channel::message::embed::Embed, http::attachment::Attachment};

/// One unit of renderable content shown by a paginated message.
///
/// The engine never looks inside a page; only the renderer does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub attachments: Vec<Attachment>,
}

impl Page {
    /// A page made of plain message content.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A page made of a single embed.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    /// Attach a file to the page.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Compute the number of pages for a paginated list.
pub fn total_pages(item_count: usize, per_page: usize) -> usize {
    item_count.div_ceil(per_page.max(1))
}

/// Return start/end indices for a zero-based page window.
pub fn page_window(total_items: usize, per_page: usize, index: usize) -> (usize, usize) {
    let safe_per_page = per_page.max(1);
    let start = index.saturating_mul(safe_per_page).min(total_items);
    let end = (start + safe_per_page).min(total_items);
    (start, end)
}

/// Parse a one-based page argument into a zero-based index.
///
/// Missing input means the first page; `0` and garbage are rejected.
pub fn parse_one_based_page(raw: Option<&str>) -> Option<usize> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|page| *page >= 1)
            .map(|page| page - 1),
        None => Some(0),
    }
}

/// Build a bullet-list description for one page of items.
pub fn bulleted_description(items: &[String], per_page: usize, index: usize) -> String {
    let (start, end) = page_window(items.len(), per_page, index);
    format!("- {}", items[start..end].join("\n- "))
}
