//! Page builders for list-shaped content.

use crate::embed::build_page_embed;

use super::page::{Page, bulleted_description, total_pages};

/// Split `items` into bulleted embed pages of `per_page` entries.
///
/// An empty list yields no pages; the caller decides what to show instead.
pub fn build_list_pages(
    title: &str,
    items: &[String],
    per_page: usize,
    footer_note: Option<&str>,
) -> anyhow::Result<Vec<Page>> {
    let total = total_pages(items.len(), per_page);

    (0..total)
        .map(|index| {
            let description = bulleted_description(items, per_page, index);
            build_page_embed(title, description, index, Some(total), footer_note).map(Page::embed)
        })
        .collect()
}

/// Build embed pages from pre-rendered descriptions, one page each.
pub fn build_description_pages(
    title: &str,
    descriptions: Vec<String>,
    footer_note: Option<&str>,
) -> anyhow::Result<Vec<Page>> {
    let total = descriptions.len();

    descriptions
        .into_iter()
        .enumerate()
        .map(|(index, description)| {
            build_page_embed(title, description, index, Some(total), footer_note).map(Page::embed)
        })
        .collect()
}
