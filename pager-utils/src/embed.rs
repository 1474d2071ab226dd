use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Build a standard embed for one page of a paginated view.
///
/// `index` is zero-based; the footer shows it one-based next to the total
/// when there is more than one page. A `None` total means the page count is
/// unknown.
pub fn build_page_embed(
    title: &str,
    description: impl Into<String>,
    index: usize,
    total_pages: Option<usize>,
    footer_note: Option<&str>,
) -> anyhow::Result<Embed> {
    let position = match total_pages {
        Some(total) if total > 1 => Some(format!("Page {}/{}", index + 1, total)),
        Some(_) => None,
        None => Some(format!("Page {}", index + 1)),
    };

    let footer_text = match (position, footer_note.filter(|note| !note.is_empty())) {
        (Some(position), Some(note)) => format!("{position} • {note}"),
        (Some(position), None) => position,
        (None, Some(note)) => note.to_owned(),
        (None, None) => String::new(),
    };

    let builder = EmbedBuilder::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description);

    let embed = if footer_text.is_empty() {
        builder.validate()?.build()
    } else {
        let footer = EmbedFooterBuilder::new(footer_text).build();
        builder.footer(footer).validate()?.build()
    };

    Ok(embed)
}

/// Build a plain informational embed.
pub fn build_notice_embed(title: &str, description: impl Into<String>) -> anyhow::Result<Embed> {
    build_page_embed(title, description, 0, Some(1), None)
}
