use std::time::Duration;

use twilight_model::gateway::payload::incoming::MessageCreate;

use super::{author_session, start_session};
use crate::CommandMeta;
use pager_core::Context;
use pager_utils::embed::build_page_embed;
use pager_utils::pagination::{LazyPageSource, Page, bulleted_description};

pub const META: CommandMeta = CommandMeta {
    name: "lazytest",
    desc: "Test pagination over pages loaded on demand.",
    category: "pagination",
    usage: "!lazytest",
};

const LAZY_PAGE_COUNT: usize = 10;
const ENTRIES_PER_PAGE: usize = 4;
const SIMULATED_LOAD: Duration = Duration::from_millis(400);

/// Pagination over pages that are built only when first visited.
pub async fn run(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    let source = LazyPageSource::new(|index| async move {
        tokio::time::sleep(SIMULATED_LOAD).await;
        load_page(index)
    })
    .max_page_index(Some(LAZY_PAGE_COUNT - 1));

    let session = author_session(&ctx, &msg, source).build()?;

    start_session(&ctx, &msg, session).await
}

fn load_page(index: usize) -> anyhow::Result<Page> {
    let entries: Vec<String> = (0..ENTRIES_PER_PAGE)
        .map(|offset| format!("Generated entry #{}", index * ENTRIES_PER_PAGE + offset + 1))
        .collect();
    let description = bulleted_description(&entries, ENTRIES_PER_PAGE, 0);

    let embed = build_page_embed(
        "Lazy Pagination Test",
        description,
        index,
        Some(LAZY_PAGE_COUNT),
        Some("loaded on demand"),
    )?;

    Ok(Page::embed(embed))
}
