use twilight_model::gateway::payload::incoming::MessageCreate;

use super::{author_session, start_session};
use crate::{COMMANDS, CommandMeta};
use pager_core::Context;
use pager_utils::pagination::{
    StaticPageSource, build_description_pages, parse_one_based_page,
};

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [page]",
};

/// Render the command catalog, one page per category.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let pages = build_description_pages("Available Commands", category_descriptions(), None)?;

    let Some(start) = parse_one_based_page(arg1) else {
        let usage = format!("Usage: `{}` (page starts at 1)", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    if start >= pages.len() {
        let out = page_out_of_range_message(start + 1, pages.len());
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let session = author_session(&ctx, &msg, StaticPageSource::new(pages)?)
        .start_index(start)
        .build()?;

    start_session(&ctx, &msg, session).await
}

fn page_out_of_range_message(requested: usize, total: usize) -> String {
    format!("Page {requested} does not exist. Available pages: 1-{total}.")
}

/// One description per category, categories and commands sorted by name.
fn category_descriptions() -> Vec<String> {
    let mut commands: Vec<&'static CommandMeta> = COMMANDS.iter().collect();
    commands.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    commands
        .chunk_by(|left, right| left.category == right.category)
        .map(|group| {
            let mut description = format!("**{}**", group[0].category);
            for command in group {
                description.push_str(&format!("\n`{}` - {}", command.usage, command.desc));
            }
            description
        })
        .collect()
}
