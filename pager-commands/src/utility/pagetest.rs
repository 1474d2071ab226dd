use twilight_model::gateway::payload::incoming::MessageCreate;

use super::{author_session, start_session};
use crate::CommandMeta;
use pager_core::Context;
use pager_utils::pagination::{
    ControlMap, DeletionOptions, InputType, StaticPageSource, build_list_pages,
    parse_one_based_page,
};

pub const META: CommandMeta = CommandMeta {
    name: "pagetest",
    desc: "Test embed pagination behavior.",
    category: "pagination",
    usage: "!pagetest [page] [reactions]",
};

const ITEMS_PER_PAGE: usize = 5;

#[derive(Debug, PartialEq, Eq)]
struct PagetestArgs {
    start: usize,
    reactions: bool,
}

/// Pagination test command over a fixed item list.
///
/// Inputs:
/// - optional page number and `reactions` flag, in any order.
///
/// Error behavior:
/// - returns usage text on invalid page input.
/// - returns bounds text when the requested page is out of range.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, args: &[&str]) -> anyhow::Result<()> {
    let http = &ctx.http;

    let Some(args) = parse_args(args) else {
        let usage = format!("Usage: `{}` (page starts at 1)", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let pages = build_list_pages(
        "Pagination Test",
        &build_test_items(),
        ITEMS_PER_PAGE,
        Some("pagetest"),
    )?;

    if args.start >= pages.len() {
        let out = format!(
            "Page {} does not exist. Available pages: 1-{}.",
            args.start + 1,
            pages.len()
        );
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let mut session = author_session(&ctx, &msg, StaticPageSource::new(pages)?)
        .start_index(args.start)
        .controls(ControlMap::with_jump());
    if args.reactions {
        session = session.input_type(InputType::ALL).deletion(DeletionOptions {
            valid: true,
            invalid: true,
        });
    }

    start_session(&ctx, &msg, session.build()?).await
}

fn parse_args(args: &[&str]) -> Option<PagetestArgs> {
    let reactions = args
        .iter()
        .any(|arg| arg.eq_ignore_ascii_case("reactions"));
    let mut pages = args
        .iter()
        .filter(|arg| !arg.eq_ignore_ascii_case("reactions"));

    let start = parse_one_based_page(pages.next().copied())?;
    if pages.next().is_some() {
        return None;
    }

    Some(PagetestArgs { start, reactions })
}

fn build_test_items() -> Vec<String> {
    (1..=24)
        .map(|index| format!("Sample pagination item #{index}"))
        .collect()
}
