use std::{io, path::PathBuf};

use anyhow::Context as _;
use chrono::Local;
use clap::{command, Arg, ArgAction, ArgMatches, Command};
use context::Context;
use create::{create_post, prompt_title, CreateOptions, CreateOutcome, Staging};
use drafts::{choose_draft, list_drafts, DraftChoice};
use editor::ExternalEditor;
use log::debug;
use publish::promote;
use select::{FuzzyFinder, NumberedPrompt, WithFallback};

mod context;
mod create;
mod drafts;
mod editor;
mod front_matter;
mod publish;
mod select;
mod slug;

fn build_context(matches: &ArgMatches) -> Context {
    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .or_else(|| std::env::var_os("BLOG_ROOT").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    // both have default values
    let drafts: &PathBuf = matches.get_one("drafts").unwrap();
    let posts: &PathBuf = matches.get_one("posts").unwrap();

    Context::new(root, drafts, posts)
}

fn new_post(ctx: &Context, matches: &ArgMatches) -> anyhow::Result<()> {
    let options = CreateOptions {
        staging: if matches.get_flag("direct") {
            Staging::Direct
        } else {
            Staging::Draft
        },
        edit: matches.get_flag("edit"),
    };

    let Some(title) = prompt_title(io::stdin().lock(), io::stdout())? else {
        return Ok(());
    };
    let now = Local::now().fixed_offset();

    match create_post(ctx, &title, options, &now, &ExternalEditor::from_env())? {
        CreateOutcome::Cancelled => debug!("empty title, nothing to do"),
        CreateOutcome::Created(path) => println!("Created: {}", ctx.relative(&path).display()),
        CreateOutcome::Discarded(path) => println!(
            "No changes made, discarded {}",
            ctx.relative(&path).display()
        ),
    }
    Ok(())
}

fn publish_draft(ctx: &Context, matches: &ArgMatches) -> anyhow::Result<()> {
    let drafts = list_drafts(&ctx.drafts_dir)?;

    let finder = if matches.get_flag("no_fzf") {
        None
    } else {
        FuzzyFinder::detect("Publish draft > ")
    };
    let mut selector = WithFallback::new(
        finder,
        NumberedPrompt::new(io::stdin().lock(), io::stdout(), "Select a draft to publish:"),
    );

    match choose_draft(ctx, &drafts, &mut selector)? {
        DraftChoice::Empty => println!("No draft posts found."),
        DraftChoice::Cancelled => debug!("selection cancelled"),
        DraftChoice::Chosen(draft) => {
            let promotion = promote(ctx, &draft)?;
            println!("{}", promotion.summary());
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = command!()
        .subcommand_required(true)
        .args(&[
            Arg::new("root")
                .long("root")
                .global(true)
                .help("Blog root directory. Falls back to $BLOG_ROOT, then the current directory.")
                .value_parser(clap::value_parser!(PathBuf)),
            Arg::new("drafts")
                .long("drafts")
                .global(true)
                .help("Drafts directory, relative to the root")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("_drafts"),
            Arg::new("posts")
                .long("posts")
                .global(true)
                .help("Published posts directory, relative to the root")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("_posts"),
        ])
        .subcommand(
            Command::new("new")
                .about("Create a new post from a title read on stdin")
                .args(&[
                    Arg::new("edit")
                        .long("edit")
                        .action(ArgAction::SetTrue)
                        .help("Open $VISUAL/$EDITOR and discard the post if it is left unedited"),
                    Arg::new("direct")
                        .long("direct")
                        .action(ArgAction::SetTrue)
                        .help("Write a dated post into the posts directory instead of a draft (implies --edit)"),
                ]),
        )
        .subcommand(
            Command::new("publish")
                .about("Promote a draft to a dated post")
                .arg(
                    Arg::new("no_fzf")
                        .long("no-fzf")
                        .action(ArgAction::SetTrue)
                        .help("Always use the numbered prompt, even when fzf is installed"),
                ),
        )
        .get_matches();

    // global args are read from the subcommand so they may follow it
    let (name, sub) = matches
        .subcommand()
        .context("a subcommand is required")?;
    let ctx = build_context(sub);
    ctx.ensure_dirs()?;

    match name {
        "new" => new_post(&ctx, sub),
        "publish" => publish_draft(&ctx, sub),
        _ => unreachable!("unknown subcommand {name}"),
    }
}
