use std::path::{Path, PathBuf};

use anyhow::Context as _;
use log::debug;

use crate::{
    context::Context,
    select::{Choice, Selector},
};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DraftChoice {
    /// There was nothing to choose from.
    Empty,
    Cancelled,
    Chosen(PathBuf),
}

/// Markdown files directly inside `drafts_dir`, sorted by file name.
pub(crate) fn list_drafts(drafts_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !drafts_dir.exists() {
        debug!("{drafts_dir:?} does not exist");
        return Ok(Vec::new());
    }

    let mut drafts = vec![];
    for entry in std::fs::read_dir(drafts_dir)
        .with_context(|| format!("while listing drafts in {drafts_dir:?}"))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            drafts.push(path);
        }
    }
    drafts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(drafts)
}

/// Lets the operator pick one of `drafts`. The selector is not consulted for an empty list.
pub(crate) fn choose_draft(
    ctx: &Context,
    drafts: &[PathBuf],
    selector: &mut dyn Selector,
) -> anyhow::Result<DraftChoice> {
    if drafts.is_empty() {
        return Ok(DraftChoice::Empty);
    }

    let candidates: Vec<String> = drafts
        .iter()
        .map(|p| ctx.relative(p).to_string_lossy().into_owned())
        .collect();

    Ok(match selector.select_one(&candidates)? {
        Choice::Picked(i) => DraftChoice::Chosen(drafts[i].clone()),
        Choice::Cancelled | Choice::Unavailable => DraftChoice::Cancelled,
    })
}
