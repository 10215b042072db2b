use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use chrono::{DateTime, FixedOffset, Local};
use log::{debug, info, warn};

use crate::{
    context::Context,
    front_matter::{date_prefix, stamp_date},
};

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Promotion {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl Promotion {
    /// `Published a.md -> 2024-01-02-a.md`
    pub fn summary(&self) -> String {
        let name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        format!("Published {} -> {}", name(&self.from), name(&self.to))
    }
}

/// `<YYYY-MM-DD>-<stem><.ext>`
pub(crate) fn published_name(draft: &Path, now: &DateTime<FixedOffset>) -> anyhow::Result<String> {
    let stem = draft
        .file_stem()
        .with_context(|| format!("{draft:?} has no file name"))?
        .to_string_lossy();
    let extension = draft
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    Ok(format!("{}-{stem}{extension}", date_prefix(now)))
}

pub(crate) fn promote(ctx: &Context, draft: &Path) -> anyhow::Result<Promotion> {
    let now = Local::now().fixed_offset();
    promote_at(ctx, draft, &now)
}

/// Stamps `now` into the draft's front matter and moves it into the posts directory.
///
/// Nothing is written when the front matter is malformed or the destination
/// already exists. The draft is moved before it is stamped, so a failed move
/// leaves it untouched; a failed write moves it back unstamped.
pub(crate) fn promote_at(
    ctx: &Context,
    draft: &Path,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<Promotion> {
    let text = std::fs::read_to_string(draft).with_context(|| format!("while reading {draft:?}"))?;
    let stamped = stamp_date(&text, now).with_context(|| format!("File {draft:?}"))?;

    let destination = ctx.posts_dir.join(published_name(draft, now)?);
    if destination.exists() {
        bail!("{destination:?} already exists, not overwriting it with {draft:?}");
    }

    std::fs::rename(draft, &destination)
        .with_context(|| format!("while moving {draft:?} to {destination:?}"))?;
    debug!("moved {draft:?} to {destination:?}");
    if let Err(e) = std::fs::write(&destination, stamped) {
        if let Err(back) = std::fs::rename(&destination, draft) {
            warn!("could not move {destination:?} back to {draft:?}: {back}");
        }
        return Err(e).with_context(|| format!("while writing {destination:?}"));
    }
    info!("published {draft:?} as {destination:?}");

    Ok(Promotion {
        from: draft.to_path_buf(),
        to: destination,
    })
}
