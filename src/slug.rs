use anyhow::bail;

/// Lowercases `title`, turns spaces into hyphens and drops apostrophes and backticks.
pub(crate) fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .replace(' ', "-")
        .replace(['\'', '`'], "")
}

/// A slug has to name a single file inside the drafts or posts directory.
pub(crate) fn validate_slug(slug: &str) -> anyhow::Result<()> {
    if slug.is_empty() {
        bail!("title does not produce a usable file name");
    }
    if slug.contains(['/', '\\']) || slug == "." || slug == ".." {
        bail!("slug {slug:?} would escape the posts directory");
    }
    Ok(())
}
