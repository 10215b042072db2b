use std::path::{Path, PathBuf};

use anyhow::Context as _;
use log::debug;

/// Locations the tools operate on. Passed explicitly to every operation.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    pub root: PathBuf,
    pub drafts_dir: PathBuf,
    pub posts_dir: PathBuf,
}

impl Context {
    /// `drafts` and `posts` are resolved against `root` unless absolute.
    pub fn new(root: PathBuf, drafts: &Path, posts: &Path) -> Self {
        Self {
            drafts_dir: root.join(drafts),
            posts_dir: root.join(posts),
            root,
        }
    }

    pub fn ensure_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.drafts_dir, &self.posts_dir] {
            if !dir.exists() {
                debug!("creating {dir:?}");
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("while creating directory {dir:?}"))?;
            }
        }
        Ok(())
    }

    /// Path as shown to the operator: relative to the root when it lives under it.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
