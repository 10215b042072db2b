use std::{
    fs::OpenOptions,
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context as _};
use chrono::{DateTime, FixedOffset};
use log::{debug, info, warn};

use crate::{
    context::Context,
    editor::Editor,
    front_matter::{date_prefix, stub},
    slug::{slugify, validate_slug},
};

/// Where a new post is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staging {
    /// `<drafts>/<slug>.md`, published later.
    Draft,
    /// `<posts>/<date>-<slug>.md`, published right away.
    Direct,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CreateOptions {
    pub staging: Staging,
    /// Open the editor and drop the file again if it comes back unchanged.
    pub edit: bool,
}

impl CreateOptions {
    // a post written straight into the posts directory must not stay an empty stub
    fn edits(&self) -> bool {
        self.edit || self.staging == Staging::Direct
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CreateOutcome {
    /// Empty title.
    Cancelled,
    Created(PathBuf),
    /// The editor left the stub untouched, so the file was removed.
    Discarded(PathBuf),
}

/// Reads one title line. `None` on end of input.
pub(crate) fn prompt_title<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> anyhow::Result<Option<String>> {
    write!(output, "Enter post title: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

pub(crate) fn target_path(
    ctx: &Context,
    slug: &str,
    staging: Staging,
    now: &DateTime<FixedOffset>,
) -> PathBuf {
    match staging {
        Staging::Draft => ctx.drafts_dir.join(format!("{slug}.md")),
        Staging::Direct => ctx
            .posts_dir
            .join(format!("{}-{slug}.md", date_prefix(now))),
    }
}

pub(crate) fn create_post(
    ctx: &Context,
    title: &str,
    options: CreateOptions,
    now: &DateTime<FixedOffset>,
    editor: &dyn Editor,
) -> anyhow::Result<CreateOutcome> {
    let title = title.trim();
    if title.is_empty() {
        return Ok(CreateOutcome::Cancelled);
    }

    let slug = slugify(title);
    validate_slug(&slug).with_context(|| format!("while creating a post titled {title:?}"))?;
    let path = target_path(ctx, &slug, options.staging, now);

    let content = stub(title, now);
    match options.staging {
        // no collision check for drafts: an existing draft with the same slug is replaced
        Staging::Draft => {
            if path.exists() {
                warn!("overwriting existing file {path:?}");
            }
            std::fs::write(&path, &content).with_context(|| format!("while writing {path:?}"))?;
        }
        // a published post is never replaced, the discard step could delete it
        Staging::Direct => {
            if path.exists() {
                bail!("{path:?} already exists, not overwriting it");
            }
            let mut fd = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .with_context(|| format!("while creating {path:?}"))?;
            fd.write_all(content.as_bytes())
                .with_context(|| format!("while writing {path:?}"))?;
        }
    }
    info!("wrote stub to {path:?}");

    if !options.edits() {
        return Ok(CreateOutcome::Created(path));
    }

    if let Err(e) = editor.edit(&path) {
        discard_if_unchanged(&path, &content)?;
        return Err(e);
    }
    if discard_if_unchanged(&path, &content)? {
        return Ok(CreateOutcome::Discarded(path));
    }

    Ok(CreateOutcome::Created(path))
}

/// Removes `path` when its content still matches `stub` up to surrounding whitespace.
fn discard_if_unchanged(path: &Path, stub: &str) -> anyhow::Result<bool> {
    let edited =
        std::fs::read_to_string(path).with_context(|| format!("while reading back {path:?}"))?;
    if edited.trim() != stub.trim() {
        return Ok(false);
    }
    std::fs::remove_file(path).with_context(|| format!("while removing {path:?}"))?;
    debug!("discarded unedited {path:?}");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::editor::ExternalEditor;
    use std::{cell::Cell, fs, io::Cursor};
    use tempfile::TempDir;

    /// Appends `text` to the file, or leaves it alone when `text` is empty.
    struct Scripted<'a> {
        text: &'a str,
        calls: Cell<usize>,
    }

    impl<'a> Scripted<'a> {
        fn new(text: &'a str) -> Self {
            Self {
                text,
                calls: Cell::new(0),
            }
        }
    }

    impl Editor for Scripted<'_> {
        fn edit(&self, path: &Path) -> anyhow::Result<()> {
            self.calls.set(self.calls.get() + 1);
            if !self.text.is_empty() {
                let mut content = fs::read_to_string(path)?;
                content.push_str(self.text);
                fs::write(path, content)?;
            }
            Ok(())
        }
    }

    fn blog() -> (TempDir, Context) {
        let temp = TempDir::new().unwrap();
        let ctx = Context::new(
            temp.path().to_path_buf(),
            Path::new("_drafts"),
            Path::new("_posts"),
        );
        ctx.ensure_dirs().unwrap();
        (temp, ctx)
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .unwrap()
    }

    const DRAFT: CreateOptions = CreateOptions {
        staging: Staging::Draft,
        edit: false,
    };

    #[test]
    fn test_prompt_title() {
        let mut output = Vec::new();
        let title = prompt_title(Cursor::new("Hello World's Test\r\n"), &mut output).unwrap();
        assert_eq!(title.as_deref(), Some("Hello World's Test"));
        assert_eq!(String::from_utf8(output).unwrap(), "Enter post title: ");

        assert_eq!(prompt_title(Cursor::new(""), Vec::new()).unwrap(), None);
        assert_eq!(
            prompt_title(Cursor::new("\n"), Vec::new()).unwrap().as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_creates_draft_stub() {
        let (_temp, ctx) = blog();
        let editor = Scripted::new("");
        let outcome = create_post(&ctx, "Hello World's Test", DRAFT, &now(), &editor).unwrap();

        let path = ctx.drafts_dir.join("hello-worlds-test.md");
        assert_eq!(outcome, CreateOutcome::Created(path.clone()));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "---\ntitle: \"Hello World's Test\"\ndate: 2024-03-01 09:30 +0200\n---\n\n"
        );
        assert_eq!(editor.calls.get(), 0);
    }

    #[test]
    fn test_empty_title_cancels() {
        let (_temp, ctx) = blog();
        let editor = Scripted::new("");
        for title in ["", "   "] {
            assert_eq!(
                create_post(&ctx, title, DRAFT, &now(), &editor).unwrap(),
                CreateOutcome::Cancelled
            );
        }
        assert_eq!(fs::read_dir(&ctx.drafts_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_unusable_slug_is_rejected() {
        let (_temp, ctx) = blog();
        assert!(create_post(&ctx, "''", DRAFT, &now(), &Scripted::new("")).is_err());
        assert!(create_post(&ctx, "a/b", DRAFT, &now(), &Scripted::new("")).is_err());
    }

    #[test]
    fn test_same_slug_overwrites_existing_draft() {
        // known sharp edge: there is no collision check
        let (_temp, ctx) = blog();
        let path = ctx.drafts_dir.join("my-post.md");
        fs::write(&path, "---\ntitle: \"old\"\n---\n\nprecious body\n").unwrap();

        create_post(&ctx, "My Post", DRAFT, &now(), &Scripted::new("")).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("precious body"));
        assert!(content.contains("title: \"My Post\""));
    }

    #[test]
    fn test_direct_post_kept_when_edited() {
        let (_temp, ctx) = blog();
        let options = CreateOptions {
            staging: Staging::Direct,
            edit: false,
        };
        let editor = Scripted::new("Some words.\n");
        let outcome = create_post(&ctx, "My Post", options, &now(), &editor).unwrap();

        let path = ctx.posts_dir.join("2024-03-01-my-post.md");
        assert_eq!(outcome, CreateOutcome::Created(path.clone()));
        assert_eq!(editor.calls.get(), 1);
        assert!(fs::read_to_string(&path).unwrap().ends_with("---\n\nSome words.\n"));
    }

    #[test]
    fn test_direct_post_discarded_when_unedited() {
        let (_temp, ctx) = blog();
        let options = CreateOptions {
            staging: Staging::Direct,
            edit: false,
        };
        let editor = Scripted::new("");
        let outcome = create_post(&ctx, "My Post", options, &now(), &editor).unwrap();

        let path = ctx.posts_dir.join("2024-03-01-my-post.md");
        assert_eq!(outcome, CreateOutcome::Discarded(path.clone()));
        assert_eq!(editor.calls.get(), 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_direct_post_never_replaces_published_one() {
        let (_temp, ctx) = blog();
        let options = CreateOptions {
            staging: Staging::Direct,
            edit: false,
        };
        let path = ctx.posts_dir.join("2024-03-01-my-post.md");
        fs::write(&path, "---\ntitle: \"My Post\"\n---\n\nwritten this morning\n").unwrap();

        let editor = Scripted::new("");
        let err = create_post(&ctx, "My Post", options, &now(), &editor).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(editor.calls.get(), 0);
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("written this morning"));
    }

    #[test]
    fn test_stub_removed_when_editor_cannot_start() {
        let (_temp, ctx) = blog();
        let options = CreateOptions {
            staging: Staging::Direct,
            edit: false,
        };
        let editor = ExternalEditor::new("no-such-editor-for-blogdraft".into());
        assert!(create_post(&ctx, "My Post", options, &now(), &editor).is_err());
        assert_eq!(fs::read_dir(&ctx.posts_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_whitespace_only_edit_counts_as_unedited() {
        let (_temp, ctx) = blog();
        let options = CreateOptions {
            staging: Staging::Draft,
            edit: true,
        };
        let outcome =
            create_post(&ctx, "My Post", options, &now(), &Scripted::new("\n\n  \n")).unwrap();

        let path = ctx.drafts_dir.join("my-post.md");
        assert_eq!(outcome, CreateOutcome::Discarded(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_target_path() {
        let (_temp, ctx) = blog();
        assert_eq!(
            target_path(&ctx, "a", Staging::Draft, &now()),
            ctx.drafts_dir.join("a.md")
        );
        assert_eq!(
            target_path(&ctx, "a", Staging::Direct, &now()),
            ctx.posts_dir.join("2024-03-01-a.md")
        );
    }
}
