use std::{path::Path, process::Command};

use anyhow::Context as _;
use log::{debug, warn};

pub(crate) trait Editor {
    /// Blocks until the operator is done editing `path`.
    fn edit(&self, path: &Path) -> anyhow::Result<()>;
}

/// The operator's editor, run as a child process.
#[derive(Debug)]
pub(crate) struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// `$VISUAL`, then `$EDITOR`, then `vi`.
    pub fn from_env() -> Self {
        Self::new(resolve_command(
            std::env::var("VISUAL").ok(),
            std::env::var("EDITOR").ok(),
        ))
    }

    pub fn new(command: String) -> Self {
        Self { command }
    }
}

fn resolve_command(visual: Option<String>, editor: Option<String>) -> String {
    visual
        .filter(|v| !v.trim().is_empty())
        .or(editor.filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string())
}

impl Editor for ExternalEditor {
    fn edit(&self, path: &Path) -> anyhow::Result<()> {
        // split so that commands like `code --wait` work
        let mut parts = self.command.split_whitespace();
        let program = parts.next().context("editor command is empty")?;

        debug!("running {:?} on {path:?}", self.command);
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .with_context(|| format!("while starting editor {:?}", self.command))?;
        if !status.success() {
            warn!("editor {:?} exited with {status}", self.command);
        }
        Ok(())
    }
}
