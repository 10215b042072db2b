//! Picking one entry out of a list of candidates.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
    process::{Command, Stdio},
};

use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Choice {
    /// Index into the candidate list.
    Picked(usize),
    Cancelled,
    /// The selector could not run; another one may be tried.
    Unavailable,
}

pub(crate) trait Selector {
    fn select_one(&mut self, candidates: &[String]) -> anyhow::Result<Choice>;
}

/// An external `fzf` process fed the candidates on stdin.
#[derive(Debug)]
pub(crate) struct FuzzyFinder {
    program: PathBuf,
    args: Vec<String>,
}

impl FuzzyFinder {
    /// Looks `fzf` up on `PATH`.
    pub fn detect(prompt: &str) -> Option<Self> {
        match which::which("fzf") {
            Ok(program) => {
                debug!("using fuzzy finder at {program:?}");
                Some(Self {
                    program,
                    args: vec![
                        "--prompt".to_string(),
                        prompt.to_string(),
                        "--height".to_string(),
                        "40%".to_string(),
                        "--reverse".to_string(),
                    ],
                })
            }
            Err(e) => {
                debug!("fzf not found: {e}");
                None
            }
        }
    }
}

impl Selector for FuzzyFinder {
    fn select_one(&mut self, candidates: &[String]) -> anyhow::Result<Choice> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("could not start {:?}: {e}", self.program);
                return Ok(Choice::Unavailable);
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            let input = candidates.join("\n") + "\n";
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                debug!("while feeding {:?}: {e}", self.program);
            }
        }

        let output = match child.wait_with_output() {
            Ok(output) => output,
            Err(e) => {
                warn!("{:?} failed: {e}", self.program);
                return Ok(Choice::Unavailable);
            }
        };
        if !output.status.success() {
            debug!("{:?} exited with {}", self.program, output.status);
            return Ok(Choice::Unavailable);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let selection = stdout.trim();
        if selection.is_empty() {
            return Ok(Choice::Cancelled);
        }
        match candidates.iter().position(|c| c == selection) {
            Some(i) => Ok(Choice::Picked(i)),
            None => {
                warn!("{:?} returned an unknown entry: {selection:?}", self.program);
                Ok(Choice::Unavailable)
            }
        }
    }
}

/// Numbered list on `output`, 1-based answer read from `input`.
pub(crate) struct NumberedPrompt<R, W> {
    input: R,
    output: W,
    heading: String,
}

impl<R: BufRead, W: Write> NumberedPrompt<R, W> {
    pub fn new(input: R, output: W, heading: &str) -> Self {
        Self {
            input,
            output,
            heading: heading.to_string(),
        }
    }
}

impl<R: BufRead, W: Write> Selector for NumberedPrompt<R, W> {
    fn select_one(&mut self, candidates: &[String]) -> anyhow::Result<Choice> {
        writeln!(self.output, "{}", self.heading)?;
        for (i, candidate) in candidates.iter().enumerate() {
            writeln!(self.output, "{}. {candidate}", i + 1)?;
        }

        loop {
            write!(self.output, "Enter number (or blank to cancel): ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(Choice::Cancelled);
            }
            let answer = line.trim();
            if answer.is_empty() {
                return Ok(Choice::Cancelled);
            }
            if answer.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(n) = answer.parse::<usize>() {
                    if (1..=candidates.len()).contains(&n) {
                        return Ok(Choice::Picked(n - 1));
                    }
                }
            }
            writeln!(self.output, "Invalid selection, try again.")?;
        }
    }
}

/// Runs `primary` when there is one, and `fallback` when it is absent or unavailable.
pub(crate) struct WithFallback<P, F> {
    primary: Option<P>,
    fallback: F,
}

impl<P: Selector, F: Selector> WithFallback<P, F> {
    pub fn new(primary: Option<P>, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Selector, F: Selector> Selector for WithFallback<P, F> {
    fn select_one(&mut self, candidates: &[String]) -> anyhow::Result<Choice> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.select_one(candidates)? {
                Choice::Unavailable => debug!("primary selector unavailable, falling back"),
                choice => return Ok(choice),
            }
        }
        self.fallback.select_one(candidates)
    }
}
