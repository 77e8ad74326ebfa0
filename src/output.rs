//! Writing generated files
//!
//! Table files go through an [`OverwritePolicy`]: a file that does not exist
//! yet is always created, while an existing one is only replaced when the
//! policy's [`ConflictResolver`] agrees. An "all" answer switches the policy
//! to overwrite every remaining file of the run without asking again.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::prelude::ModelGenError;

/// Answer to "this file already exists, overwrite it?"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Keep the existing file
    Decline,
    /// Overwrite this file only
    Accept,
    /// Overwrite this file and every following one
    AcceptAll,
}

impl Answer {
    /// Parse the first character of an operator reply (`n`, `y`, `a`)
    pub fn from_reply(reply: &str) -> Option<Self> {
        match reply.trim().chars().next()?.to_ascii_lowercase() {
            'n' => Some(Answer::Decline),
            'y' => Some(Answer::Accept),
            'a' => Some(Answer::AcceptAll),
            _ => None,
        }
    }
}

/// Decides what to do with an existing target file
pub trait ConflictResolver {
    fn resolve(&mut self, path: &Path) -> Result<Answer, ModelGenError>;
}

/// Overwrite everything without asking
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysOverwrite;

impl ConflictResolver for AlwaysOverwrite {
    fn resolve(&mut self, _path: &Path) -> Result<Answer, ModelGenError> {
        Ok(Answer::AcceptAll)
    }
}

/// Keep every existing file
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverOverwrite;

impl ConflictResolver for NeverOverwrite {
    fn resolve(&mut self, _path: &Path) -> Result<Answer, ModelGenError> {
        Ok(Answer::Decline)
    }
}

/// Ask the operator
///
/// Prints `File <path> already exists. Override? (y/n/a=all): ` and reads one
/// line per attempt until the reply starts with `y`, `n` or `a`. End of input
/// counts as a decline.
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl InteractivePrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's standard input and output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConflictResolver for InteractivePrompt<R, W> {
    fn resolve(&mut self, path: &Path) -> Result<Answer, ModelGenError> {
        loop {
            write!(
                self.output,
                "File {} already exists. Override? (y/n/a=all): ",
                path.display()
            )?;
            self.output.flush()?;

            let mut reply = String::new();
            if self.input.read_line(&mut reply)? == 0 {
                warn!(path = ?path, "No answer on input, keeping existing file");
                return Ok(Answer::Decline);
            }

            match Answer::from_reply(&reply) {
                Some(answer) => return Ok(answer),
                None => trace!(reply = ?reply.trim(), "Unrecognized answer"),
            }
        }
    }
}

/// Pre-recorded answers, consumed in order
///
/// Once the answers run out every further conflict is declined.
#[derive(Debug, Default, Clone)]
pub struct ScriptedResponses {
    answers: VecDeque<Answer>,
    asked: Vec<PathBuf>,
}

impl ScriptedResponses {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Paths the resolver was consulted for, in order
    pub fn asked(&self) -> &[PathBuf] {
        &self.asked
    }
}

impl ConflictResolver for ScriptedResponses {
    fn resolve(&mut self, path: &Path) -> Result<Answer, ModelGenError> {
        self.asked.push(path.to_path_buf());
        Ok(self.answers.pop_front().unwrap_or(Answer::Decline))
    }
}

/// Run-scoped overwrite state
pub struct OverwritePolicy<'r> {
    always_overwrite: bool,
    resolver: &'r mut dyn ConflictResolver,
}

impl<'r> OverwritePolicy<'r> {
    pub fn new(resolver: &'r mut dyn ConflictResolver) -> Self {
        Self {
            always_overwrite: false,
            resolver,
        }
    }

    /// Whether an "all" answer has been given during this run
    pub fn always_overwrite(&self) -> bool {
        self.always_overwrite
    }

    /// Decide whether `path` may be written
    pub fn allows(&mut self, path: &Path) -> Result<bool, ModelGenError> {
        if !path.exists() || self.always_overwrite {
            return Ok(true);
        }

        let answer = self.resolver.resolve(path)?;
        debug!(path = ?path, answer = ?answer, "Resolved existing file");

        Ok(match answer {
            Answer::Decline => false,
            Answer::Accept => true,
            Answer::AcceptAll => {
                self.always_overwrite = true;
                true
            }
        })
    }
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File did not exist and was created
    Created,
    /// Existing file was replaced
    Overwritten,
    /// Existing file was kept
    Skipped,
}

/// Write `content` to `path` if the policy allows it
pub fn write_file(
    path: &Path,
    content: &str,
    policy: &mut OverwritePolicy<'_>,
) -> Result<WriteResult, ModelGenError> {
    if !policy.allows(path)? {
        info!(path = ?path, "Skipping existing file");
        return Ok(WriteResult::Skipped);
    }

    write_file_unconditionally(path, content)
}

/// Write `content` to `path`, replacing whatever is there
pub fn write_file_unconditionally(path: &Path, content: &str) -> Result<WriteResult, ModelGenError> {
    let existed = path.exists();

    fs::write(path, content).map_err(|source| ModelGenError::Output {
        path: path.to_path_buf(),
        source,
    })?;

    let result = if existed {
        WriteResult::Overwritten
    } else {
        WriteResult::Created
    };
    debug!(path = ?path, result = ?result, "Wrote file");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn existing(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_answer_from_reply() {
        assert_eq!(Answer::from_reply("n\n"), Some(Answer::Decline));
        assert_eq!(Answer::from_reply("Y"), Some(Answer::Accept));
        assert_eq!(Answer::from_reply("  all\n"), Some(Answer::AcceptAll));
        assert_eq!(Answer::from_reply("yes"), Some(Answer::Accept));
        assert_eq!(Answer::from_reply("x"), None);
        assert_eq!(Answer::from_reply("\n"), None);
    }

    #[test]
    fn test_missing_file_is_created_without_asking() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.go");
        let mut resolver = ScriptedResponses::default();

        let result = {
            let mut policy = OverwritePolicy::new(&mut resolver);
            write_file(&path, "new", &mut policy).unwrap()
        };

        assert_eq!(result, WriteResult::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(resolver.asked().is_empty());
    }

    #[test]
    fn test_decline_keeps_content() {
        let dir = TempDir::new().unwrap();
        let path = existing(&dir, "users.go", "old");
        let mut resolver = ScriptedResponses::new([Answer::Decline]);
        let mut policy = OverwritePolicy::new(&mut resolver);

        let result = write_file(&path, "new", &mut policy).unwrap();

        assert_eq!(result, WriteResult::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!policy.always_overwrite());
    }

    #[test]
    fn test_accept_replaces_only_this_file() {
        let dir = TempDir::new().unwrap();
        let first = existing(&dir, "users.go", "old users");
        let second = existing(&dir, "orders.go", "old orders");
        let mut resolver = ScriptedResponses::new([Answer::Accept, Answer::Decline]);

        {
            let mut policy = OverwritePolicy::new(&mut resolver);
            assert_eq!(write_file(&first, "new users", &mut policy).unwrap(), WriteResult::Overwritten);
            assert!(!policy.always_overwrite());
            assert_eq!(write_file(&second, "new orders", &mut policy).unwrap(), WriteResult::Skipped);
        }

        assert_eq!(fs::read_to_string(&first).unwrap(), "new users");
        assert_eq!(fs::read_to_string(&second).unwrap(), "old orders");
        assert_eq!(resolver.asked().len(), 2);
    }

    #[test]
    fn test_accept_all_stops_asking() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<_> = ["a.go", "b.go", "c.go"]
            .iter()
            .map(|name| existing(&dir, name, "old"))
            .collect();
        let mut resolver = ScriptedResponses::new([Answer::AcceptAll]);

        {
            let mut policy = OverwritePolicy::new(&mut resolver);
            for path in &paths {
                assert_eq!(write_file(path, "new", &mut policy).unwrap(), WriteResult::Overwritten);
            }
            assert!(policy.always_overwrite());
        }

        for path in &paths {
            assert_eq!(fs::read_to_string(path).unwrap(), "new");
        }
        assert_eq!(resolver.asked(), &paths[..1]);
    }

    #[test]
    fn test_write_truncates_longer_content() {
        let dir = TempDir::new().unwrap();
        let path = existing(&dir, "users.go", "a much longer previous content");

        write_file_unconditionally(&path, "short").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
    }

    #[test]
    fn test_never_and_always_resolvers() {
        let dir = TempDir::new().unwrap();
        let path = existing(&dir, "users.go", "old");

        let mut never = NeverOverwrite;
        let mut policy = OverwritePolicy::new(&mut never);
        assert_eq!(write_file(&path, "new", &mut policy).unwrap(), WriteResult::Skipped);

        let mut always = AlwaysOverwrite;
        let mut policy = OverwritePolicy::new(&mut always);
        assert_eq!(write_file(&path, "new", &mut policy).unwrap(), WriteResult::Overwritten);
        assert!(policy.always_overwrite());
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_interactive_prompt_reprompts_until_valid() {
        let input = Cursor::new("maybe\n\nA\n");
        let mut output = Vec::new();

        let answer = {
            let mut prompt = InteractivePrompt::new(input, &mut output);
            prompt.resolve(Path::new("out/users.go")).unwrap()
        };

        assert_eq!(answer, Answer::AcceptAll);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(
            shown.matches("File out/users.go already exists. Override? (y/n/a=all): ").count(),
            3
        );
    }

    #[test]
    fn test_interactive_prompt_eof_declines() {
        let mut prompt = InteractivePrompt::new(Cursor::new(""), Vec::new());

        let answer = prompt.resolve(Path::new("users.go")).unwrap();

        assert_eq!(answer, Answer::Decline);
    }
}
