//! Deterministic, collision-free artifact file names.

use std::path::{Path, PathBuf};

/// Naming policy for one output artifact.
///
/// A described name is tried as `{prefix}_{stem}.{ext}` first and then as
/// `{prefix}_{stem}_1.{ext}`, `{prefix}_{stem}_2.{ext}`, ... until a free path
/// is found. A numbered name has no stem and counts from `{prefix}_1.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    prefix: String,
    stem: Option<String>,
    extension: String,
}

impl ArtifactName {
    pub fn described(prefix: &str, stem: &str, extension: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            stem: Some(stem.to_string()),
            extension: extension.to_string(),
        }
    }

    pub fn numbered(prefix: &str, extension: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            stem: None,
            extension: extension.to_string(),
        }
    }

    /// Same name under a different file extension.
    #[must_use]
    pub fn with_extension(&self, extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            ..self.clone()
        }
    }

    /// File name for the given attempt, starting at 0.
    pub fn candidate(&self, attempt: u32) -> String {
        let Self {
            prefix,
            stem,
            extension,
        } = self;
        match (stem, attempt) {
            (Some(stem), 0) => format!("{prefix}_{stem}.{extension}"),
            (Some(stem), n) => format!("{prefix}_{stem}_{n}.{extension}"),
            (None, n) => format!("{prefix}_{}.{extension}", n + 1),
        }
    }

    /// First candidate path inside `dir` that does not exist yet.
    pub fn next_free_in(&self, dir: &Path) -> PathBuf {
        let mut attempt = 0;
        loop {
            let path = dir.join(self.candidate(attempt));
            if !path.exists() {
                return path;
            }
            attempt += 1;
        }
    }
}
