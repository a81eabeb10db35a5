//! Flat-file credential store.
//!
//! One record per line, `login:secret`. Loaded once at startup and
//! immutable afterwards, so lookups need no locking.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

/// In-memory map of login to plaintext secret.
#[derive(Debug, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    /// Load credentials from a flat file.
    ///
    /// Empty lines and lines starting with `#` are skipped. Malformed lines
    /// (no colon, empty login, empty secret) are skipped with a warning.
    /// A later duplicate login overwrites the earlier entry.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CredentialError::FileRead(path.to_path_buf(), e))?;
        Ok(Self::parse(&contents))
    }

    /// Parse credential file contents.
    fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();

        for (idx, line) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((login, secret)) = line.split_once(':') else {
                warn!(line = line_no, "Skipping credential line without colon");
                continue;
            };

            let login = login.trim();
            let secret = secret.trim();

            if login.is_empty() || secret.is_empty() {
                warn!(line = line_no, "Skipping credential line with empty field");
                continue;
            }

            entries.insert(login.to_string(), secret.to_string());
        }

        Self { entries }
    }

    /// Look up the stored secret for a login. Case-sensitive.
    pub fn secret(&self, login: &str) -> Option<&str> {
        self.entries.get(login).map(|s| s.as_str())
    }

    /// Number of loaded credentials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Credential loading errors. All startup-fatal.
#[derive(Debug)]
pub enum CredentialError {
    FileRead(PathBuf, std::io::Error),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::FileRead(path, e) => {
                write!(
                    f,
                    "Failed to read credential file '{}': {}",
                    path.display(),
                    e
                )
            }
        }
    }
}

impl std::error::Error for CredentialError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic() {
        let store = CredentialStore::parse("alice:pw1\nbob:pw2\n");
        assert_eq!(store.len(), 2);
        assert_eq!(store.secret("alice"), Some("pw1"));
        assert_eq!(store.secret("bob"), Some("pw2"));
        assert_eq!(store.secret("carol"), None);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let store = CredentialStore::parse("# users\n\nalice:pw1\n\n# end\n");
        assert_eq!(store.len(), 1);
        assert!(store.secret("alice").is_some());
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let store = CredentialStore::parse("no-colon\n:nologin\nnosecret:\nalice:pw1\n");
        assert_eq!(store.len(), 1);
        assert_eq!(store.secret("alice"), Some("pw1"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let store = CredentialStore::parse("  alice  :  pw1  \n");
        assert_eq!(store.secret("alice"), Some("pw1"));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let store = CredentialStore::parse("alice:old\nalice:new\n");
        assert_eq!(store.len(), 1);
        assert_eq!(store.secret("alice"), Some("new"));
    }

    #[test]
    fn test_logins_are_case_sensitive() {
        let store = CredentialStore::parse("alice:pw1\n");
        assert!(store.secret("Alice").is_none());
    }

    #[test]
    fn test_secret_may_contain_colons() {
        let store = CredentialStore::parse("alice:pw:with:colons\n");
        assert_eq!(store.secret("alice"), Some("pw:with:colons"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alice:pw1").unwrap();
        writeln!(file, "bob:pw2").unwrap();

        let store = CredentialStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = CredentialStore::load(Path::new("/nonexistent/clients.conf"));
        assert!(matches!(result, Err(CredentialError::FileRead(_, _))));
    }
}
