//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Lowercase hex commit identifier
//! - [`BranchName`] - Validated Git branch name
//! - [`CommitName`] - How a caller-supplied commit name is resolved
//! - [`ResetMode`] - soft / mixed / hard
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use gitbridge::core::types::{BranchName, CommitName, Oid};
//!
//! let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
//! assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
//!
//! assert!(BranchName::new("feature/login").is_ok());
//! assert!(BranchName::new("bad..name").is_err());
//!
//! assert!(matches!(CommitName::classify("HEAD"), CommitName::Reference(_)));
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("unknown reset mode '{0}', expected soft, mixed or hard")]
    InvalidResetMode(String),
}

/// Length of a SHA-1 commit id written as hex.
pub const HEX_ID_LEN: usize = 40;

/// A Git object identifier rendered as lowercase hex.
///
/// The length is always twice the binary id length: 40 for SHA-1,
/// 64 for SHA-256.
///
/// # Example
///
/// ```
/// use gitbridge::core::types::Oid;
///
/// let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(oid.short(7), "abc123d");
/// assert!(Oid::new("not-a-sha").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// The OID is normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        Self::validate(&oid)?;
        Ok(Self(oid))
    }

    /// Render a raw `git2` id as lowercase hex.
    pub fn from_git2(oid: git2::Oid) -> Self {
        Self(hex::encode(oid.as_bytes()))
    }

    /// Convert back into a `git2` id.
    pub fn to_git2(&self) -> Result<git2::Oid, TypeError> {
        git2::Oid::from_str(&self.0).map_err(|e| TypeError::InvalidOid(e.message().to_string()))
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    fn validate(oid: &str) -> Result<(), TypeError> {
        if oid.len() != HEX_ID_LEN && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(())
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<git2::Oid> for Oid {
    fn from(oid: git2::Oid) -> Self {
        Self::from_git2(oid)
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a caller-supplied commit name is resolved.
///
/// A name is a literal id only when it is exactly 40 characters long and
/// every character is a hex digit. Everything else, including 64-character
/// ids and abbreviated ids, goes through reference lookup.
///
/// # Example
///
/// ```
/// use gitbridge::core::types::CommitName;
///
/// let literal = "0123456789abcdef0123456789abcdef01234567";
/// assert!(matches!(CommitName::classify(literal), CommitName::Literal(_)));
/// assert!(matches!(CommitName::classify("refs/heads/master"), CommitName::Reference(_)));
/// assert!(matches!(CommitName::classify("0123456"), CommitName::Reference(_)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitName<'a> {
    /// A full 40-character hex id, used as-is.
    Literal(&'a str),
    /// A reference name such as `HEAD` or `refs/remotes/origin/master`.
    Reference(&'a str),
}

impl<'a> CommitName<'a> {
    /// Classify a name without touching any repository.
    pub fn classify(name: &'a str) -> Self {
        if is_hex_id(name) {
            CommitName::Literal(name)
        } else {
            CommitName::Reference(name)
        }
    }

    /// The name as given by the caller.
    pub fn as_str(&self) -> &'a str {
        match self {
            CommitName::Literal(s) | CommitName::Reference(s) => s,
        }
    }
}

/// Whether `name` is exactly 40 hex digits.
pub fn is_hex_id(name: &str) -> bool {
    name.len() == HEX_ID_LEN && name.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or exactly `@`
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
///   or ASCII control characters
///
/// # Example
///
/// ```
/// use gitbridge::core::types::BranchName;
///
/// let name = BranchName::new("release/1.2").unwrap();
/// assert_eq!(name.ref_name(), "refs/heads/release/1.2");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be empty".into(),
            ));
        }
        if name == "@" {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot be '@' (reserved)".into(),
            ));
        }
        if name.starts_with('.') || name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot start with '{}'",
                &name[..1]
            )));
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot end with '.lock' or '/'".into(),
            ));
        }
        for pattern in ["..", "@{", "//"] {
            if name.contains(pattern) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{pattern}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name
            .chars()
            .find(|c| INVALID_CHARS.contains(c) || c.is_ascii_control())
        {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain {c:?}"
            )));
        }

        for component in name.split('/') {
            if component.starts_with('.') || component.ends_with(".lock") {
                return Err(TypeError::InvalidBranchName(format!(
                    "invalid path component '{component}'"
                )));
            }
        }

        Ok(())
    }

    /// Full reference name (`refs/heads/<name>`).
    pub fn ref_name(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How far `reset` rewinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetMode {
    /// Move the branch only.
    Soft,
    /// Move the branch and reset the index.
    Mixed,
    /// Move the branch, reset the index and the working tree.
    Hard,
}

impl ResetMode {
    pub(crate) fn to_git2(self) -> git2::ResetType {
        match self {
            ResetMode::Soft => git2::ResetType::Soft,
            ResetMode::Mixed => git2::ResetType::Mixed,
            ResetMode::Hard => git2::ResetType::Hard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResetMode::Soft => "soft",
            ResetMode::Mixed => "mixed",
            ResetMode::Hard => "hard",
        }
    }
}

impl FromStr for ResetMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(ResetMode::Soft),
            "mixed" => Ok(ResetMode::Mixed),
            "hard" => Ok(ResetMode::Hard),
            other => Err(TypeError::InvalidResetMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
