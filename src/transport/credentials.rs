//! transport::credentials
//!
//! Username/password credentials and the answer to the transport's
//! credential challenge.
//!
//! # Security
//!
//! The password never appears in `Debug` output, logs or error messages.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Author identity used for commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Credentials captured by a repository handle.
///
/// Username and password answer plaintext credential challenges during
/// fetch and push. The optional author is used by `commit`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
    author: Option<Author>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            author: None,
        }
    }

    /// Attach the identity used for commits.
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("author", &self.author)
            .finish()
    }
}

/// Answers credential challenges for one operation.
///
/// Only plaintext username/password is offered. A second challenge within
/// the same operation means the server rejected the first answer, so it
/// fails instead of handing out the same credentials again.
#[derive(Debug)]
pub(crate) struct CredentialResponder {
    credentials: Option<Credentials>,
    attempts: u32,
}

impl CredentialResponder {
    pub(crate) fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            attempts: 0,
        }
    }

    pub(crate) fn respond(
        &mut self,
        url: &str,
        allowed: git2::CredentialType,
    ) -> Result<git2::Cred, git2::Error> {
        if !allowed.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
            return Err(git2::Error::from_str(&format!(
                "{url} requires credentials other than username/password"
            )));
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            git2::Error::from_str(&format!("{url} requires credentials but none were given"))
        })?;

        if self.attempts > 0 {
            return Err(git2::Error::from_str(&format!(
                "credentials for '{}' were rejected by {url}",
                credentials.username()
            )));
        }
        self.attempts += 1;

        debug!(url, username = credentials.username(), "answering credential challenge");
        git2::Cred::userpass_plaintext(credentials.username(), credentials.password())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn author_is_optional() {
        let creds = Credentials::new("alice", "pw");
        assert!(creds.author().is_none());
        let creds = creds.with_author(Author::new("Alice", "alice@example.com"));
        assert_eq!(creds.author().unwrap().email, "alice@example.com");
    }

    mod responder {
        use super::*;

        #[test]
        fn answers_first_challenge() {
            let mut responder = CredentialResponder::new(Some(Credentials::new("alice", "pw")));
            let cred = responder
                .respond("https://example.com/r.git", git2::CredentialType::USER_PASS_PLAINTEXT)
                .unwrap();
            assert!(cred.has_username());
        }

        #[test]
        fn second_challenge_is_rejection() {
            let mut responder = CredentialResponder::new(Some(Credentials::new("alice", "pw")));
            let url = "https://example.com/r.git";
            responder
                .respond(url, git2::CredentialType::USER_PASS_PLAINTEXT)
                .unwrap();
            let Err(err) = responder.respond(url, git2::CredentialType::USER_PASS_PLAINTEXT)
            else {
                panic!("second challenge was answered");
            };
            assert!(err.message().contains("rejected"));
            assert!(!err.message().contains("pw"));
        }

        #[test]
        fn missing_credentials_fail() {
            let mut responder = CredentialResponder::new(None);
            let Err(err) = responder
                .respond("https://example.com/r.git", git2::CredentialType::USER_PASS_PLAINTEXT)
            else {
                panic!("answered without credentials");
            };
            assert!(err.message().contains("none were given"));
        }

        #[test]
        fn non_plaintext_challenge_fails() {
            let mut responder = CredentialResponder::new(Some(Credentials::new("alice", "pw")));
            let Err(err) = responder
                .respond("ssh://example.com/r.git", git2::CredentialType::SSH_KEY)
            else {
                panic!("answered an ssh key challenge");
            };
            assert!(err.message().contains("username/password"));
        }
    }
}
