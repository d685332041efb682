//! Subject and session identity.
//!
//! Every path the report generator touches is derived from the BIDS
//! identifier built here (`sub-<label>` or `sub-<label>_ses-<label>`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

const SUBJECT_PREFIX: &str = "sub-";
const SESSION_PREFIX: &str = "ses-";

/// Display value used in report headers when no session was given.
pub const SESSION_NOT_DEFINED: &str = "Not defined";

/// Subject label plus optional session label, parsed once from CLI input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectIdentity {
    /// Subject label with its `sub-` prefix.
    subject: String,
    /// Bare session label (without `ses-`).
    session: Option<String>,
}

impl SubjectIdentity {
    /// Parses a subject and optional session label.
    ///
    /// Both labels are accepted with or without their BIDS prefix, so
    /// `"HC001"` and `"sub-HC001"` identify the same subject. An empty session
    /// is treated as "no session".
    pub fn new(subject: &str, session: Option<&str>) -> Result<Self> {
        let subject = subject.trim();
        let bare_subject = subject.strip_prefix(SUBJECT_PREFIX).unwrap_or(subject);
        if !is_valid_label(bare_subject) {
            return Err(ModelError::InvalidSubject(subject.to_string()));
        }

        let session = match session.map(str::trim) {
            None | Some("") => None,
            Some(value) => {
                let bare = value.strip_prefix(SESSION_PREFIX).unwrap_or(value);
                if !is_valid_label(bare) {
                    return Err(ModelError::InvalidSession(value.to_string()));
                }
                Some(bare.to_string())
            }
        };

        Ok(Self {
            subject: format!("{SUBJECT_PREFIX}{bare_subject}"),
            session,
        })
    }

    /// Subject directory name, e.g. `sub-HC001`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Session directory name, e.g. `ses-01`.
    pub fn session_dir(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|label| format!("{SESSION_PREFIX}{label}"))
    }

    /// Session as shown in report headers.
    pub fn session_display(&self) -> &str {
        self.session.as_deref().unwrap_or(SESSION_NOT_DEFINED)
    }

    /// Combined identifier prefixed to every derivative file name.
    pub fn bids_id(&self) -> String {
        match self.session_dir() {
            Some(session) => format!("{}_{session}", self.subject),
            None => self.subject.clone(),
        }
    }
}

impl fmt::Display for SubjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bids_id())
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label
            .chars()
            .any(|ch| ch == '/' || ch == '\\' || ch == '_' || ch.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_and_bare_labels() {
        let bare = SubjectIdentity::new("HC001", Some("01")).unwrap();
        let prefixed = SubjectIdentity::new("sub-HC001", Some("ses-01")).unwrap();
        assert_eq!(bare, prefixed);
        assert_eq!(bare.bids_id(), "sub-HC001_ses-01");
        assert_eq!(bare.session_dir().as_deref(), Some("ses-01"));
        assert_eq!(bare.session_display(), "01");
    }

    #[test]
    fn empty_session_means_single_session() {
        let id = SubjectIdentity::new("sub-HC001", Some("")).unwrap();
        assert_eq!(id.bids_id(), "sub-HC001");
        assert_eq!(id.session_dir(), None);
        assert_eq!(id.session_display(), SESSION_NOT_DEFINED);
    }

    #[test]
    fn rejects_empty_or_path_like_labels() {
        assert!(SubjectIdentity::new("", None).is_err());
        assert!(SubjectIdentity::new("sub-", None).is_err());
        assert!(SubjectIdentity::new("../etc", None).is_err());
        assert!(SubjectIdentity::new("HC001", Some("ses-")).is_err());
    }
}
