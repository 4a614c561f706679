use crate::domain::model::UserProfile;
use crate::domain::ports::SessionProvider;
use crate::utils::error::{DashError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Token and cached profile, as saved by the login flow.
///
/// Session files hold the same two entries the browser keeps:
///
/// ```json
/// { "token": "eyJhbGciOi...", "user": { "name": "Asha", "email": "asha@example.com" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl SessionState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(DashError::IoError)?;
        Self::from_json_str(&content).map_err(|e| DashError::ConfigValidationError {
            field: path.display().to_string(),
            message: format!("invalid session file: {}", e),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Explicit token wins over whatever the session file holds; the file
    /// still contributes the cached profile.
    pub fn resolve(token: Option<String>, session_file: Option<&str>) -> Result<Self> {
        let mut session = match session_file {
            Some(path) => Self::from_file(path)?,
            None => Self::anonymous(),
        };
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            session.token = Some(token);
        }
        Ok(session)
    }
}

impl SessionProvider for SessionState {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_anonymous_session_is_rejected() {
        let session = SessionState::anonymous();
        assert!(matches!(
            session.require_token(),
            Err(DashError::Unauthenticated { .. })
        ));
    }

    #[test]
    fn test_blank_token_is_rejected() {
        let session = SessionState::with_token("   ");
        assert!(session.require_token().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"token": "abc", "user": {"_id": "u1", "name": "Asha", "email": "asha@example.com"}}"#,
        )
        .unwrap();

        let session = SessionState::from_file(file.path()).unwrap();
        assert_eq!(session.require_token().unwrap(), "abc");
        let user = session.user().unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.name.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"token=abc").unwrap();

        let err = SessionState::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DashError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_explicit_token_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"token": "old", "user": {"name": "Asha"}}"#)
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let session = SessionState::resolve(Some("new".to_string()), Some(&path)).unwrap();
        assert_eq!(session.token(), Some("new"));
        assert_eq!(session.user().and_then(|u| u.name.as_deref()), Some("Asha"));

        let session = SessionState::resolve(None, Some(&path)).unwrap();
        assert_eq!(session.token(), Some("old"));
    }
}
