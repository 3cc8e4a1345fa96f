use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;
use crate::models::{Credential, Message};

/**
 * \brief Read the whole file and decode it as JSON.
 */
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let raw = std::fs::read(path).map_err(|e| StoreError::io("reading", path, e))?;
    serde_json::from_slice(&raw).map_err(|e| StoreError::json(path, e))
}

/**
 * \brief Serialize `value` and replace the file contents with it. Returns
 * the written text so callers can log it.
 */
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<String, StoreError> {
    let text = serde_json::to_string(value).map_err(|e| StoreError::json(path, e))?;
    std::fs::write(path, text.as_bytes()).map_err(|e| StoreError::io("writing", path, e))?;
    Ok(text)
}

pub fn load_credential(path: &Path) -> Result<Credential, StoreError> {
    read_json(path)
}

pub fn save_credential(path: &Path, credential: &Credential) -> Result<String, StoreError> {
    write_json(path, credential)
}

pub fn load_transcript(path: &Path) -> Result<Vec<Message>, StoreError> {
    read_json(path)
}

pub fn save_transcript(path: &Path, transcript: &[Message]) -> Result<String, StoreError> {
    write_json(path, transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("token.json");
        let credential = Credential {
            access_token: "eyJhbGciOi.abc-123_==".to_string(),
            expires_at: 1_726_000_000_123,
        };

        save_credential(&path, &credential).expect("save");
        let loaded = load_credential(&path).expect("load");
        assert_eq!(loaded, credential);
    }

    #[test]
    fn test_credential_layout_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("token.json");
        let text = save_credential(
            &path,
            &Credential {
                access_token: "t".to_string(),
                expires_at: 5,
            },
        )
        .expect("save");
        assert_eq!(text, r#"{"access_token":"t","expires_at":5}"#);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn test_transcript_overwrites_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        let long = vec![
            Message::user("a"),
            Message::assistant("b"),
            Message::user("c"),
        ];
        save_transcript(&path, &long).expect("save long");
        save_transcript(&path, &long[..1]).expect("save short");

        let loaded = load_transcript(&path).expect("load");
        assert_eq!(loaded, vec![Message::user("a")]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_credential(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_transcript(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no/such/dir/history.json");
        let err = save_transcript(&path, &[Message::user("x")]).unwrap_err();
        assert!(matches!(err, StoreError::Io { operation: "writing", .. }));
    }
}
