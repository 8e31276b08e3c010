//! Text protocol for the save command socket.
//!
//! Request is a single UTF-8 write, response a single UTF-8 read of at most
//! [`MAX_RESPONSE_SIZE`] bytes:
//!
//!   request:  "SAVE"  or  "SAVE:<filename>"
//!   response: "SAVED:<path>"  or an error string

/// Maximum size of a single response read from the command socket.
pub const MAX_RESPONSE_SIZE: usize = 1024;

/// A save request for the robot-side command server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCommand {
    /// Filename the robot should save under; the robot picks its own when absent.
    pub filename: Option<String>,
}

impl SaveCommand {
    pub fn new() -> Self {
        Self { filename: None }
    }

    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
        }
    }

    /// Encode to the wire text.
    pub fn encode(&self) -> String {
        match &self.filename {
            Some(name) => format!("SAVE:{name}"),
            None => "SAVE".to_string(),
        }
    }
}

impl Default for SaveCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed response from the command server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResponse {
    /// The robot saved the image at the given remote path.
    Saved { path: String },
    /// Anything else. Carries the full response text for operator display.
    Error { message: String },
}

impl SaveResponse {
    /// Parse a response. Only "SAVED:<path>" counts as success; every other
    /// string is surfaced verbatim as an error.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix("SAVED:") {
            Some(path) => SaveResponse::Saved {
                path: path.to_string(),
            },
            None => SaveResponse::Error {
                message: text.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_without_filename() {
        assert_eq!(SaveCommand::new().encode(), "SAVE");
    }

    #[test]
    fn encode_with_filename() {
        let cmd = SaveCommand::with_filename("ball_dataset_0001_20260830_142733_512.jpg");
        assert_eq!(
            cmd.encode(),
            "SAVE:ball_dataset_0001_20260830_142733_512.jpg"
        );
    }

    #[test]
    fn parse_saved_extracts_remote_path() {
        let resp = SaveResponse::parse("SAVED:/data/img001.jpg");
        assert_eq!(
            resp,
            SaveResponse::Saved {
                path: "/data/img001.jpg".to_string()
            }
        );
    }

    #[test]
    fn parse_error_surfaces_full_text() {
        let resp = SaveResponse::parse("ERROR:disk full");
        assert_eq!(
            resp,
            SaveResponse::Error {
                message: "ERROR:disk full".to_string()
            }
        );
    }

    #[test]
    fn parse_empty_response_is_error() {
        assert!(matches!(
            SaveResponse::parse(""),
            SaveResponse::Error { .. }
        ));
    }

    #[test]
    fn saved_prefix_must_match_exactly() {
        // lowercase is not a success response
        assert!(matches!(
            SaveResponse::parse("saved:/data/img001.jpg"),
            SaveResponse::Error { .. }
        ));
    }
}
