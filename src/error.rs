use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Every way a Graph API call can come back without an object id.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response was not JSON (status {status}): {body}")]
    InvalidResponse { status: u16, body: String },

    #[error("graph api error {code:?} ({kind}): {message}")]
    Api {
        status: u16,
        message: String,
        kind: String,
        code: Option<i64>,
    },

    #[error("response did not contain an id: {body}")]
    MissingId { body: String },

    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("a post needs a message, a link or attached media")]
    NothingToPost,

    #[error("ad account id must start with 'act_', got {0:?}")]
    InvalidAdAccount(String),

    #[error("photo upload failed: {0}")]
    Upload(String),
}

impl GraphError {
    /// True when the error was raised locally and no request was sent.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            GraphError::MissingInput(_)
                | GraphError::NothingToPost
                | GraphError::InvalidAdAccount(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors() {
        assert!(GraphError::MissingInput("post_id").is_precondition());
        assert!(GraphError::NothingToPost.is_precondition());
        assert!(GraphError::InvalidAdAccount("123".into()).is_precondition());
        assert!(!GraphError::MissingId { body: "{}".into() }.is_precondition());
        assert!(!GraphError::Upload("boom".into()).is_precondition());
    }

    #[test]
    fn test_error_messages() {
        let err = GraphError::Api {
            status: 400,
            message: "Invalid parameter".into(),
            kind: "OAuthException".into(),
            code: Some(100),
        };
        assert_eq!(
            err.to_string(),
            "graph api error Some(100) (OAuthException): Invalid parameter"
        );
        assert_eq!(
            GraphError::MissingInput("ad_set_id").to_string(),
            "missing required input: ad_set_id"
        );
    }
}
