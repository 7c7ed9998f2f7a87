use std::time::Duration;
use thiserror::Error;

/// Failure of a single list call. Always recovered at the panel that issued it.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FetchError {
    #[error("cluster unreachable: {0}")]
    Unreachable(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("{parent} was not found")]
    NotFound { parent: String },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

impl FetchError {
    pub fn placeholder(&self) -> String {
        format!("Failed to load: {self}")
    }
}

#[cfg(test)]
mod tests {
    use super::FetchError;
    use std::time::Duration;

    #[test]
    fn placeholder_names_the_reason() {
        let error = FetchError::NotFound {
            parent: "kube-system".to_string(),
        };
        assert_eq!(error.placeholder(), "Failed to load: kube-system was not found");
        assert_eq!(
            FetchError::TimedOut(Duration::from_secs(10)).to_string(),
            "timed out after 10s"
        );
    }
}
