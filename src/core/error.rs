use thiserror::Error;

/// 访问层错误类型
#[derive(Error, Debug)]
pub enum WpError {
    #[error("request to {url} failed with status {status}")]
    Status {
        status: u16,
        url: String,
    },

    #[error("GraphQL error: {message}")]
    Graphql {
        message: String,
    },

    #[error("GraphQL response contained neither data nor errors")]
    MissingData,

    #[error("page {page} ({per_page} per page) is beyond the {limit} posts reachable by cursor")]
    PageOutOfRange {
        page: usize,
        per_page: usize,
        limit: usize,
    },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response shape for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid WordPress URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl WpError {
    /// HTTP 状态码（仅 `Status` 有）
    pub fn status(&self) -> Option<u16> {
        match self {
            WpError::Status { status, .. } => Some(*status),
            WpError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T, E = WpError> = std::result::Result<T, E>;
