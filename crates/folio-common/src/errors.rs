#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("unknown view: {0}")]
    UnknownView(String),

    #[error("unsupported url: {0}")]
    UnsupportedUrl(String),

    #[error("host transport error: {0}")]
    HostTransport(String),
}
