pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{field} missing for {transport} connection")]
    MissingField {
        transport: &'static str,
        field: &'static str,
    },

    #[error("Unsupported setting: {0}")]
    Unsupported(String),
}
