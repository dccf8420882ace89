use thiserror::Error;

/// Library error type for gallery setup operations. Steady-state engine
/// operations never fail; only manifest/configuration loading does.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying IO error while reading a manifest file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde manifest error.
    #[error(transparent)]
    Manifest(#[from] serde_yaml::Error),
}
