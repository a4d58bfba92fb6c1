#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Not enough bytes")]
    NotEnoughData { actual: usize, minimum: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The receiving end of a sample sink has gone away.
    #[error("sample sink closed")]
    SinkClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
