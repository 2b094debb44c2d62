#[derive(Debug)]
pub enum Error {
    Config(std::string::String),
    Encoding(std::string::String),
    Compression(std::string::String),
    Io(std::io::Error),
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
