use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, From, Display)]
pub enum Error {
    #[from]
    Socks(crate::socks4::Error),

    #[from]
    IO(std::io::Error),
}

impl std::error::Error for Error {}
