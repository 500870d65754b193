//! CLI Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open the offline cache")]
    Open,
    #[display("could not set up the playlist source")]
    Source,
    #[display("refresh failed")]
    Refresh,
    #[display("could not read the offline cache")]
    Read,
    #[display("could not write output")]
    Output,
}
