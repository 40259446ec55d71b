use std::alloc::Layout;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("allocation of {} bytes failed", .0.size())]
    Alloc(Layout),

    #[error("queue is empty")]
    Empty,

    #[error("queue is absent")]
    Absent,
}
