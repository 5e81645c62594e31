//! Error taxonomy. `Error` carries only fatal, process-ending conditions —
//! pager I/O, corrupt files, out-of-bounds pages, and the unimplemented
//! internal-node split path. Recoverable statement-level problems (parse
//! errors, duplicate keys) are reported directly by the REPL and never
//! constructed as an `Error`.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    CorruptFile(String),
    PageOutOfBounds { page_num: u32, max: u32 },
    UnimplementedSplit,
    Fatal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "{e}"),
            Error::CorruptFile(msg) => write!(f, "{msg}"),
            Error::PageOutOfBounds { page_num, max } => {
                write!(f, "Tried to fetch page number out of bounds. {page_num} > {max}")
            }
            Error::UnimplementedSplit => {
                write!(f, "Need to implement updating parent after split")
            }
            Error::Fatal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

#[macro_export]
macro_rules! fatal {
    ($err:expr) => {{
        tracing::error!(error = %$err, "fatal error");
        eprintln!("{}", $err);
        std::process::exit(1);
    }};
}
