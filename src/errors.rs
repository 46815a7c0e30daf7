//! Error types.
//!
//! Everything fallible in this crate returns a [`Res`]. Errors only come from
//! the boundaries: ill-formed datasets, rule text that does not parse, or
//! description lengths degenerating to NaN/infinity where the algorithm has no
//! defined fallback. Degenerate statistics with a defined fallback (zero
//! weights, empty splits) are not errors.

use std::fmt;

/// Rule-text parse error data.
#[derive(Debug)]
pub struct ParseErrorData {
    /// Error message.
    pub msg: String,
    /// Token that caused the error.
    pub token: String,
    /// Line of the error, 1-based, relative to the parsed input.
    pub line: usize,
}

impl ParseErrorData {
    /// Constructor.
    pub fn new<S1, S2>(msg: S1, token: S2, line: usize) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ParseErrorData {
            msg: msg.into(),
            token: token.into(),
            line,
        }
    }
}

impl fmt::Display for ParseErrorData {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{} at line {}: `{}`", self.msg, self.line, self.token)
    }
}

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Res;
    }

    foreign_links {
        Io(::std::io::Error) #[doc = "IO error."];
    }

    errors {
        #[doc = "Rule text parse error."]
        Parse(data: ParseErrorData) {
            description("parse error")
            display("parse error: {}", data)
        }
        #[doc = "Ill-formed input data."]
        Data(msg: String) {
            description("data error")
            display("illegal data: {}", msg)
        }
    }
}

impl Error {
    /// True if the error is a rule-text parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse(_))
    }

    /// True if the error is a data error.
    pub fn is_data(&self) -> bool {
        matches!(self.kind(), ErrorKind::Data(_))
    }
}
