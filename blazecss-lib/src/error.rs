use cssparser::ParseError;
use std::fmt;

/// Errors surfaced by the host pipeline. The merge engine itself never fails.
#[derive(Debug)]
pub enum BlazeCssError {
    /// The reader (or the lightningcss validator) rejected the input.
    Parse {
        message: String,
        line: u32,
        column: u32,
    },
    /// A browserslist query could not be resolved.
    InvalidTargets(String),
    Io(std::io::Error),
}

impl<'i, E: fmt::Display> From<ParseError<'i, E>> for BlazeCssError {
    fn from(err: ParseError<'i, E>) -> Self {
        BlazeCssError::Parse {
            message: err.kind.to_string(),
            line: err.location.line + 1,
            column: err.location.column,
        }
    }
}

impl fmt::Display for BlazeCssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlazeCssError::Parse {
                message,
                line,
                column,
            } => write!(f, "parse error at {}:{}: {}", line, column, message),
            BlazeCssError::InvalidTargets(message) => {
                write!(f, "invalid browser targets: {}", message)
            }
            BlazeCssError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for BlazeCssError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlazeCssError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlazeCssError {
    fn from(value: std::io::Error) -> Self {
        BlazeCssError::Io(value)
    }
}
