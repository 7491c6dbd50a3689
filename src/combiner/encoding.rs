use crate::combiner::header::Line;
use crate::error::{CombineError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// Label selecting verbatim byte handling.
pub const BINARY_LABEL: &str = "bytes";

/// How source lines are turned into [`Line`] values, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEncoding {
    #[default]
    Binary,
    Text(&'static Encoding),
}

impl LineEncoding {
    /// Resolve a user supplied label (`bytes`, `utf-8`, `latin1`, ...).
    ///
    /// Only ASCII-compatible encodings are accepted so that lines can be split
    /// on the `\n` byte before decoding.
    pub fn from_label(label: &str) -> Result<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case(BINARY_LABEL) || label.eq_ignore_ascii_case("binary") {
            return Ok(LineEncoding::Binary);
        }

        let encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| CombineError::Config {
            message: format!("Unknown encoding: {}", label),
        })?;

        if !encoding.is_ascii_compatible() {
            return Err(CombineError::Config {
                message: format!(
                    "Encoding {} is not supported: only ASCII-compatible encodings can be split into lines",
                    encoding.name()
                ),
            });
        }

        Ok(LineEncoding::Text(encoding))
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEncoding::Binary => BINARY_LABEL,
            LineEncoding::Text(encoding) => encoding.name(),
        }
    }

    /// Turn a raw line into a [`Line`]. Malformed input is a fault.
    pub fn decode(&self, raw: Vec<u8>, path: &Path, line_number: usize) -> Result<Line> {
        match self {
            LineEncoding::Binary => Ok(Line::Bytes(raw)),
            LineEncoding::Text(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(&raw)
                .map(|text| Line::Text(text.into_owned()))
                .ok_or_else(|| CombineError::Decode {
                    path: path.to_path_buf(),
                    line: line_number,
                    encoding: encoding.name(),
                }),
        }
    }

    /// Bytes to write for `line`.
    pub fn encode<'a>(&self, line: &'a Line) -> Result<Cow<'a, [u8]>> {
        match (self, line) {
            (LineEncoding::Text(encoding), Line::Text(text)) => {
                let (bytes, _, had_errors) = encoding.encode(text);
                if had_errors {
                    return Err(CombineError::Encode {
                        encoding: encoding.name(),
                    });
                }
                Ok(bytes)
            }
            (_, line) => Ok(Cow::Borrowed(line.as_bytes())),
        }
    }
}

impl fmt::Display for LineEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
