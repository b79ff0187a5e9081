//! Shared header parsing for the Netpbm-style formats (PPM/PGM and PFM).
//!
//! A header is a sequence of whitespace-separated ASCII tokens; `#` starts a
//! comment that runs to the end of the line. Exactly one whitespace byte
//! separates the last token from the binary payload.

use crate::{IoError, IoResult};

/// Cursor over a header.
pub(crate) struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Next token, skipping whitespace and comments.
    pub(crate) fn token(&mut self) -> IoResult<&'a str> {
        loop {
            match self.bytes.get(self.pos) {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'#') => {
                    while let Some(&b) = self.bytes.get(self.pos) {
                        self.pos += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                }
                Some(_) => break,
                None => return Err(IoError::InvalidFile("truncated header".into())),
            }
        }
        let bytes = self.bytes;
        let start = self.pos;
        while bytes.get(self.pos).is_some_and(|b| !b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        std::str::from_utf8(&bytes[start..self.pos])
            .map_err(|_| IoError::InvalidFile("non-ASCII header".into()))
    }

    /// Next token parsed as `T`.
    pub(crate) fn parse<T: std::str::FromStr>(&mut self, what: &str) -> IoResult<T> {
        let token = self.token()?;
        token
            .parse()
            .map_err(|_| IoError::InvalidFile(format!("bad {}: {:?}", what, token)))
    }

    /// Consumes the single separator byte and returns the payload.
    pub(crate) fn payload(self) -> IoResult<&'a [u8]> {
        let bytes = self.bytes;
        match bytes.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => Ok(&bytes[self.pos + 1..]),
            _ => Err(IoError::InvalidFile("missing header terminator".into())),
        }
    }
}

/// Checked `width * height * channels * bytes_per_sample`, and that the
/// payload holds at least that much.
pub(crate) fn payload_len(
    payload: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    sample_bytes: usize,
) -> IoResult<usize> {
    if width == 0 || height == 0 {
        return Err(IoError::InvalidFile(format!("invalid dimensions {}x{}", width, height)));
    }
    let needed = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .and_then(|n| n.checked_mul(sample_bytes))
        .ok_or(IoError::AllocationFailed { requested: usize::MAX })?;
    if payload.len() < needed {
        return Err(IoError::InvalidFile(format!(
            "truncated pixel data: expected {} bytes, got {}",
            needed,
            payload.len()
        )));
    }
    Ok(needed)
}
