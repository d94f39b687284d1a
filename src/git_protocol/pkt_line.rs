use super::super::{Error, Result};
use std::fmt;
use std::io::{ErrorKind, Read};

const HEADER_SIZE: usize = 4;

/// Largest total line size a 4 hex digit header can describe.
pub const MAX_PKT_LEN: usize = 0xffff;
pub const MAX_PKT_PAYLOAD: usize = MAX_PKT_LEN - HEADER_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PktLine {
    Flush,
    Text(Vec<u8>),
}

impl PktLine {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self::Text(bytes)
    }

    pub fn flush() -> Self {
        Self::Flush
    }

    /// Total on-wire size, header included. A flush line reports 0, as its header does.
    pub fn size(&self) -> usize {
        match self {
            Self::Flush => 0,
            Self::Text(bytes) => bytes.len() + HEADER_SIZE,
        }
    }

    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Self::Flush => None,
            Self::Text(bytes) => Some(bytes),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = vec![];
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Flush => out.extend_from_slice(b"0000"),
            Self::Text(bytes) => {
                if bytes.len() > MAX_PKT_PAYLOAD {
                    return Err(Error::Framing(format!(
                        "pkt-line payload of {} bytes exceeds {MAX_PKT_PAYLOAD}",
                        bytes.len()
                    )));
                }
                out.extend_from_slice(format!("{:04x}", self.size()).as_bytes());
                out.extend_from_slice(bytes);
            }
        }
        Ok(())
    }
}

impl From<&[u8]> for PktLine {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.into())
    }
}

impl From<&str> for PktLine {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl fmt::Display for PktLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flush => f.write_str("0000"),
            Self::Text(bytes) => write!(
                f,
                "{:04x}{}",
                self.size(),
                String::from_utf8_lossy(bytes)
            ),
        }
    }
}

/// Pulls pkt-lines off a byte source one at a time.
///
/// Each line costs one read for the header and one for the payload; nothing past the
/// declared length is consumed.
#[derive(Debug)]
pub struct PktLineReader<R> {
    reader: R,
}

impl<R: Read> PktLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns `Ok(None)` when the source ends cleanly on a line boundary.
    pub fn read(&mut self) -> Result<Option<PktLine>> {
        let Some(header) = self.read_header()? else {
            return Ok(None);
        };

        let line_len = line_size(&header)?;
        if line_len == 0 {
            return Ok(Some(PktLine::flush()));
        }
        if line_len < HEADER_SIZE {
            return Err(Error::Framing(format!(
                "pkt-line length {line_len:04x} is shorter than its header"
            )));
        }

        let payload_len = line_len - HEADER_SIZE;
        let mut buf = vec![0u8; payload_len];
        self.reader.read_exact(&mut buf).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => Error::Framing(format!(
                "truncated pkt-line payload, expected {payload_len} bytes"
            )),
            _ => Error::Framing(format!("cannot read pkt-line payload: {err}")),
        })?;

        trim_trailing_whitespace(&mut buf);
        Ok(Some(PktLine::new(buf)))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_header(&mut self) -> Result<Option<[u8; HEADER_SIZE]>> {
        let mut buf = [0u8; HEADER_SIZE];
        let mut filled = 0;

        while filled < HEADER_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(Error::Framing(format!(
                        "cannot read pkt-line header: {err}"
                    )))
                }
            }
        }

        match filled {
            0 => Ok(None),
            HEADER_SIZE => Ok(Some(buf)),
            n => Err(Error::Framing(format!(
                "truncated pkt-line header, got {n} of {HEADER_SIZE} bytes"
            ))),
        }
    }
}

impl<R: Read> Iterator for PktLineReader<R> {
    type Item = Result<PktLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

/// Reads every pkt-line from `reader` until it is exhausted.
pub fn decode<R: Read>(reader: R) -> Result<Vec<PktLine>> {
    PktLineReader::new(reader).collect()
}

pub fn encode(lines: &[PktLine]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(lines.iter().map(|l| l.size().max(4)).sum());
    for line in lines {
        line.encode_into(&mut out)?;
    }
    Ok(out)
}

fn line_size(buf: &[u8; HEADER_SIZE]) -> Result<usize> {
    if !buf.iter().all(u8::is_ascii_hexdigit) {
        return Err(Error::Framing(format!(
            "invalid pkt-line header {:?}",
            String::from_utf8_lossy(buf)
        )));
    }
    let len_str = std::str::from_utf8(buf)
        .map_err(|err| Error::Framing(format!("invalid pkt-line header: {err}")))?;
    usize::from_str_radix(len_str, 16)
        .map_err(|err| Error::Framing(format!("invalid pkt-line header {len_str:?}: {err}")))
}

fn trim_trailing_whitespace(buf: &mut Vec<u8>) {
    while buf.last().is_some_and(u8::is_ascii_whitespace) {
        buf.pop();
    }
}
