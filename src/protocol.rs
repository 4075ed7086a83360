//! Wire protocol between requesters and the server
//!
//! Every message is text terminated by a NUL byte and at most
//! [`MAX_MESSAGE_LEN`] bytes long, terminator included.
//!
//! Requests travel on the server's inbound pipe:
//!
//! ```text
//! <type>,<book name>,<isbn>,<requester id>\0
//! ```
//!
//! with `type` one of `P` (loan), `D` (return), `R` (renew), `Q` (quit).
//! Replies are free text written to the requester's private pipe,
//! `pipe_<requester id>`.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{
    error::{AppError, AppResult},
    models::{book::MAX_NAME_LEN, Operation, Request},
};

/// Largest message on either channel, NUL terminator included
pub const MAX_MESSAGE_LEN: usize = 256;

/// Name used in quit messages; the server ignores it
pub const QUIT_BOOK_NAME: &str = "quit";

const READ_CHUNK: usize = 256;

/// Path of the private reply pipe for a requester
pub fn reply_pipe_path(directory: &Path, requester: u32) -> PathBuf {
    directory.join(format!("pipe_{}", requester))
}

/// Decode one request frame (without its NUL terminator)
pub fn decode_request(frame: &[u8]) -> AppResult<Request> {
    if frame.len() >= MAX_MESSAGE_LEN {
        return Err(AppError::Parse(format!(
            "message of {} bytes exceeds {} bytes",
            frame.len(),
            MAX_MESSAGE_LEN - 1
        )));
    }
    let text = std::str::from_utf8(frame)
        .map_err(|_| AppError::Parse("message is not valid UTF-8".to_string()))?;
    parse_request(text)
}

/// Parse `type,name,isbn,requester`
pub fn parse_request(text: &str) -> AppResult<Request> {
    let bad = |what: &str| AppError::Parse(format!("{} in '{}'", what, text));

    let fields: Vec<&str> = text.trim_end_matches(['\r', '\n']).split(',').collect();
    let [kind, name, isbn, requester] = fields.as_slice() else {
        return Err(bad("expected 4 fields"));
    };

    let mut kind_chars = kind.chars();
    let operation = match (kind_chars.next(), kind_chars.next()) {
        (Some(c), None) => Operation::from_code(c).ok_or_else(|| bad("unknown operation"))?,
        _ => return Err(bad("operation must be a single letter")),
    };

    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(bad("invalid book name"));
    }

    let isbn = isbn.trim().parse().map_err(|_| bad("invalid isbn"))?;
    let requester = requester
        .trim()
        .parse()
        .map_err(|_| bad("invalid requester id"))?;

    Ok(Request::new(operation, *name, isbn, requester))
}

/// Encode a request as a NUL-terminated frame
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut frame = format!(
        "{},{},{},{}",
        request.operation.code(),
        request.book,
        request.isbn,
        request.requester
    )
    .into_bytes();
    frame.push(0);
    frame
}

/// Encode a reply, truncating it on a character boundary to fit the limit
pub fn encode_reply(text: &str) -> Vec<u8> {
    let mut end = text.len().min(MAX_MESSAGE_LEN - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut frame = Vec::with_capacity(end + 1);
    frame.extend_from_slice(&text.as_bytes()[..end]);
    frame.push(0);
    frame
}

/// Splits a byte stream into NUL-terminated frames.
///
/// Several frames delivered by a single read are returned one by one.
/// A run of bytes without a terminator is cut once it grows well past
/// [`MAX_MESSAGE_LEN`], so a misbehaving writer cannot grow the buffer
/// without bound; the decoder then rejects the oversized frame.
/// `next_frame` is cancel safe.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(MAX_MESSAGE_LEN),
        }
    }

    /// Next frame without its terminator; `None` at end of stream
    pub async fn next_frame(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(pos) = self.buffer.iter().position(|b| *b == 0) {
                let mut frame: Vec<u8> = self.buffer.drain(..=pos).collect();
                frame.pop();
                return Ok(Some(frame));
            }
            if self.buffer.len() > 4 * MAX_MESSAGE_LEN {
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }

            let n = self.reader.read(&mut chunk).await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}
