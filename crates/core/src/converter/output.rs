//! Line splitting for child process output.
//!
//! ffmpeg terminates `-stats` lines with a bare carriage return so a
//! terminal overwrites them in place. Lines here end at `\r`, `\n` or
//! `\r\n`, and invalid UTF-8 is replaced rather than treated as an error.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads lines from a child process stream.
///
/// [`next_line`](Self::next_line) is cancel safe: no data is lost if the
/// future is dropped before completing, so it can be used in
/// `tokio::select!`.
pub struct OutputLines<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
    after_cr: bool,
}

impl<R: AsyncRead + Unpin> OutputLines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
            after_cr: false,
        }
    }

    /// Returns the next line without its terminator, or `None` at end of
    /// stream.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_pending()));
            }

            let mut consumed = 0;
            let mut complete = false;
            for &byte in available {
                consumed += 1;
                if self.after_cr {
                    self.after_cr = false;
                    if byte == b'\n' {
                        continue;
                    }
                }
                match byte {
                    b'\r' => {
                        self.after_cr = true;
                        complete = true;
                        break;
                    }
                    b'\n' => {
                        complete = true;
                        break;
                    }
                    _ => self.pending.push(byte),
                }
            }
            self.reader.consume(consumed);

            if complete {
                return Ok(Some(self.take_pending()));
            }
        }
    }

    fn take_pending(&mut self) -> String {
        let bytes = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
