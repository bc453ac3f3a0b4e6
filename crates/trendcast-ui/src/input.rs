//! Line-oriented city input.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read the next city from `reader`.
///
/// Lines that are not valid UTF-8 are logged and skipped. Returns `None` at
/// end of input or when the reader fails.
pub async fn next_city<R: AsyncBufRead + Unpin>(reader: &mut R) -> Option<String> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                return None;
            }
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        match String::from_utf8(std::mem::take(&mut buf)) {
            Ok(line) => return Some(line),
            Err(e) => tracing::warn!("Skipping input line that is not UTF-8: {}", e),
        }
    }
}
