//! Streamed download to a local file.
//!
//! Single attempt: any transport error or non-success status aborts the
//! download. A partially written file is left in place for the caller to
//! clean up.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use reqwest::header::HeaderMap;

use crate::error::{AcquireError, AcquireResult};
use crate::fetch::operations::build_client;
use crate::fetch::types::{CHUNK_SIZE, Timeout};

/// Stream `url` into `dest` in `CHUNK_SIZE` pieces.
///
/// Returns the number of bytes written.
pub fn stream_to_file(
    url: &str,
    dest: &Path,
    headers: Option<&HeaderMap>,
    timeout: Timeout,
) -> AcquireResult<u64> {
    let client = build_client(timeout)?;

    let mut request = client.get(url);
    if let Some(headers) = headers {
        request = request.headers(headers.clone());
    }

    let mut response = request
        .send()
        .map_err(|e| AcquireError::connectivity(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AcquireError::connectivity(url, format!("HTTP {}", status)));
    }

    let file = File::create(dest).map_err(AcquireError::io("failed to create", dest))?;
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| AcquireError::connectivity(url, format!("read error: {}", e)))?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(AcquireError::io("failed to write", dest))?;

        written += bytes_read as u64;
    }

    writer
        .flush()
        .map_err(AcquireError::io("failed to write", dest))?;

    tracing::debug!("downloaded {} bytes from {} to {}", written, url, dest.display());
    Ok(written)
}

/// Serve every connection a 200 that promises `declared` bytes but sends
/// `sent` and closes. Runs until the test process exits.
#[cfg(test)]
pub(crate) fn serve_cut_off_body(declared: usize, sent: &'static [u8]) -> std::net::SocketAddr {
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            // Request head ends with an empty line
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(sent);
            let _ = stream.flush();
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    });
    addr
}
