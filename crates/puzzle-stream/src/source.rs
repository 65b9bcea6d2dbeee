//! Corpus input selection.

use crate::StreamError;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader, DuplexStream};
use tokio::process::Command;

/// Buffered reader over a corpus input, plain or decompressed.
pub type CorpusReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;

/// Opens a corpus for streaming.
///
/// `http(s)` sources are streamed as they download; `-` reads standard
/// input; `.zst` paths are piped through an external `zstdcat`
/// subprocess (decompression applies to local paths only, remote
/// corpora are expected uncompressed). Everything else is read directly
/// from the filesystem. In every case the parsers see a plain byte
/// stream; the transforms here are transparent.
pub async fn open_corpus(path: &str) -> Result<CorpusReader, StreamError> {
    let raw: Box<dyn AsyncRead + Send + Unpin> = if path.starts_with("http://")
        || path.starts_with("https://")
    {
        Box::new(open_url(path).await?)
    } else if path == "-" {
        Box::new(tokio::io::stdin())
    } else if path.ends_with(".zst") {
        let mut child = Command::new("zstdcat")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child.stdout.take().ok_or_else(|| {
            std::io::Error::other("zstdcat stdout unavailable")
        })?;
        // Reap the decompressor when it finishes; it exits on its own at
        // end of input or on SIGPIPE when the reader is dropped.
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        Box::new(stdout)
    } else {
        Box::new(tokio::fs::File::open(path).await?)
    };
    Ok(BufReader::new(raw))
}

/// Streams a remote corpus without buffering the whole body.
///
/// Response chunks are pumped into one half of an in-memory duplex pipe
/// by a background task; the returned half reads them. Dropping the
/// reader tears the task down through its failed writes.
async fn open_url(url: &str) -> Result<DuplexStream, StreamError> {
    let mut response = reqwest::get(url).await?.error_for_status()?;
    let (reader, mut writer) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if writer.write_all(&chunk).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "corpus download interrupted");
                    break;
                }
            }
        }
    });
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.pgn");
        std::fs::write(&path, "[Event \"x\"]\n").unwrap();

        let mut reader = open_corpus(path.to_str().unwrap()).await.unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "[Event \"x\"]\n");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        assert!(open_corpus("/no/such/corpus.pgn").await.is_err());
    }

    #[tokio::test]
    async fn test_open_http_url() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let body = "{\"id\":\"g1\",\"moves\":\"e4\"}\n";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let url = format!("http://{}/corpus.ndjson", addr);
        let mut reader = open_corpus(&url).await.unwrap();
        let mut contents = String::new();
        reader.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "{\"id\":\"g1\",\"moves\":\"e4\"}\n");
    }

    #[tokio::test]
    async fn test_open_unreachable_url() {
        assert!(matches!(
            open_corpus("http://127.0.0.1:1/corpus.ndjson").await,
            Err(StreamError::Http(_))
        ));
    }
}
