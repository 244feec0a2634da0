use super::types::*;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Newline-delimited JSON-RPC transport
pub struct Protocol<R, W> {
    reader: R,
    writer: W,
}

/// Outcome of reading one line from the transport
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    Malformed(String),
    Closed,
}

impl Protocol<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Protocol<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next non-empty line
    pub async fn read_request(&mut self) -> Result<Incoming> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(Incoming::Closed);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(match serde_json::from_str(trimmed) {
                Ok(request) => Incoming::Request(request),
                Err(e) => Incoming::Malformed(e.to_string()),
            });
        }
    }

    pub async fn send_response(&mut self, response: &JsonRpcResponse) -> Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

pub fn success_response<T: Serialize>(id: Value, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(result) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        },
        Err(e) => error_response(
            id,
            JsonRpcError {
                code: -32603,
                message: format!("Failed to serialize result: {}", e),
                data: None,
            },
        ),
    }
}

pub fn error_response(id: Value, error: JsonRpcError) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        id,
        result: None,
        error: Some(error),
    }
}
