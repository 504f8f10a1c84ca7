// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client helper for talking to the spotlight hub over Unix sockets
//! (CBOR-framed commands and server messages).

use anyhow::Result;
use spotlight_proto::{
    wire::{decode_server, encode_command},
    Command, HelloPayload, Participant, ServerMessage,
};
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// Minimal async client over Unix sockets.
pub struct SessionClient {
    stream: UnixStream,
}

impl SessionClient {
    /// Connect to the hub at the given Unix socket path.
    pub async fn connect(path: &str) -> Result<Self> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self { stream })
    }

    /// Announce this connection's identity to the hub.
    pub async fn hello(&mut self, participant: Participant) -> Result<()> {
        self.send(&Command::Hello(HelloPayload { participant })).await
    }

    /// Send a single command without waiting for the acknowledgement.
    pub async fn send(&mut self, cmd: &Command) -> Result<()> {
        let pkt = encode_command(cmd, 0)?;
        self.stream.write_all(&pkt).await?;
        Ok(())
    }

    /// Send a command and wait for its acknowledgement (a reply or a status
    /// report), skipping any broadcasts that arrive in between.
    pub async fn request(&mut self, cmd: &Command) -> Result<ServerMessage> {
        self.send(cmd).await?;
        loop {
            match self.next_message().await? {
                Some(msg @ (ServerMessage::Reply(_) | ServerMessage::Status(_))) => {
                    return Ok(msg);
                }
                Some(_) => continue,
                None => anyhow::bail!("hub closed the connection before replying"),
            }
        }
    }

    /// Read a single message if available. Returns Ok(None) when the stream
    /// is closed before any bytes are read. Reads until a full frame header
    /// is buffered so short reads cannot desynchronize framing.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>> {
        let mut header = [0u8; 12];
        let mut read = 0usize;
        while read < header.len() {
            let n = self.stream.read(&mut header[read..]).await?;
            if n == 0 {
                if read == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "truncated frame header: read {} of {} bytes",
                        read,
                        header.len()
                    ),
                )
                .into());
            }
            read += n;
        }
        let len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]) as usize;
        let mut rest = vec![0u8; len + 32];
        self.stream.read_exact(&mut rest).await?;
        let mut packet = Vec::with_capacity(12 + len + 32);
        packet.extend_from_slice(&header);
        packet.extend_from_slice(&rest);
        let (msg, _ts, _) = decode_server(&packet)?;
        Ok(Some(msg))
    }

    /// Expose the underlying stream (e.g., for select!).
    pub fn stream(&mut self) -> &mut UnixStream {
        &mut self.stream
    }
}
