// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic framing and CBOR helpers for hub traffic.
//!
//! Packet layout:
//!
//! ``MAGIC(4) || VERSION(2) || FLAGS(2) || LENGTH(4) || PAYLOAD || CHECKSUM(32)``
//!
//! * PAYLOAD is a CBOR [`OpEnvelope`](crate::OpEnvelope)
//! * CHECKSUM = blake3-256 over HEADER (first 12 bytes) || PAYLOAD

use blake3::Hasher;
use ciborium::value::Value;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{Command, ComplimentPayload, HelloPayload, OpEnvelope, ServerMessage};

/// Protocol magic constant "SPT!".
pub const MAGIC: [u8; 4] = [0x53, 0x50, 0x54, 0x21];
/// Wire protocol version (big-endian u16).
pub const VERSION: u16 = 0x0001;
/// Reserved flags (set to zero for v1).
pub const FLAGS: u16 = 0x0000;

/// Framing/codec failure. Every variant maps to "drop this connection";
/// none of them is a session-level error.
#[derive(Debug, Error)]
pub enum WireError {
    /// Fewer bytes than a complete packet.
    #[error("incomplete packet")]
    Incomplete,
    /// First four bytes are not the protocol magic.
    #[error("bad magic")]
    BadMagic,
    /// Version field does not match this implementation.
    #[error("unsupported version {0:#06x}")]
    UnsupportedVersion(u16),
    /// blake3 checksum over header||payload does not match.
    #[error("checksum mismatch")]
    ChecksumMismatch,
    /// CBOR (de)serialization failure.
    #[error("cbor: {0}")]
    Cbor(String),
    /// Envelope names an operation this implementation does not know.
    #[error("unknown op {0}")]
    UnknownOp(String),
}

/// Encode to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).map_err(|e| WireError::Cbor(e.to_string()))?;
    Ok(buf)
}

/// Decode from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    ciborium::de::from_reader(bytes).map_err(|e| WireError::Cbor(e.to_string()))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, WireError> {
    Value::serialized(value).map_err(|e| WireError::Cbor(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, WireError> {
    value
        .deserialized()
        .map_err(|e| WireError::Cbor(e.to_string()))
}

/// A full packet (header + payload + checksum).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Raw header (12 bytes).
    pub header: [u8; 12],
    /// CBOR payload bytes.
    pub payload: Vec<u8>,
    /// blake3 checksum over header||payload.
    pub checksum: [u8; 32],
}

impl Packet {
    /// Build a packet from a CBOR payload.
    pub fn from_payload(payload: Vec<u8>) -> Self {
        let mut header = [0u8; 12];
        header[0..4].copy_from_slice(&MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_be_bytes());
        header[6..8].copy_from_slice(&FLAGS.to_be_bytes());
        header[8..12].copy_from_slice(&(payload.len() as u32).to_be_bytes());

        let mut hasher = Hasher::new();
        hasher.update(&header);
        hasher.update(&payload);
        let checksum = *hasher.finalize().as_bytes();

        Packet {
            header,
            payload,
            checksum,
        }
    }

    /// Encode an `OpEnvelope` into a full packet byte vector.
    pub fn encode_envelope<P: Serialize>(env: &OpEnvelope<P>) -> Result<Vec<u8>, WireError> {
        let payload = to_cbor(env)?;
        let packet = Packet::from_payload(payload);
        let mut out =
            Vec::with_capacity(packet.header.len() + packet.payload.len() + packet.checksum.len());
        out.extend_from_slice(&packet.header);
        out.extend_from_slice(&packet.payload);
        out.extend_from_slice(&packet.checksum);
        Ok(out)
    }

    /// Decode a packet from a byte slice, returning the envelope and bytes
    /// consumed.
    pub fn decode_envelope<P: DeserializeOwned>(
        bytes: &[u8],
    ) -> Result<(OpEnvelope<P>, usize), WireError> {
        if bytes.len() < 12 + 32 {
            return Err(WireError::Incomplete);
        }
        if bytes[0..4] != MAGIC {
            return Err(WireError::BadMagic);
        }
        let version = u16::from_be_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }
        let len = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        if bytes.len() < 12 + len + 32 {
            return Err(WireError::Incomplete);
        }
        let header = &bytes[0..12];
        let payload = &bytes[12..12 + len];
        let checksum = &bytes[12 + len..12 + len + 32];

        let mut hasher = Hasher::new();
        hasher.update(header);
        hasher.update(payload);
        let expect = hasher.finalize();
        if expect.as_bytes() != checksum {
            return Err(WireError::ChecksumMismatch);
        }

        let env: OpEnvelope<P> = from_cbor(payload)?;
        Ok((env, 12 + len + 32))
    }
}

/// Encode a client `Command` into a packet with the provided logical
/// timestamp.
pub fn encode_command(cmd: &Command, ts: u64) -> Result<Vec<u8>, WireError> {
    let (op, payload) = match cmd {
        Command::Hello(p) => ("hello", to_value(p)?),
        Command::OpenSession => ("open_session", Value::Null),
        Command::Claim => ("claim", Value::Null),
        Command::ClaimRandom => ("claim_random", Value::Null),
        Command::Compliment(p) => ("compliment", to_value(p)?),
        Command::OptIn => ("opt_in", Value::Null),
        Command::OptOut => ("opt_out", Value::Null),
        Command::CloseSession => ("close_session", Value::Null),
        Command::Reopen => ("reopen", Value::Null),
        Command::Status => ("status", Value::Null),
    };
    let env = OpEnvelope {
        op: op.to_string(),
        ts,
        payload,
    };
    Packet::encode_envelope(&env)
}

/// Decode bytes into (Command, ts, bytes_consumed).
pub fn decode_command(bytes: &[u8]) -> Result<(Command, u64, usize), WireError> {
    let (env, used) = Packet::decode_envelope::<Value>(bytes)?;
    let ts = env.ts;
    let cmd = match env.op.as_str() {
        "hello" => Command::Hello(from_value::<HelloPayload>(env.payload)?),
        "open_session" => Command::OpenSession,
        "claim" => Command::Claim,
        "claim_random" => Command::ClaimRandom,
        "compliment" => Command::Compliment(from_value::<ComplimentPayload>(env.payload)?),
        "opt_in" => Command::OptIn,
        "opt_out" => Command::OptOut,
        "close_session" => Command::CloseSession,
        "reopen" => Command::Reopen,
        "status" => Command::Status,
        other => return Err(WireError::UnknownOp(other.to_string())),
    };
    Ok((cmd, ts, used))
}

/// Encode a hub `ServerMessage` into a packet with the provided logical
/// timestamp.
pub fn encode_server(msg: &ServerMessage, ts: u64) -> Result<Vec<u8>, WireError> {
    let (op, payload) = match msg {
        ServerMessage::Reply(p) => ("reply", to_value(p)?),
        ServerMessage::Status(p) => ("status_report", to_value(p)?),
        ServerMessage::Notification(p) => ("notification", to_value(p)?),
        ServerMessage::Delivery(p) => ("delivery", to_value(p)?),
    };
    let env = OpEnvelope {
        op: op.to_string(),
        ts,
        payload,
    };
    Packet::encode_envelope(&env)
}

/// Decode bytes into (ServerMessage, ts, bytes_consumed).
pub fn decode_server(bytes: &[u8]) -> Result<(ServerMessage, u64, usize), WireError> {
    let (env, used) = Packet::decode_envelope::<Value>(bytes)?;
    let ts = env.ts;
    let msg = match env.op.as_str() {
        "reply" => ServerMessage::Reply(from_value(env.payload)?),
        "status_report" => ServerMessage::Status(from_value(env.payload)?),
        "notification" => ServerMessage::Notification(from_value(env.payload)?),
        "delivery" => ServerMessage::Delivery(from_value(env.payload)?),
        other => return Err(WireError::UnknownOp(other.to_string())),
    };
    Ok((msg, ts, used))
}

// --- Unit tests -----------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{AckStatus, Participant, ReplyPayload};

    #[test]
    fn reply_envelope_keeps_the_logical_timestamp() {
        let msg = ServerMessage::Reply(ReplyPayload::err("E_NO_OPEN_SESSION", "nothing open"));
        let bytes = encode_server(&msg, 42).unwrap();
        let (decoded, ts, used) = decode_server(&bytes).unwrap();
        assert_eq!(ts, 42);
        assert_eq!(used, bytes.len());
        match decoded {
            ServerMessage::Reply(r) => {
                assert_eq!(r.status, AckStatus::Error);
                assert_eq!(r.error.unwrap().name, "E_NO_OPEN_SESSION");
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn hello_carries_the_participant() {
        let cmd = Command::Hello(crate::HelloPayload {
            participant: Participant::new(7, "Avery"),
        });
        let bytes = encode_command(&cmd, 0).unwrap();
        let (decoded, _, _) = decode_command(&bytes).unwrap();
        assert_eq!(decoded, cmd);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode_command(&Command::Status, 0).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode_command(&bytes), Err(WireError::BadMagic)));
    }

    #[test]
    fn truncated_packet_is_incomplete() {
        let bytes = encode_command(&Command::Status, 0).unwrap();
        assert!(matches!(
            decode_command(&bytes[..bytes.len() - 1]),
            Err(WireError::Incomplete)
        ));
    }

    #[test]
    fn flipped_payload_fails_the_checksum() {
        let mut bytes = encode_command(&Command::Status, 0).unwrap();
        bytes[13] ^= 0xff;
        assert!(matches!(
            decode_command(&bytes),
            Err(WireError::ChecksumMismatch)
        ));
    }

    #[test]
    fn unknown_op_is_surfaced_by_name() {
        let env = OpEnvelope {
            op: "frobnicate".to_string(),
            ts: 1,
            payload: Value::Null,
        };
        let bytes = Packet::encode_envelope(&env).unwrap();
        match decode_command(&bytes) {
            Err(WireError::UnknownOp(op)) => assert_eq!(op, "frobnicate"),
            other => panic!("expected unknown op, got {other:?}"),
        }
    }
}
