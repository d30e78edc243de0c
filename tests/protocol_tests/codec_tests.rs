//! Codec Tests
//!
//! Tests for command and response encoding/decoding.

use std::io::Cursor;

use leasekv::protocol::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, Command, Response, Status, HEADER_SIZE,
    MAX_PAYLOAD_SIZE,
};
use leasekv::{LeaseError, Value};

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_setnx() {
    let cmd = Command::SetNx {
        key: "lock_order".to_string(),
        value: "1760781234567".to_string(),
    };
    let encoded = encode_command(&cmd).unwrap();
    assert_eq!(encoded[0], 0x01);

    let decoded = decode_command(&encoded).unwrap();
    assert_eq!(decoded, cmd);
}

#[test]
fn test_encode_decode_eval() {
    let cmd = Command::Eval {
        script: "fixed_window_limit".to_string(),
        keys: vec!["ip:1760781234".to_string()],
        args: vec!["10".to_string(), "2".to_string()],
    };
    let encoded = encode_command(&cmd).unwrap();
    assert_eq!(encoded[0], 0x09);

    match decode_command(&encoded).unwrap() {
        Command::Eval { script, keys, args } => {
            assert_eq!(script, "fixed_window_limit");
            assert_eq!(keys, vec!["ip:1760781234"]);
            assert_eq!(args, vec!["10", "2"]);
        }
        other => panic!("Expected EVAL command, got {:?}", other),
    }
}

#[test]
fn test_header_length_matches_payload() {
    let cmd = Command::Get {
        key: "k".to_string(),
    };
    let encoded = encode_command(&cmd).unwrap();
    let len = u32::from_be_bytes([encoded[1], encoded[2], encoded[3], encoded[4]]) as usize;
    assert_eq!(encoded.len(), HEADER_SIZE + len);
}

#[test]
fn test_decode_unknown_command_type() {
    let mut encoded = encode_command(&Command::Ping).unwrap();
    encoded[0] = 0xEE;

    let err = decode_command(&encoded).unwrap_err();
    assert!(matches!(err, LeaseError::Protocol(_)));
}

#[test]
fn test_decode_header_payload_mismatch() {
    let mut encoded = encode_command(&Command::Delete {
        key: "k".to_string(),
    })
    .unwrap();
    // Claim it is a GET
    encoded[0] = 0x03;

    assert!(matches!(
        decode_command(&encoded),
        Err(LeaseError::Protocol(_))
    ));
}

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(
        decode_command(&[0x01, 0x00]),
        Err(LeaseError::Protocol(_))
    ));
}

#[test]
fn test_decode_incomplete_payload() {
    let encoded = encode_command(&Command::Incr {
        key: "counter".to_string(),
    })
    .unwrap();
    let truncated = &encoded[..encoded.len() - 2];

    assert!(matches!(
        decode_command(truncated),
        Err(LeaseError::Protocol(_))
    ));
}

#[test]
fn test_decode_payload_too_large() {
    let mut bytes = vec![0x0A];
    bytes.extend_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_be_bytes());

    assert!(matches!(
        decode_command(&bytes),
        Err(LeaseError::Protocol(_))
    ));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_ok_carries_value() {
    let response = Response::ok(&Value::Int(1)).unwrap();
    let decoded = decode_response(&encode_response(&response)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.into_value().unwrap(), Value::Int(1));
}

#[test]
fn test_response_nil_becomes_not_found() {
    let response = Response::from_value(&Value::Nil).unwrap();
    assert_eq!(response.status, Status::NotFound);

    let decoded = decode_response(&encode_response(&response)).unwrap();
    assert_eq!(decoded.payload, None);
    assert_eq!(decoded.into_value().unwrap(), Value::Nil);
}

#[test]
fn test_response_error_surfaces_message() {
    let response = Response::error("Unknown script: nope");
    let decoded = decode_response(&encode_response(&response)).unwrap();

    match decoded.into_value() {
        Err(LeaseError::Store(msg)) => assert_eq!(msg, "Unknown script: nope"),
        other => panic!("Expected store error, got {:?}", other),
    }
}

#[test]
fn test_decode_unknown_status() {
    let bytes = [0x07, 0, 0, 0, 0];
    assert!(matches!(
        decode_response(&bytes),
        Err(LeaseError::Protocol(_))
    ));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_command_sequence() {
    let commands = vec![
        Command::SetNxEx {
            key: "a".to_string(),
            value: "1".to_string(),
            ttl_secs: 5,
        },
        Command::Ttl {
            key: "a".to_string(),
        },
        Command::Ping,
    ];

    let mut buffer = Vec::new();
    for cmd in &commands {
        write_command(&mut buffer, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), expected);
    }

    // Nothing left
    assert!(matches!(
        read_command(&mut cursor),
        Err(LeaseError::Io(_))
    ));
}

#[test]
fn test_stream_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::ok(&Value::Text("PONG".into())).unwrap()).unwrap();
    write_response(&mut buffer, &Response::not_found()).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(
        read_response(&mut cursor).unwrap().into_value().unwrap(),
        Value::Text("PONG".to_string())
    );
    assert_eq!(read_response(&mut cursor).unwrap().status, Status::NotFound);
}
