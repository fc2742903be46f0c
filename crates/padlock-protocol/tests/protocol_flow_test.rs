//! End-to-end protocol flow tests.
//!
//! Each test plays both sides of a command exchange: the client encodes and
//! encrypts a command, the "device" decrypts it, checks the layout and
//! answers with an encrypted response that the client decrypts and parses.

mod common;

use common::*;
use padlock_core::{LockState, Password, SessionToken};
use padlock_protocol::{Command, CommandCode, Frame, ResponseParser, ResponseTag};

const TOKEN: SessionToken = SessionToken::new([0x9A, 0x8B, 0x7C, 0x6D]);

/// Encrypt a command as the client would and recover it as the device would.
fn device_receives(command: Command) -> Frame {
    let cipher = test_cipher();
    let wire = cipher.encrypt(&command.encode().unwrap());
    assert_ne!(wire, command.encode().unwrap());
    cipher.decrypt(&wire)
}

/// Encrypt a device response and decrypt it on the client side.
fn client_receives(response: Frame) -> Frame {
    let cipher = test_cipher();
    let wire = cipher.encrypt(&response);
    let raw: Vec<u8> = wire.as_bytes().to_vec();
    cipher.decrypt(&Frame::from_slice(&raw).unwrap())
}

#[test]
fn test_unlock_flow() {
    // Token acquisition
    let request = device_receives(Command::ObtainToken);
    assert_eq!(&request.as_bytes()[..4], CommandCode::ObtainToken.header());
    let token = ResponseParser::token(&client_receives(token_response(TOKEN)));
    assert_eq!(token, TOKEN);

    // Unlock carries password then token
    let password = Password::new("246810").unwrap();
    let request = device_receives(Command::Unlock { token, password });
    assert_eq!(&request.as_bytes()[3..9], b"246810");
    assert_eq!(&request.as_bytes()[9..13], TOKEN.as_bytes());
    assert!(ResponseParser::unlock_accepted(&client_receives(
        unlock_response(0x00)
    )));

    // Battery
    let request = device_receives(Command::QueryBattery { token });
    assert_eq!(&request.as_bytes()[4..8], TOKEN.as_bytes());
    assert_eq!(
        ResponseParser::battery(&client_receives(battery_response(73))),
        Some(73)
    );
}

#[test]
fn test_lock_flow_with_verification() {
    let token = ResponseParser::token(&client_receives(token_response(TOKEN)));

    let request = device_receives(Command::Lock { token });
    assert_eq!(ResponseTag::of(&request), ResponseTag::Unrecognized(0x05, 0x0C));
    assert!(ResponseParser::lock_accepted(&client_receives(lock_response(
        0x00
    ))));

    let request = device_receives(Command::QueryLockState { token });
    assert_eq!(&request.as_bytes()[..4], &[0x05, 0x0E, 0x01, 0x01]);
    assert_eq!(
        ResponseParser::lock_state(&client_receives(lock_state_response(true))),
        LockState::Locked
    );
    assert_eq!(
        ResponseParser::lock_state(&client_receives(lock_state_response(false))),
        LockState::Unlocked
    );
}

#[test]
fn test_rejected_commands() {
    assert!(!ResponseParser::unlock_accepted(&client_receives(
        unlock_response(0x01)
    )));
    assert!(!ResponseParser::lock_accepted(&client_receives(
        lock_response(0x01)
    )));
}

#[test]
fn test_wrong_key_yields_unknown_answers() {
    let sender = test_cipher();
    let receiver = padlock_protocol::FrameCipher::new(&padlock_core::AesKey::from_bytes([0x42; 16]));

    let garbled = receiver.decrypt(&sender.encrypt(&lock_state_response(true)));
    assert_ne!(garbled, lock_state_response(true));
    assert_eq!(ResponseParser::battery(&garbled), None);
}

#[test]
fn test_non_frame_notifications_rejected() {
    assert!(Frame::from_slice(&[0u8; 15]).is_err());
    assert!(Frame::from_slice(&[0u8; 20]).is_err());
    assert!(Frame::from_slice(&[]).is_err());
}
