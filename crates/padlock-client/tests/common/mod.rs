//! Shared test support: a protocol-level lock simulator on top of the mock
//! transport.
//!
//! The simulator decrypts every written frame with the shared key, answers
//! like the lock firmware does and encrypts the answer. Behaviour switches
//! let tests script refusals, silence, jams and noise.

#![allow(dead_code)]

use padlock_client::{ClientConfig, LockClient};
use padlock_core::{AesKey, DeviceAddress};
use padlock_protocol::{Frame, FrameCipher};
use padlock_transport::mock::{MockTransport, MockTransportHandle};
use std::sync::{Arc, Mutex};

pub const TEST_KEY_HEX: &str = "4a1f9c03d25e7b6680f4e2a19c3d5b70";
pub const TEST_ADDRESS: &str = "C8:47:8C:10:20:30";
pub const TEST_TOKEN: [u8; 4] = [0x3C, 0xA5, 0x19, 0x7E];
pub const TEST_PASSWORD: &str = "482915";

/// Mutable state of the simulated lock.
#[derive(Debug, Clone)]
pub struct SimState {
    pub token: [u8; 4],
    pub battery: u8,
    pub password: [u8; 6],
    pub locked: bool,
    /// Lock command reports success but the latch does not engage.
    pub jammed: bool,
    /// Request header (bytes 0 and 1) the lock never answers.
    pub silent_on: Option<[u8; 2]>,
    /// Request header answered with an unrecognised response.
    pub garbled_on: Option<[u8; 2]>,
    /// Send a short noise notification before each answer.
    pub noisy: bool,
    /// Every plaintext request received, in order.
    pub requests: Vec<Frame>,
}

impl Default for SimState {
    fn default() -> Self {
        let mut password = [0u8; 6];
        password.copy_from_slice(TEST_PASSWORD.as_bytes());
        Self {
            token: TEST_TOKEN,
            battery: 87,
            password,
            locked: true,
            jammed: false,
            silent_on: None,
            garbled_on: None,
            noisy: false,
            requests: Vec::new(),
        }
    }
}

impl SimState {
    fn answer(&mut self, request: &Frame) -> Option<[u8; 16]> {
        let bytes = request.as_bytes();
        let header = [bytes[0], bytes[1]];
        self.requests.push(*request);

        if self.silent_on == Some(header) {
            return None;
        }
        if self.garbled_on == Some(header) {
            return Some(padded(&[0x7F, 0x7F, 0x01, 0x01]));
        }

        let token = self.token;
        let token_ok = |offset: usize| bytes[offset..offset + 4] == token;
        let answer = match header {
            [0x06, 0x01] => {
                let t = self.token;
                padded(&[0x06, 0x02, 0x01, t[0], t[1], t[2], t[3]])
            }
            [0x02, 0x01] => padded(&[0x02, 0x02, 0x01, self.battery]),
            [0x05, 0x0C] => {
                if token_ok(4) {
                    if !self.jammed {
                        self.locked = true;
                    }
                    padded(&[0x05, 0x0D, 0x01, 0x00])
                } else {
                    padded(&[0x05, 0x0D, 0x01, 0x01])
                }
            }
            [0x05, 0x01] => {
                if token_ok(9) && bytes[3..9] == self.password {
                    self.locked = false;
                    padded(&[0x05, 0x02, 0x01, 0x00])
                } else {
                    padded(&[0x05, 0x02, 0x01, 0x01])
                }
            }
            [0x05, 0x0E] => padded(&[0x05, 0x0F, 0x01, u8::from(self.locked)]),
            _ => return None,
        };
        Some(answer)
    }
}

fn padded(head: &[u8]) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[..head.len()].copy_from_slice(head);
    bytes
}

pub fn test_key() -> AesKey {
    AesKey::from_hex(TEST_KEY_HEX).expect("Test helper: invalid key")
}

pub fn test_address() -> DeviceAddress {
    DeviceAddress::new(TEST_ADDRESS).expect("Test helper: invalid address")
}

/// A client wired to a simulated lock.
pub struct Harness {
    pub client: LockClient<MockTransport>,
    pub handle: MockTransportHandle,
    pub sim: Arc<Mutex<SimState>>,
}

impl Harness {
    pub async fn new(state: SimState) -> Self {
        let (transport, handle) = MockTransport::new();
        let sim = Arc::new(Mutex::new(state));

        let cipher = FrameCipher::new(&test_key());
        let responder_sim = sim.clone();
        handle
            .set_responder(move |value: &[u8]| {
                let Ok(sealed) = Frame::from_slice(value) else {
                    return Vec::new();
                };
                let request = cipher.decrypt(&sealed);
                let mut sim = responder_sim.lock().unwrap();

                let mut out = Vec::new();
                if sim.noisy {
                    out.push(vec![0xAB; 7]);
                }
                if let Some(answer) = sim.answer(&request) {
                    out.push(cipher.encrypt(&Frame::new(answer)).as_bytes().to_vec());
                }
                out
            })
            .await;

        let client = LockClient::new(transport, ClientConfig::new(TEST_KEY_HEX))
            .expect("Test helper: client construction failed");

        Self {
            client,
            handle,
            sim,
        }
    }

    pub async fn with_defaults() -> Self {
        Self::new(SimState::default()).await
    }

    pub fn state(&self) -> SimState {
        self.sim.lock().unwrap().clone()
    }

    /// Assert every opened link was released exactly once.
    pub async fn assert_balanced(&self) {
        assert_eq!(
            self.handle.connect_count().await,
            self.handle.disconnect_count().await,
            "connect/disconnect mismatch"
        );
    }
}
