//! Status frame for off-device transports
//!
//! BLE notifies each value through its own characteristic, but serial and
//! log transports want the whole classification in one error-checked frame.
//! The frame is five bytes: state code, three flag bytes, XOR checksum.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::types::{MotionState, StatusUpdate};

/// Compute the XOR checksum over a byte run.
#[must_use]
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &b| acc ^ b)
}

/// One classification result framed for the wire.
///
/// Layout:
/// - 1 byte: motion state code (0-3)
/// - 1 byte: tremor flag (0/1)
/// - 1 byte: dyskinesia flag (0/1)
/// - 1 byte: FOG flag (0/1)
/// - 1 byte: XOR checksum of the four value bytes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPacket {
    /// Encoded motion state
    pub state: MotionState,
    /// Tremor flag
    pub tremor: bool,
    /// Dyskinesia flag
    pub dyskinesia: bool,
    /// FOG event flag
    pub fog: bool,
}

impl StatusPacket {
    /// Serialized size in bytes.
    pub const SIZE: usize = 5;

    /// Serialize to the wire layout.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [
            self.state.code(),
            u8::from(self.tremor),
            u8::from(self.dyskinesia),
            u8::from(self.fog),
            0,
        ];
        bytes[4] = xor_checksum(&bytes[..4]);
        bytes
    }

    /// Parse from the wire layout.
    ///
    /// Flag bytes are normalized (any nonzero byte reads as set); the state
    /// byte is strict.
    ///
    /// # Errors
    ///
    /// Returns an error when the slice is too short, the checksum does not
    /// match, or the state code is outside 0-3.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < Self::SIZE {
            return Err(ProtocolError::ShortPacket {
                received: bytes.len(),
                expected: Self::SIZE,
            });
        }
        let expected = xor_checksum(&bytes[..4]);
        if bytes[4] != expected {
            return Err(ProtocolError::ChecksumMismatch { expected, computed: bytes[4] });
        }
        let state = MotionState::from_code(bytes[0])
            .ok_or(ProtocolError::InvalidState { code: bytes[0] })?;
        Ok(Self {
            state,
            tremor: bytes[1] != 0,
            dyskinesia: bytes[2] != 0,
            fog: bytes[3] != 0,
        })
    }

    /// The update this packet carries.
    #[inline]
    #[must_use]
    pub const fn update(&self) -> StatusUpdate {
        StatusUpdate {
            state: self.state,
            tremor: self.tremor,
            dyskinesia: self.dyskinesia,
            fog: self.fog,
        }
    }
}

impl From<StatusUpdate> for StatusPacket {
    fn from(update: StatusUpdate) -> Self {
        Self {
            state: update.state,
            tremor: update.tremor,
            dyskinesia: update.dyskinesia,
            fog: update.fog,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusPacket {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StatusPacket({} t:{} d:{} f:{})",
            self.state,
            self.tremor,
            self.dyskinesia,
            self.fog
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
