//! The 16-byte image header that precedes every program's instruction
//! stream in a compiled binary.

use crate::fault::Fault;
use crate::mode::Mode;

/// Length in bytes of the header block at the start of a binary image.
pub const HEADER_LEN: usize = 16;

/// Parsed form of a binary image's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Which instruction set the image's program bytes use.
    pub mode: Mode,
    /// Heap size to allocate at startup, in bytes (the image stores KiB).
    pub heap_initial: u32,
    /// Ceiling the heap may grow to, in bytes (the image stores KiB).
    pub heap_max: u32,
    /// Byte offset, from the start of the program region, where `.WORD`
    /// data begins. Everything before it is instructions.
    pub data_start: u32,
}

impl Header {
    /// Decode a header from the first [`HEADER_LEN`] bytes of an image.
    pub fn decode(bytes: &[u8]) -> Result<Self, Fault> {
        if bytes.len() < HEADER_LEN {
            return Err(Fault::MalformedImage);
        }
        let mode_raw = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let mode = Mode::from_u32(mode_raw).ok_or(Fault::MalformedImage)?;
        let heap_initial = u32::from_le_bytes(bytes[4..8].try_into().unwrap())
            .checked_mul(1024)
            .ok_or(Fault::MalformedImage)?;
        let heap_max = u32::from_le_bytes(bytes[8..12].try_into().unwrap())
            .checked_mul(1024)
            .ok_or(Fault::MalformedImage)?;
        let data_start = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        if heap_max < heap_initial {
            return Err(Fault::MalformedImage);
        }
        Ok(Self {
            mode,
            heap_initial,
            heap_max,
            data_start,
        })
    }

    /// Encode this header back to its 16-byte wire form. Sizes are stored
    /// in KiB, truncating any sub-KiB remainder.
    pub fn encode(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.mode.as_u32().to_le_bytes());
        out[4..8].copy_from_slice(&(self.heap_initial / 1024).to_le_bytes());
        out[8..12].copy_from_slice(&(self.heap_max / 1024).to_le_bytes());
        out[12..16].copy_from_slice(&self.data_start.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_decode() {
        let header = Header {
            mode: Mode::Register,
            heap_initial: 64 * 1024,
            heap_max: 256 * 1024,
            data_start: 128,
        };
        let bytes = header.encode();
        assert_eq!(Header::decode(&bytes).unwrap(), header);
    }

    #[test]
    fn rejects_a_truncated_header() {
        assert_eq!(Header::decode(&[0u8; 8]), Err(Fault::MalformedImage));
    }

    #[test]
    fn rejects_an_unknown_mode() {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&7u32.to_le_bytes());
        assert_eq!(Header::decode(&bytes), Err(Fault::MalformedImage));
    }

    #[test]
    fn rejects_a_max_smaller_than_initial() {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[4..8].copy_from_slice(&16u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&8u32.to_le_bytes());
        assert_eq!(Header::decode(&bytes), Err(Fault::MalformedImage));
    }
}
