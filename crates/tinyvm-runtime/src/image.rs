//! Binary image loading.

use tinyvm_isa::{Fault, Header, HEADER_LEN};

/// A loaded binary image: header plus the program region it addresses.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Parsed header fields.
    pub header: Header,
    /// Instructions followed by `.WORD` data, `[0, data_start)` is code.
    pub program: Vec<u8>,
}

impl Image {
    /// Parse a full image file: 16-byte header followed by program bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, Fault> {
        if bytes.len() < HEADER_LEN {
            tracing::error!(len = bytes.len(), "image shorter than the header");
            return Err(Fault::MalformedImage);
        }
        let header = Header::decode(bytes)?;
        let program = bytes[HEADER_LEN..].to_vec();
        if header.data_start as usize > program.len() {
            tracing::error!(
                data_start = header.data_start,
                program_len = program.len(),
                "data_start past end of program image"
            );
            return Err(Fault::MalformedImage);
        }
        tracing::debug!(mode = %header.mode, heap_initial = header.heap_initial, "loaded image");
        Ok(Self { header, program })
    }

    /// Byte offset one past the last instruction byte; `.WORD` data begins
    /// here and the program logically ends here for dispatch purposes.
    pub fn instr_end(&self) -> usize {
        self.header.data_start as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_image_shorter_than_the_header() {
        assert_eq!(Image::load(&[0u8; 4]), Err(Fault::MalformedImage));
    }

    #[test]
    fn rejects_a_data_start_past_the_program_end() {
        let mut bytes = vec![0u8; HEADER_LEN + 4];
        bytes[12..16].copy_from_slice(&100u32.to_le_bytes());
        assert_eq!(Image::load(&bytes), Err(Fault::MalformedImage));
    }

    #[test]
    fn loads_a_well_formed_empty_program() {
        let mut bytes = vec![0u8; HEADER_LEN + 1];
        bytes[12..16].copy_from_slice(&1u32.to_le_bytes());
        bytes[HEADER_LEN] = 0x01; // EXIT
        let image = Image::load(&bytes).unwrap();
        assert_eq!(image.instr_end(), 1);
    }
}
