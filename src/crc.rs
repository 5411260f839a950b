/// CRC-8/MAXIM generator polynomial, x^8 + x^5 + x^4 + 1.
pub const POLYNOMIAL: u8 = 0x31;
/// Accumulator seed.
pub const INIT: u8 = 0xFF;

/// Number of leading frame bytes covered by the checksum.
pub(crate) const FRAME_PAYLOAD_LEN: usize = 6;

/// Computes the CRC-8 (poly 0x31, init 0xFF, no reflection, no final xor)
/// over `data`.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = INIT;
    for byte in data.iter().copied() {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 == 0 {
                crc <<= 1;
            } else {
                crc = (crc << 1) ^ POLYNOMIAL;
            }
        }
    }
    crc
}

/// Checksum of a 7-byte sensor frame: only the first six bytes are covered,
/// the seventh is the transmitted CRC.
pub(crate) fn frame_crc(frame: &[u8; 7]) -> u8 {
    crc8(&frame[..FRAME_PAYLOAD_LEN])
}
