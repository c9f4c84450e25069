//! Base85 text-safe encoding (RFC 1924 alphabet).
//!
//! Base85 expands binary data by 5/4 instead of base64's 4/3, which is
//! why the compressed container body uses it. The alphabet and partial
//! final-group handling match Python's `base64.b85encode`, which produced
//! the containers this format originated from; archives are portable in
//! both directions.

use crate::{Error, Result};

const ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

/// Reverse lookup table, 0xFF for characters outside the alphabet.
fn decode_table() -> [u8; 256] {
    let mut table = [0xFFu8; 256];
    let mut i = 0;
    while i < 85 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

/// Encodes bytes as base85 text.
///
/// Every full 4-byte group becomes 5 characters; a final group of `n`
/// bytes (1-3) is zero-padded and emits `n + 1` characters.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(4) * 5);
    for chunk in data.chunks(4) {
        let mut group = [0u8; 4];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut acc = u32::from_be_bytes(group);

        let mut digits = [0u8; 5];
        for digit in digits.iter_mut().rev() {
            *digit = (acc % 85) as u8;
            acc /= 85;
        }
        for &digit in digits.iter().take(chunk.len() + 1) {
            out.push(ALPHABET[digit as usize] as char);
        }
    }
    out
}

/// Decodes base85 text back to bytes.
///
/// ASCII whitespace is skipped so that containers re-wrapped by editors
/// or pasted from a terminal still decode. A final group of `n`
/// characters (2-4) is padded with the maximum digit and truncated to
/// `n - 1` bytes, mirroring the encoder.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] on characters outside the alphabet,
/// a group that overflows 32 bits, or a trailing group of length 1.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    let table = decode_table();
    let mut digits: Vec<u8> = Vec::with_capacity(text.len());
    for &b in text.as_bytes() {
        if b.is_ascii_whitespace() {
            continue;
        }
        let digit = table[b as usize];
        if digit == 0xFF {
            return Err(Error::InvalidFormat(format!(
                "invalid base85 character {:?}",
                b as char
            )));
        }
        digits.push(digit);
    }

    let mut out = Vec::with_capacity(digits.len() / 5 * 4 + 3);
    for chunk in digits.chunks(5) {
        if chunk.len() == 1 {
            return Err(Error::InvalidFormat(
                "truncated base85 input (single trailing character)".into(),
            ));
        }
        let mut acc: u64 = 0;
        for i in 0..5 {
            let digit = chunk.get(i).copied().unwrap_or(84);
            acc = acc * 85 + u64::from(digit);
        }
        if acc > u64::from(u32::MAX) {
            return Err(Error::InvalidFormat("base85 group overflows".into()));
        }
        let bytes = (acc as u32).to_be_bytes();
        out.extend_from_slice(&bytes[..chunk.len() - 1]);
    }
    Ok(out)
}
