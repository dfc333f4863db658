//! Minimal hex (de)serialisation, used only by unit tests to keep
//! literal wire fixtures readable as hex strings instead of byte-array
//! literals.

pub fn from_hex(s: &str) -> Vec<u8> {
    assert!(s.len() % 2 == 0, "hex string must have an even length");
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).expect("invalid hex digit"))
        .collect()
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let bytes = vec![0x11, 0xb1, 0x80, 0x03, 0x00, 0x00];
        assert_eq!(bytes, from_hex(&to_hex(&bytes)));
    }

    #[test]
    fn known_value() {
        assert_eq!(vec![0xde, 0xad, 0xbe, 0xef], from_hex("deadbeef"));
        assert_eq!("deadbeef", to_hex(&[0xde, 0xad, 0xbe, 0xef]));
    }
}
