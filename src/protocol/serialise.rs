//! Encoding [`types`] values into wire-format bytes, with
//! `.`-compressed domain names (RFC 1035 §4.1.4).

use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;

use super::types::*;

/// An expandable byte buffer, tracking the offsets at which complete
/// domain names have previously been written so that later names can
/// point back at them instead of repeating their labels.
///
/// The offset table is keyed on the dotted-string form of the name
/// that remains to encode at each suffix, e.g. writing
/// `"mail.example.com."` also remembers `"example.com."` and `"."` at
/// their respective offsets, so a later name sharing just the `com.`
/// suffix can still compress against it.
pub struct WritableBuffer {
    octets: Vec<u8>,
    name_offsets: HashMap<String, u16>,
}

impl WritableBuffer {
    pub fn new() -> Self {
        WritableBuffer {
            octets: Vec::new(),
            name_offsets: HashMap::new(),
        }
    }

    pub fn into_octets(self) -> Vec<u8> {
        self.octets
    }

    pub fn octets(&self) -> &[u8] {
        &self.octets
    }

    /// The offset the next byte written will land at.
    pub fn index(&self) -> usize {
        self.octets.len()
    }

    pub fn write_u8(&mut self, octet: u8) {
        self.octets.push(octet);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.octets.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.octets.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.octets.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_octets(&mut self, octets: &[u8]) {
        self.octets.extend_from_slice(octets);
    }

    /// Overwrite two already-written bytes at `index` - used to
    /// back-patch an RDLENGTH placeholder once the RDATA that follows
    /// it is known.
    pub fn patch_u16(&mut self, index: usize, value: u16) {
        self.octets[index..index + 2].copy_from_slice(&value.to_be_bytes());
    }

    /// Write `name`, compressed against any suffix of it already
    /// written to this buffer.
    ///
    /// Walks the name from its full form down to the root, looking
    /// each suffix up in the offset table. The first hit ends the
    /// label sequence with a two-byte pointer back to that offset. If
    /// nothing matches, every label is written literally and, for each
    /// non-root suffix not already known, recorded against the offset
    /// it started at - but only while that offset still fits in the
    /// pointer's 14 bits, since a suffix recorded at a now-unreachable
    /// offset could never be pointed at anyway.
    pub fn write_domain_name(&mut self, name: &DomainName) -> Result<(), Error> {
        let labels = name.labels();
        for i in 0..=labels.len() {
            let suffix = suffix_string(&labels, i);
            if let Some(&pointer) = self.name_offsets.get(&suffix) {
                let tagged = (u16::from(POINTER_TAG) << 8) | pointer;
                self.write_u16(tagged);
                return Ok(());
            }

            if i == labels.len() {
                // root: terminate with a zero-length label, nothing to
                // remember (the root has no offset worth pointing at).
                self.write_u8(0);
                return Ok(());
            }

            let offset = self.index();
            let label = labels[i];
            let label_octets = label.as_bytes();
            if label_octets.len() > LABEL_MAX_LEN {
                return Err(Error::LabelTooLong {
                    label: label.to_string(),
                });
            }
            if offset <= POINTER_OFFSET_MASK as usize {
                self.name_offsets.insert(suffix, offset as u16);
            }
            self.write_u8(usize_to_u8_len(label_octets.len())?);
            self.write_octets(label_octets);
        }
        Ok(())
    }
}

impl Default for WritableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn suffix_string(labels: &[&str], from: usize) -> String {
    if from == labels.len() {
        ".".to_string()
    } else {
        format!("{}.", labels[from..].join("."))
    }
}

fn usize_to_u8_len(n: usize) -> Result<u8, Error> {
    u8::try_from(n).map_err(|_| Error::CounterTooLarge { counter: n, bits: 8 })
}

fn usize_to_u16(n: usize) -> Result<u16, Error> {
    u16::try_from(n).map_err(|_| Error::CounterTooLarge { counter: n, bits: 16 })
}

/// Things that can go wrong while encoding a value to bytes. Unlike
/// decode errors, these are always programmer errors rather than
/// untrusted-input errors: they mean a section held more entries, or a
/// label was longer, than the wire format can represent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A count (number of questions/answers/etc, or a label length)
    /// didn't fit in the number of bits the wire format allows it.
    CounterTooLarge { counter: usize, bits: u32 },

    /// A label was longer than 63 octets.
    LabelTooLong { label: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CounterTooLarge { counter, bits } => {
                write!(f, "counter {counter} too large: does not fit in {bits} bits")
            }
            Error::LabelTooLong { label } => {
                write!(f, "label {label:?} is longer than {LABEL_MAX_LEN} octets")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Message {
    /// Serialise this message to a fresh byte vector.
    pub fn to_octets(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = WritableBuffer::new();
        self.serialise(&mut buffer)?;
        Ok(buffer.into_octets())
    }

    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        let wire_header = WireHeader {
            header: self.header,
            qdcount: usize_to_u16(self.questions.len())?,
            ancount: usize_to_u16(self.answers.len())?,
            nscount: usize_to_u16(self.authority.len())?,
            arcount: usize_to_u16(self.additional.len())?,
        };
        wire_header.serialise(buffer);

        for question in &self.questions {
            question.serialise(buffer)?;
        }
        for rr in &self.answers {
            rr.serialise(buffer)?;
        }
        for rr in &self.authority {
            rr.serialise(buffer)?;
        }
        for rr in &self.additional {
            rr.serialise(buffer)?;
        }
        Ok(())
    }
}

impl WireHeader {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.header.id);

        let mut octet1 = 0u8;
        if self.header.is_response {
            octet1 |= HEADER_MASK_QR;
        }
        octet1 |= (u8::from(self.header.opcode) << HEADER_OFFSET_OPCODE) & HEADER_MASK_OPCODE;
        if self.header.is_authoritative {
            octet1 |= HEADER_MASK_AA;
        }
        if self.header.is_truncated {
            octet1 |= HEADER_MASK_TC;
        }
        if self.header.recursion_desired {
            octet1 |= HEADER_MASK_RD;
        }
        buffer.write_u8(octet1);

        let mut octet2 = 0u8;
        if self.header.recursion_available {
            octet2 |= HEADER_MASK_RA;
        }
        octet2 |= (u8::from(self.header.rcode) << HEADER_OFFSET_RCODE) & HEADER_MASK_RCODE;
        buffer.write_u8(octet2);

        buffer.write_u16(self.qdcount);
        buffer.write_u16(self.ancount);
        buffer.write_u16(self.nscount);
        buffer.write_u16(self.arcount);
    }
}

impl Question {
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        buffer.write_domain_name(&self.name)?;
        buffer.write_u16(u16::from(self.qtype));
        let class = u16::from(self.qclass) | if self.unique { CLASS_CACHE_FLUSH_BIT } else { 0 };
        buffer.write_u16(class);
        Ok(())
    }
}

impl ResourceRecord {
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        buffer.write_domain_name(&self.name)?;
        buffer.write_u16(u16::from(self.rtype_with_data.rtype()));
        let class = u16::from(self.rclass) | if self.unique { CLASS_CACHE_FLUSH_BIT } else { 0 };
        buffer.write_u16(class);
        buffer.write_u32(self.ttl);

        let rdlength_index = buffer.index();
        buffer.write_u16(0); // placeholder, patched below
        let rdata_start = buffer.index();

        match &self.rtype_with_data {
            RecordTypeWithData::A { address } => {
                buffer.write_octets(&address.octets());
            }
            RecordTypeWithData::Aaaa { address } => {
                buffer.write_octets(&address.octets());
            }
            RecordTypeWithData::Cname { cname } => {
                buffer.write_domain_name(cname)?;
            }
            RecordTypeWithData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                buffer.write_domain_name(mname)?;
                buffer.write_domain_name(rname)?;
                buffer.write_u32(*serial);
                buffer.write_i32(*refresh);
                buffer.write_i32(*retry);
                buffer.write_i32(*expire);
                buffer.write_u32(*minimum);
            }
            RecordTypeWithData::Ptr { ptrdname } => {
                buffer.write_domain_name(ptrdname)?;
            }
            RecordTypeWithData::Txt { pairs, free_form } => {
                for (key, value) in pairs {
                    let entry = format!("{key}={value}");
                    write_character_string(buffer, entry.as_bytes())?;
                }
                for entry in free_form {
                    write_character_string(buffer, entry.as_bytes())?;
                }
                if pairs.is_empty() && free_form.is_empty() {
                    write_character_string(buffer, b"")?;
                }
            }
            RecordTypeWithData::Srv {
                priority,
                weight,
                port,
                target,
            } => {
                buffer.write_u16(*priority);
                buffer.write_u16(*weight);
                buffer.write_u16(*port);
                // SRV's target is not compressible per RFC 2782, but
                // accepting a compressed pointer on decode and never
                // emitting one here is simplest and always correct.
                buffer.write_domain_name(target)?;
            }
            RecordTypeWithData::Unknown { octets, .. } => {
                buffer.write_octets(octets);
            }
        }

        let rdlength = usize_to_u16(buffer.index() - rdata_start)?;
        buffer.patch_u16(rdlength_index, rdlength);
        Ok(())
    }
}

fn write_character_string(buffer: &mut WritableBuffer, octets: &[u8]) -> Result<(), Error> {
    buffer.write_u8(usize_to_u8_len(octets.len())?);
    buffer.write_octets(octets);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::types::test_util::*;
    use super::*;

    #[test]
    fn header_sets_counts_from_sections() {
        let message = Message {
            header: Header {
                id: 0x1234,
                is_response: true,
                opcode: Opcode::Standard,
                is_authoritative: true,
                is_truncated: false,
                recursion_desired: true,
                recursion_available: true,
                rcode: Rcode::NoError,
            },
            questions: Vec::new(),
            answers: vec![a_record("example.com.", "1.2.3.4".parse().unwrap())],
            authority: Vec::new(),
            additional: Vec::new(),
        };
        let octets = message.to_octets().unwrap();
        assert_eq!(&[0x00, 0x00], &octets[4..6], "qdcount");
        assert_eq!(&[0x00, 0x01], &octets[6..8], "ancount");
    }

    #[test]
    fn compresses_repeated_suffix() {
        let mut buffer = WritableBuffer::new();
        buffer.write_domain_name(&domain("a.example.com.")).unwrap();
        let first_len = buffer.index();
        buffer.write_domain_name(&domain("b.example.com.")).unwrap();
        let second_len = buffer.index() - first_len;
        // "b" label (2 bytes) + pointer (2 bytes), not a full repeat
        // of "example.com."'s labels.
        assert_eq!(4, second_len);
    }

    #[test]
    fn rdlength_matches_written_rdata() {
        let rr = a_record("example.com.", "1.2.3.4".parse().unwrap());
        let mut buffer = WritableBuffer::new();
        rr.serialise(&mut buffer).unwrap();
        let octets = buffer.into_octets();
        let rdlength_index = octets.len() - 6;
        let rdlength = u16::from_be_bytes([octets[rdlength_index], octets[rdlength_index + 1]]);
        assert_eq!(4, rdlength);
        assert_eq!(&[1, 2, 3, 4], &octets[rdlength_index + 2..]);
    }
}
