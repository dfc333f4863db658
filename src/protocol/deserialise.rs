//! Decoding wire-format bytes into [`types`] values, including
//! pointer-compressed domain names (RFC 1035 §4.1.4).

use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::types::*;

/// A cursor over a byte slice, used to track position while decoding.
///
/// Unlike [`super::serialise::WritableBuffer`], this never owns its
/// bytes: a whole message is decoded from one borrowed slice, and
/// decoding a compressed name jumps the cursor backwards within that
/// same slice rather than reading from anywhere else.
#[derive(Debug, Clone, Copy)]
pub struct ConsumableBuffer<'a> {
    octets: &'a [u8],
    position: usize,
}

impl<'a> ConsumableBuffer<'a> {
    pub fn new(octets: &'a [u8]) -> Self {
        ConsumableBuffer { octets, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.octets.len().saturating_sub(self.position)
    }

    /// A cursor over the same bytes, repositioned at `position`.
    /// Used to follow a compression pointer.
    pub fn at_offset(&self, position: usize) -> Self {
        ConsumableBuffer {
            octets: self.octets,
            position,
        }
    }

    pub fn next_u8(&mut self) -> Result<u8, Error> {
        let octet = *self.octets.get(self.position).ok_or(Error::UnexpectedEof)?;
        self.position += 1;
        Ok(octet)
    }

    pub fn next_u16(&mut self) -> Result<u16, Error> {
        let hi = self.next_u8()?;
        let lo = self.next_u8()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn next_u32(&mut self) -> Result<u32, Error> {
        let a = self.next_u8()?;
        let b = self.next_u8()?;
        let c = self.next_u8()?;
        let d = self.next_u8()?;
        Ok(u32::from_be_bytes([a, b, c, d]))
    }

    pub fn next_i32(&mut self) -> Result<i32, Error> {
        Ok(self.next_u32()? as i32)
    }

    pub fn take(&mut self, size: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < size {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.octets[self.position..self.position + size];
        self.position += size;
        Ok(slice)
    }
}

/// Things that can go wrong decoding a message.
///
/// This is a flat, closed set: every variant names exactly one
/// decode-time failure, with no per-message identifier attached, since
/// the lower-level functions in this module (like
/// [`deserialise_domain_name`]) have no message to attribute a failure
/// to in the first place.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The buffer ran out of bytes before a fixed-size field (header,
    /// counts, a record's TYPE/CLASS/TTL/RDLENGTH, ...) was fully read.
    UnexpectedEof,

    /// A question's fields didn't fit in the bytes remaining after its
    /// name.
    QuestionTooShort,

    /// A resource record's fields didn't fit in the bytes remaining
    /// after its name.
    ResourceRecordTooShort,

    /// RDLENGTH said one thing but the cursor, after decoding RDATA,
    /// ended up somewhere else: either the record lied about its
    /// length, or this crate's RDATA decoder for that type is wrong.
    InvalidDataSize,

    /// A domain name was too long once fully expanded (including
    /// through any compression pointers it contains).
    DomainTooLong,

    /// A compression pointer did not point strictly backwards in the
    /// buffer. Only backward pointers are accepted, which rules out
    /// self-reference and forward-reference pointer loops by
    /// construction: each followed pointer strictly decreases the
    /// position a decoder could next visit.
    InvalidDomainPointer,

    /// A label's claimed length ran past the end of the buffer, or
    /// exceeded 63 octets.
    InvalidDomainLabel,

    /// A label, or a TXT character-string, was not valid UTF-8.
    UnicodeDecodingError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEof => write!(f, "unexpected end of buffer"),
            Error::QuestionTooShort => write!(f, "question is too short"),
            Error::ResourceRecordTooShort => write!(f, "resource record is too short"),
            Error::InvalidDataSize => write!(f, "RDLENGTH did not match the decoded RDATA size"),
            Error::DomainTooLong => write!(f, "domain name longer than {DOMAINNAME_MAX_LEN} octets"),
            Error::InvalidDomainPointer => write!(f, "compression pointer does not point backwards"),
            Error::InvalidDomainLabel => write!(f, "invalid domain name label"),
            Error::UnicodeDecodingError => write!(f, "invalid UTF-8"),
        }
    }
}

impl std::error::Error for Error {}

impl Message {
    pub fn from_octets(octets: &[u8]) -> Result<Self, Error> {
        let mut buffer = ConsumableBuffer::new(octets);
        Message::deserialise(&mut buffer)
    }

    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let wire_header = WireHeader::deserialise(buffer)?;

        let mut questions = Vec::with_capacity(wire_header.qdcount as usize);
        for _ in 0..wire_header.qdcount {
            questions.push(Question::deserialise(buffer)?);
        }

        let mut answers = Vec::with_capacity(wire_header.ancount as usize);
        for _ in 0..wire_header.ancount {
            answers.push(ResourceRecord::deserialise(buffer)?);
        }

        let mut authority = Vec::with_capacity(wire_header.nscount as usize);
        for _ in 0..wire_header.nscount {
            authority.push(ResourceRecord::deserialise(buffer)?);
        }

        let mut additional = Vec::with_capacity(wire_header.arcount as usize);
        for _ in 0..wire_header.arcount {
            additional.push(ResourceRecord::deserialise(buffer)?);
        }

        Ok(Message {
            header: wire_header.header,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

impl WireHeader {
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let id = buffer.next_u16()?;
        let octet1 = buffer.next_u8()?;
        let octet2 = buffer.next_u8()?;

        let header = Header {
            id,
            is_response: octet1 & HEADER_MASK_QR != 0,
            opcode: Opcode::from((octet1 & HEADER_MASK_OPCODE) >> HEADER_OFFSET_OPCODE),
            is_authoritative: octet1 & HEADER_MASK_AA != 0,
            is_truncated: octet1 & HEADER_MASK_TC != 0,
            recursion_desired: octet1 & HEADER_MASK_RD != 0,
            recursion_available: octet2 & HEADER_MASK_RA != 0,
            rcode: Rcode::from((octet2 & HEADER_MASK_RCODE) >> HEADER_OFFSET_RCODE),
        };

        Ok(WireHeader {
            header,
            qdcount: buffer.next_u16()?,
            ancount: buffer.next_u16()?,
            nscount: buffer.next_u16()?,
            arcount: buffer.next_u16()?,
        })
    }
}

impl Question {
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = deserialise_domain_name(buffer)?;
        if buffer.remaining() < 4 {
            return Err(Error::QuestionTooShort);
        }
        let qtype = RecordType::from(buffer.next_u16()?);
        let raw_class = buffer.next_u16()?;
        Ok(Question {
            name,
            qtype,
            unique: raw_class & CLASS_CACHE_FLUSH_BIT != 0,
            qclass: RecordClass::from(raw_class & !CLASS_CACHE_FLUSH_BIT),
        })
    }
}

impl ResourceRecord {
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = deserialise_domain_name(buffer)?;
        if buffer.remaining() < 10 {
            return Err(Error::ResourceRecordTooShort);
        }
        let rtype = RecordType::from(buffer.next_u16()?);
        let raw_class = buffer.next_u16()?;
        let unique = raw_class & CLASS_CACHE_FLUSH_BIT != 0;
        let rclass = RecordClass::from(raw_class & !CLASS_CACHE_FLUSH_BIT);
        let ttl = buffer.next_u32()?;
        let rdlength = buffer.next_u16()? as usize;

        let rdata_start = buffer.position();
        let rtype_with_data = deserialise_rdata(buffer, rtype, rdlength)?;
        let consumed = buffer.position() - rdata_start;
        if consumed != rdlength {
            return Err(Error::InvalidDataSize);
        }

        Ok(ResourceRecord {
            name,
            rtype_with_data,
            unique,
            rclass,
            ttl,
        })
    }
}

fn deserialise_rdata(
    buffer: &mut ConsumableBuffer,
    rtype: RecordType,
    rdlength: usize,
) -> Result<RecordTypeWithData, Error> {
    match rtype {
        RecordType::A => {
            let octets = buffer.take(4)?;
            Ok(RecordTypeWithData::A {
                address: Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]),
            })
        }
        RecordType::Aaaa => {
            let octets = buffer.take(16)?;
            let mut a = [0u8; 16];
            a.copy_from_slice(octets);
            Ok(RecordTypeWithData::Aaaa { address: Ipv6Addr::from(a) })
        }
        RecordType::Cname => Ok(RecordTypeWithData::Cname {
            cname: deserialise_domain_name(buffer)?,
        }),
        RecordType::Soa => {
            let mname = deserialise_domain_name(buffer)?;
            let rname = deserialise_domain_name(buffer)?;
            let serial = buffer.next_u32()?;
            let refresh = buffer.next_i32()?;
            let retry = buffer.next_i32()?;
            let expire = buffer.next_i32()?;
            let minimum = buffer.next_u32()?;
            Ok(RecordTypeWithData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            })
        }
        RecordType::Ptr => Ok(RecordTypeWithData::Ptr {
            ptrdname: deserialise_domain_name(buffer)?,
        }),
        RecordType::Txt => {
            let end = buffer.position() + rdlength;
            let mut pairs = BTreeMap::new();
            let mut free_form = Vec::new();
            while buffer.position() < end {
                let entry = deserialise_character_string(buffer)?;
                match entry.split_once('=') {
                    Some((key, value)) => {
                        pairs.insert(key.to_string(), value.to_string());
                    }
                    None => {
                        if !entry.is_empty() {
                            free_form.push(entry);
                        }
                    }
                }
            }
            Ok(RecordTypeWithData::Txt { pairs, free_form })
        }
        RecordType::Srv => {
            let priority = buffer.next_u16()?;
            let weight = buffer.next_u16()?;
            let port = buffer.next_u16()?;
            let target = deserialise_domain_name(buffer)?;
            Ok(RecordTypeWithData::Srv {
                priority,
                weight,
                port,
                target,
            })
        }
        RecordType::Unknown(code) => Ok(RecordTypeWithData::Unknown {
            rtype: code,
            octets: buffer.take(rdlength)?.to_vec(),
        }),
    }
}

fn deserialise_character_string(buffer: &mut ConsumableBuffer) -> Result<String, Error> {
    let len = buffer.next_u8()? as usize;
    let octets = buffer.take(len)?;
    String::from_utf8(octets.to_vec()).map_err(|_| Error::UnicodeDecodingError)
}

/// Decode a single domain name starting at the buffer's current
/// position, following compression pointers as needed, and leave the
/// cursor just past the name's own encoding (i.e. past the pointer, if
/// one was followed - not past whatever it pointed at).
///
/// This is the standalone entry point to the name decoder: it takes no
/// message-wide context beyond the buffer itself, since the only thing
/// a compression pointer needs is the bytes already seen.
pub fn deserialise_domain_name(buffer: &mut ConsumableBuffer) -> Result<DomainName, Error> {
    let mut labels: Vec<String> = Vec::new();
    let mut cursor = *buffer;
    let mut jumped = false;
    let mut total_len = 0usize;
    // Every pointer followed must point strictly before the lowest
    // position visited so far. Since each jump only goes backwards,
    // this bound only ever shrinks, which rules out cycles and
    // forward references without needing to track visited offsets.
    let mut limit = buffer.position();

    loop {
        let before = cursor.position();
        limit = limit.min(before);
        let len = cursor.next_u8()?;

        if len == 0 {
            if !jumped {
                buffer.position = cursor.position();
            }
            break;
        } else if len & POINTER_TAG == POINTER_TAG {
            let lo = cursor.next_u8()?;
            let pointer = (u16::from(len & !POINTER_TAG) << 8 | u16::from(lo)) as usize;
            if pointer >= limit {
                return Err(Error::InvalidDomainPointer);
            }
            if !jumped {
                buffer.position = cursor.position();
            }
            jumped = true;
            cursor = cursor.at_offset(pointer);
        } else if len & POINTER_TAG != 0 {
            return Err(Error::InvalidDomainLabel);
        } else {
            let len = len as usize;
            if len > LABEL_MAX_LEN {
                return Err(Error::InvalidDomainLabel);
            }
            let octets = cursor.take(len)?;
            let label = String::from_utf8(octets.to_vec()).map_err(|_| Error::UnicodeDecodingError)?;
            total_len += len + 1;
            if total_len > DOMAINNAME_MAX_LEN {
                return Err(Error::DomainTooLong);
            }
            labels.push(label);
        }
    }

    if labels.is_empty() {
        Ok(DomainName::root())
    } else {
        Ok(DomainName::from(format!("{}.", labels.join("."))))
    }
}
