//! Plain data types for DNS messages, questions, and resource records.
//!
//! See the `serialise` and `deserialise` modules for how these are
//! turned into, and read back from, wire bytes.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Maximum length of a single label, in octets (RFC 1035 §2.3.4).
pub const LABEL_MAX_LEN: usize = 63;

/// Maximum length of a whole domain name, in wire octets, including
/// the length-prefix bytes (RFC 1035 §2.3.4).
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// The two top bits of a label length byte, when both set, mark the
/// byte as the first half of a compression pointer rather than a
/// label length.
pub const POINTER_TAG: u8 = 0b1100_0000;

/// Mask for the 14-bit offset carried by a compression pointer.
pub const POINTER_OFFSET_MASK: u16 = 0x3FFF;

/// The mDNS cache-flush bit / unicast-response bit: the high bit of a
/// resource record's or question's class field.
pub const CLASS_CACHE_FLUSH_BIT: u16 = 0x8000;

// Header flag masks/offsets, within the 16-bit flags word:
// QR(1) | OPCODE(4) | AA(1) | TC(1) | RD(1) | RA(1) | Z(3)=0 | RCODE(4)
pub(crate) const HEADER_MASK_QR: u8 = 0b1000_0000;
pub(crate) const HEADER_MASK_OPCODE: u8 = 0b0111_1000;
pub(crate) const HEADER_OFFSET_OPCODE: u8 = 3;
pub(crate) const HEADER_MASK_AA: u8 = 0b0000_0100;
pub(crate) const HEADER_MASK_TC: u8 = 0b0000_0010;
pub(crate) const HEADER_MASK_RD: u8 = 0b0000_0001;
pub(crate) const HEADER_MASK_RA: u8 = 0b1000_0000;
pub(crate) const HEADER_MASK_RCODE: u8 = 0b0000_1111;
pub(crate) const HEADER_OFFSET_RCODE: u8 = 0;

/// A DNS message: a header plus four ordered sections.
///
/// ```text
///     +---------------------+
///     |        Header       |
///     +---------------------+
///     |       Question      | the question for the name server
///     +---------------------+
///     |        Answer       | RRs answering the question
///     +---------------------+
///     |      Authority      | RRs pointing toward an authority
///     +---------------------+
///     |      Additional     | RRs holding additional information
///     +---------------------+
/// ```
///
/// See section 4.1 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    /// Build the empty response shell to a query: same id and opcode,
    /// the standard `RD` carried over, `RA` set, no sections filled in.
    pub fn make_response(&self) -> Self {
        Self {
            header: Header {
                id: self.header.id,
                is_response: true,
                opcode: self.header.opcode,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: self.header.recursion_desired,
                recursion_available: true,
                rcode: Rcode::NoError,
            },
            questions: self.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// A single-question query with a fresh id.
    pub fn from_question(id: u16, question: Question) -> Self {
        Self {
            header: Header {
                id,
                is_response: false,
                opcode: Opcode::Standard,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: false,
                recursion_available: false,
                rcode: Rcode::NoError,
            },
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }
}

/// Common header type for all messages.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      ID                       |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    QDCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ANCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    NSCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ARCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.1 of RFC 1035. The four count fields are not stored
/// here: they're derived from the section lengths at serialise time,
/// so there is no way to construct a `Message` with counts that lie
/// about its own sections. See [`WireHeader`] for the form that does
/// carry them, used only during (de)serialisation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Header {
    /// A 16 bit identifier assigned by the program that generates any
    /// kind of query. This identifier is copied into the corresponding
    /// reply and can be used by the requester to match up replies to
    /// outstanding queries.
    pub id: u16,

    /// A one bit field that specifies whether this message is a query
    /// (false), or a response (true).
    pub is_response: bool,

    /// A four bit field that specifies the kind of query in this
    /// message. Values outside the named set are preserved, not
    /// rejected: see [`Opcode::Reserved`].
    pub opcode: Opcode,

    /// Authoritative Answer - valid in responses; specifies that the
    /// responding name server is an authority for the domain name in
    /// the question section.
    pub is_authoritative: bool,

    /// TrunCation - this message was truncated due to length greater
    /// than that permitted on the transmission channel.
    pub is_truncated: bool,

    /// Recursion Desired - may be set in a query, copied into the
    /// response. Directs the name server to pursue the query
    /// recursively, if it supports that.
    pub recursion_desired: bool,

    /// Recursion Available - set or cleared in a response; denotes
    /// whether recursive query support is available in the name
    /// server.
    pub recursion_available: bool,

    /// Response code. Values outside the named set are preserved, not
    /// rejected: see [`Rcode::Reserved`].
    pub rcode: Rcode,
}

/// A [`Header`] plus the four section counts, as they appear on the
/// wire. Kept separate from `Header` so that a `Message`'s counts can
/// never drift from the length of its sections - only `serialise`
/// computes a `WireHeader`, and only `deserialise` produces one to
/// read from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct WireHeader {
    pub header: Header,

    /// Number of entries in the question section.
    pub qdcount: u16,

    /// Number of resource records in the answer section.
    pub ancount: u16,

    /// Number of resource records in the authority section.
    pub nscount: u16,

    /// Number of resource records in the additional section.
    pub arcount: u16,
}

/// A single entry in the question section.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                     QNAME                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QTYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QCLASS                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.2 of RFC 1035. The high bit of QCLASS is not part
/// of the class value: mDNS/DNS-SD reuse it to mean "unicast response
/// requested", surfaced here as `unique`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Question {
    pub name: DomainName,
    pub qtype: RecordType,

    /// The high bit of the class field: "unicast response requested"
    /// in mDNS queries.
    pub unique: bool,
    pub qclass: RecordClass,
}

/// A single entry in the answer, authority, or additional section.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                                               /
///     /                      NAME                     /
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--|
///     /                     RDATA                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.3 of RFC 1035. The high bit of CLASS is not part of
/// the class value: mDNS reuses it as the "cache flush" bit, surfaced
/// here as `unique`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct ResourceRecord {
    pub name: DomainName,

    /// The RTYPE and RDATA fields, combined: the variant determines
    /// the wire type code, so there is no way to construct a record
    /// whose type tag disagrees with its data.
    pub rtype_with_data: RecordTypeWithData,

    /// The mDNS cache-flush bit: the high bit of the wire class field.
    pub unique: bool,
    pub rclass: RecordClass,

    /// Seconds the record may be cached before it should be discarded.
    /// Zero means "don't cache; valid only for this transaction".
    pub ttl: u32,
}

impl ResourceRecord {
    /// Build an A record.
    pub fn new_a(name: DomainName, ttl: u32, address: Ipv4Addr) -> Self {
        Self::new(name, ttl, RecordTypeWithData::A { address })
    }

    /// Build an AAAA record.
    pub fn new_aaaa(name: DomainName, ttl: u32, address: Ipv6Addr) -> Self {
        Self::new(name, ttl, RecordTypeWithData::Aaaa { address })
    }

    /// Build a CNAME record.
    pub fn new_cname(name: DomainName, ttl: u32, cname: DomainName) -> Self {
        Self::new(name, ttl, RecordTypeWithData::Cname { cname })
    }

    /// Build a PTR record.
    pub fn new_ptr(name: DomainName, ttl: u32, ptrdname: DomainName) -> Self {
        Self::new(name, ttl, RecordTypeWithData::Ptr { ptrdname })
    }

    /// Build an SOA record.
    #[allow(clippy::too_many_arguments)]
    pub fn new_soa(
        name: DomainName,
        ttl: u32,
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: i32,
        retry: i32,
        expire: i32,
        minimum: u32,
    ) -> Self {
        Self::new(
            name,
            ttl,
            RecordTypeWithData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            },
        )
    }

    /// Build a TXT record from a key/value map and a free-form list of
    /// entries that didn't contain an `=`.
    pub fn new_txt(
        name: DomainName,
        ttl: u32,
        pairs: std::collections::BTreeMap<String, String>,
        free_form: Vec<String>,
    ) -> Self {
        Self::new(name, ttl, RecordTypeWithData::Txt { pairs, free_form })
    }

    /// Build an SRV record.
    pub fn new_srv(name: DomainName, ttl: u32, priority: u16, weight: u16, port: u16, target: DomainName) -> Self {
        Self::new(
            name,
            ttl,
            RecordTypeWithData::Srv {
                priority,
                weight,
                port,
                target,
            },
        )
    }

    /// Build an opaque record of an RR type this crate doesn't
    /// interpret, preserving its raw RDATA bytes verbatim.
    pub fn new_opaque(name: DomainName, ttl: u32, rtype: u16, octets: Vec<u8>) -> Self {
        Self::new(name, ttl, RecordTypeWithData::Unknown { rtype, octets })
    }

    fn new(name: DomainName, ttl: u32, rtype_with_data: RecordTypeWithData) -> Self {
        Self {
            name,
            rtype_with_data,
            unique: false,
            rclass: RecordClass::IN,
            ttl,
        }
    }

    /// Mark this record with the mDNS cache-flush bit set.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set this record's class (defaults to IN).
    #[must_use]
    pub fn with_class(mut self, rclass: RecordClass) -> Self {
        self.rclass = rclass;
        self
    }
}

/// A record type with its associated, already-decoded RDATA.
///
/// This is the tagged union at the heart of the typed record model:
/// the variant a value holds is the single source of truth for its
/// wire type code (see [`RecordTypeWithData::rtype`]), so encode and
/// decode can never disagree about which kind of record this is.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RecordTypeWithData {
    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    ADDRESS                    |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// A 32 bit IPv4 address.
    A { address: Ipv4Addr },

    /// The 128 bit IPv6 equivalent of `A`.
    Aaaa { address: Ipv6Addr },

    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                     CNAME                     /
    ///     /                                               /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// `cname` is the canonical name for the owner; the owner name is
    /// an alias.
    Cname { cname: DomainName },

    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                     MNAME                     /
    ///     /                                               /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                     RNAME                     /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    SERIAL                     |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    REFRESH                    |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                     RETRY                     |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    EXPIRE                     |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    MINIMUM                    |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// `mname` is the primary source nameserver for the zone; `rname`
    /// is the mailbox of the person responsible for it. `serial` wraps
    /// and should be compared with sequence-space arithmetic. The rest
    /// are all time intervals in seconds.
    Soa {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: i32,
        retry: i32,
        expire: i32,
        minimum: u32,
    },

    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                   PTRDNAME                    /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// `ptrdname` points to some other location in the domain name
    /// space (the DNS-SD/mDNS browsing workhorse).
    Ptr { ptrdname: DomainName },

    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                   TXT-DATA                    /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// One or more length-prefixed character strings. Entries
    /// containing `=` are split on the first `=` into `pairs`;
    /// entries without one accumulate into `free_form`.
    Txt {
        pairs: std::collections::BTreeMap<String, String>,
        free_form: Vec<String>,
    },

    /// ```text
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                   PRIORITY                    |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                    WEIGHT                      |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     |                     PORT                       |
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    ///     /                    TARGET                      /
    ///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
    /// ```
    /// Service location, as used by DNS-SD (RFC 2782).
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: DomainName,
    },

    /// Any record of a type this crate does not interpret. The raw
    /// RDATA bytes are preserved exactly, and `rtype` remembers the
    /// wire type code so re-encoding reproduces the original TYPE
    /// field.
    Unknown { rtype: u16, octets: Vec<u8> },
}

impl RecordTypeWithData {
    /// The wire type code this value would be/was encoded with.
    pub fn rtype(&self) -> RecordType {
        match self {
            RecordTypeWithData::A { .. } => RecordType::A,
            RecordTypeWithData::Aaaa { .. } => RecordType::Aaaa,
            RecordTypeWithData::Cname { .. } => RecordType::Cname,
            RecordTypeWithData::Soa { .. } => RecordType::Soa,
            RecordTypeWithData::Ptr { .. } => RecordType::Ptr,
            RecordTypeWithData::Txt { .. } => RecordType::Txt,
            RecordTypeWithData::Srv { .. } => RecordType::Srv,
            RecordTypeWithData::Unknown { rtype, .. } => RecordType::Unknown(*rtype),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.rtype().is_unknown()
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordTypeWithData {
    // Written out by hand, rather than derived, so the max size of the
    // `Vec<u8>`/maps stays bounded without a wrapper type.
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=128)?;
        let octets = Vec::from(u.bytes(len)?);

        let rtype_with_data = match u.arbitrary::<RecordType>()? {
            RecordType::A => RecordTypeWithData::A {
                address: u.arbitrary()?,
            },
            RecordType::Aaaa => RecordTypeWithData::Aaaa {
                address: u.arbitrary()?,
            },
            RecordType::Cname => RecordTypeWithData::Cname {
                cname: u.arbitrary()?,
            },
            RecordType::Soa => RecordTypeWithData::Soa {
                mname: u.arbitrary()?,
                rname: u.arbitrary()?,
                serial: u.arbitrary()?,
                refresh: u.arbitrary()?,
                retry: u.arbitrary()?,
                expire: u.arbitrary()?,
                minimum: u.arbitrary()?,
            },
            RecordType::Ptr => RecordTypeWithData::Ptr {
                ptrdname: u.arbitrary()?,
            },
            RecordType::Txt => {
                let num_pairs = u.int_in_range(0..=4)?;
                let mut pairs = std::collections::BTreeMap::new();
                for _ in 0..num_pairs {
                    let klen = u.int_in_range(1..=8)?;
                    let vlen = u.int_in_range(0..=8)?;
                    let key: String = (0..klen)
                        .map(|_| u.int_in_range(b'a'..=b'z').map(char::from))
                        .collect::<arbitrary::Result<_>>()?;
                    let value: String = (0..vlen)
                        .map(|_| u.int_in_range(b'a'..=b'z').map(char::from))
                        .collect::<arbitrary::Result<_>>()?;
                    pairs.insert(key, value);
                }
                let num_free = u.int_in_range(0..=4)?;
                let mut free_form = Vec::new();
                for _ in 0..num_free {
                    let flen = u.int_in_range(1..=8)?;
                    let value: String = (0..flen)
                        .map(|_| u.int_in_range(b'a'..=b'z').map(char::from))
                        .collect::<arbitrary::Result<_>>()?;
                    free_form.push(value);
                }
                RecordTypeWithData::Txt { pairs, free_form }
            }
            RecordType::Srv => RecordTypeWithData::Srv {
                priority: u.arbitrary()?,
                weight: u.arbitrary()?,
                port: u.arbitrary()?,
                target: u.arbitrary()?,
            },
            RecordType::Unknown(rtype) => RecordTypeWithData::Unknown { rtype, octets },
        };
        Ok(rtype_with_data)
    }
}

/// What sort of query/update this message is (RFC 1035 §4.1.1, RFC
/// 2136 §3.1 for `Notify`/`Update`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Opcode {
    Standard,
    Inverse,
    Status,
    Notify,
    Update,
    Reserved(OpcodeReserved),
}

/// A struct with a private constructor, to ensure invalid `Opcode`s
/// cannot be created directly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct OpcodeReserved(u8);

impl Opcode {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Opcode::Reserved(_))
    }
}

impl From<u8> for Opcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Opcode::Standard,
            1 => Opcode::Inverse,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            other => Opcode::Reserved(OpcodeReserved(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Standard => 0,
            Opcode::Inverse => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::Reserved(OpcodeReserved(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Opcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// Response code (RFC 1035 §4.1.1, extended with the RFC 2136 UPDATE
/// codes 6-10).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Rcode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    YxDomain,
    YxrrSet,
    NxrrSet,
    NotAuth,
    NotZone,
    Reserved(RcodeReserved),
}

/// A struct with a private constructor, to ensure invalid `Rcode`s
/// cannot be created directly.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RcodeReserved(u8);

impl Rcode {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Rcode::Reserved(_))
    }
}

impl From<u8> for Rcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Rcode::NoError,
            1 => Rcode::FormatError,
            2 => Rcode::ServerFailure,
            3 => Rcode::NameError,
            4 => Rcode::NotImplemented,
            5 => Rcode::Refused,
            6 => Rcode::YxDomain,
            7 => Rcode::YxrrSet,
            8 => Rcode::NxrrSet,
            9 => Rcode::NotAuth,
            10 => Rcode::NotZone,
            other => Rcode::Reserved(RcodeReserved(other)),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormatError => 1,
            Rcode::ServerFailure => 2,
            Rcode::NameError => 3,
            Rcode::NotImplemented => 4,
            Rcode::Refused => 5,
            Rcode::YxDomain => 6,
            Rcode::YxrrSet => 7,
            Rcode::NxrrSet => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::Reserved(RcodeReserved(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Rcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// A domain name, held in its canonical dot-separated presentation
/// form (e.g. `"www.example.com."`), always terminated by a trailing
/// dot representing the root label.
///
/// Names are treated as opaque, already-encoded label sequences: this
/// type does no IDNA/Punycode conversion, and label bytes are UTF-8
/// rather than restricted to printable ASCII (see the decode rules in
/// the `deserialise` module).
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct DomainName(String);

impl DomainName {
    /// The root domain: `"."`.
    pub fn root() -> Self {
        DomainName(".".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dot-separated labels of this name, with the trailing empty
    /// (root) label dropped.
    pub fn labels(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.0.trim_end_matches('.').split('.').collect()
        }
    }
}

impl From<String> for DomainName {
    fn from(s: String) -> Self {
        if s.ends_with('.') {
            DomainName(s)
        } else {
            DomainName(format!("{s}."))
        }
    }
}

impl From<&str> for DomainName {
    fn from(s: &str) -> Self {
        DomainName::from(s.to_string())
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DomainName").field(&self.0).finish()
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for DomainName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_labels = u.int_in_range::<usize>(0..=10)?;
        let mut labels = Vec::with_capacity(num_labels);
        for _ in 0..num_labels {
            let label_len = u.int_in_range::<usize>(1..=20)?;
            let label: String = (0..label_len)
                .map(|_| u.int_in_range(b'a'..=b'z').map(char::from))
                .collect::<arbitrary::Result<_>>()?;
            labels.push(label);
        }
        if labels.is_empty() {
            Ok(DomainName::root())
        } else {
            Ok(DomainName::from(format!("{}.", labels.join("."))))
        }
    }
}

/// Record types used both by resource records and by questions.
///
/// This is the closed-for-interpretation, open-for-extension registry
/// at the heart of component C3: a value here is either one of the
/// types this crate decodes structured RDATA for, or `Unknown`, which
/// preserves the raw wire type code and bytes without attempting to
/// understand them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Cname,
    Soa,
    Ptr,
    Txt,
    Srv,
    Unknown(u16),
}

impl RecordType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordType::Unknown(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::Aaaa => write!(f, "AAAA"),
            RecordType::Cname => write!(f, "CNAME"),
            RecordType::Soa => write!(f, "SOA"),
            RecordType::Ptr => write!(f, "PTR"),
            RecordType::Txt => write!(f, "TXT"),
            RecordType::Srv => write!(f, "SRV"),
            RecordType::Unknown(n) => write!(f, "{n}"),
        }
    }
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            5 => RecordType::Cname,
            6 => RecordType::Soa,
            12 => RecordType::Ptr,
            16 => RecordType::Txt,
            28 => RecordType::Aaaa,
            33 => RecordType::Srv,
            _ => RecordType::Unknown(value),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Srv => 33,
            RecordType::Unknown(value) => value,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordType {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

/// Record classes used both by resource records and by questions (the
/// high "unique"/cache-flush bit is carried separately, not as part of
/// this value - see [`Question::unique`] and [`ResourceRecord::unique`]).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordClass {
    IN,
    Unknown(u16),
}

impl RecordClass {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordClass::Unknown(_))
    }
}

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordClass::IN,
            _ => RecordClass::Unknown(value),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::IN => 1,
            RecordClass::Unknown(value) => value,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordClass {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn u8_opcode_roundtrip() {
        for i in 0..15 {
            assert_eq!(u8::from(Opcode::from(i)), i);
        }
    }

    #[test]
    fn u8_rcode_roundtrip() {
        for i in 0..15 {
            assert_eq!(u8::from(Rcode::from(i)), i);
        }
    }

    #[test]
    fn u16_recordtype_roundtrip() {
        for i in 0..100 {
            assert_eq!(u16::from(RecordType::from(i)), i);
        }
    }

    #[test]
    fn u16_recordclass_roundtrip() {
        for i in 0..100 {
            assert_eq!(u16::from(RecordClass::from(i)), i);
        }
    }

    #[test]
    fn domainname_root() {
        assert_eq!(".", DomainName::root().as_str());
        assert!(DomainName::root().is_root());
        assert!(DomainName::root().labels().is_empty());
    }

    #[test]
    fn domainname_adds_trailing_dot() {
        assert_eq!("example.com.", DomainName::from("example.com").as_str());
        assert_eq!("example.com.", DomainName::from("example.com.").as_str());
    }

    #[test]
    fn domainname_labels() {
        assert_eq!(
            vec!["www", "example", "com"],
            domain("www.example.com.").labels()
        );
    }
}

#[cfg(any(feature = "test-util", test))]
pub mod test_util {
    use super::*;

    pub fn domain(name: &str) -> DomainName {
        DomainName::from(name)
    }

    pub fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
        ResourceRecord::new_a(domain(name), 300, address)
    }

    pub fn aaaa_record(name: &str, address: Ipv6Addr) -> ResourceRecord {
        ResourceRecord::new_aaaa(domain(name), 300, address)
    }

    pub fn cname_record(name: &str, target_name: &str) -> ResourceRecord {
        ResourceRecord::new_cname(domain(name), 300, domain(target_name))
    }

    pub fn ptr_record(name: &str, target_name: &str) -> ResourceRecord {
        ResourceRecord::new_ptr(domain(name), 120, domain(target_name))
    }

    pub fn srv_record(name: &str, port: u16, target_name: &str) -> ResourceRecord {
        ResourceRecord::new_srv(domain(name), 120, 0, 0, port, domain(target_name))
    }

    pub fn txt_record(name: &str, pairs: &[(&str, &str)]) -> ResourceRecord {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ResourceRecord::new_txt(domain(name), 120, map, Vec::new())
    }

    pub fn unknown_record(name: &str, rtype: u16, octets: &[u8]) -> ResourceRecord {
        ResourceRecord::new_opaque(domain(name), 300, rtype, octets.to_vec())
    }
}
