//! End-to-end wire-format scenarios, exercised against the public API
//! only (no internal module paths beyond what `test-util` exposes).
//!
//! The literal hex fixtures here are regression tests for concrete
//! wire bytes, not just structural round-trips: a change that alters
//! header bit packing or name compression in a way that still
//! round-trips internally, but disagrees with another implementation,
//! should fail one of these.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use arbitrary::{Arbitrary, Unstructured};
use fake::{Fake, Faker};
use rand::RngCore;

use dns_proto::protocol::deserialise::{deserialise_domain_name, ConsumableBuffer};
use dns_proto::protocol::types::test_util::*;
use dns_proto::protocol::types::*;

fn from_hex(s: &str) -> Vec<u8> {
    assert!(s.len() % 2 == 0, "hex string must have an even length");
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).expect("invalid hex digit"))
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn random_message() -> Message {
    let mut rng = rand::thread_rng();
    let mut seed = vec![0u8; 4096];
    rng.fill_bytes(&mut seed);
    let mut u = Unstructured::new(&seed);
    Message::arbitrary(&mut u).expect("arbitrary byte budget should be plenty for a Message")
}

#[test]
fn roundtrip_arbitrary_messages() {
    for _ in 0..200 {
        let original = random_message();
        let octets = original.to_octets().expect("arbitrary messages always fit on the wire");
        let decoded = Message::from_octets(&octets).expect("re-decoding a message this crate just wrote");
        assert_eq!(original, decoded);
    }
}

/// S1: empty NXDOMAIN response.
#[test]
fn scenario_s1_empty_nxdomain_response() {
    let message = Message {
        header: Header {
            id: 0x11B1,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: false,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NameError,
        },
        questions: Vec::new(),
        answers: Vec::new(),
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    assert_eq!("11b180030000000000000000", to_hex(&octets));
}

/// S2: empty response with every flag bit set and RCODE=NOERROR.
#[test]
fn scenario_s2_empty_flags_full_response() {
    let message = Message {
        header: Header {
            id: 0x494D,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: true,
            is_truncated: true,
            recursion_desired: true,
            recursion_available: true,
            rcode: Rcode::NoError,
        },
        questions: Vec::new(),
        answers: Vec::new(),
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    assert_eq!("494d87800000000000000000", to_hex(&octets));
}

/// S3: a single PTR question round-trips structurally.
#[test]
fn scenario_s3_single_ptr_question() {
    let message = Message {
        header: Header {
            id: 0x0001,
            is_response: false,
            opcode: Opcode::Standard,
            is_authoritative: false,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: vec![Question {
            name: domain("_airplay._tcp._local."),
            qtype: RecordType::Ptr,
            unique: false,
            qclass: RecordClass::IN,
        }],
        answers: Vec::new(),
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    let decoded = Message::from_octets(&octets).unwrap();
    assert_eq!(message, decoded);
}

/// S4: PTR query plus a PTR answer; the answer's destination survives
/// the round trip unchanged.
#[test]
fn scenario_s4_ptr_query_and_answer() {
    let question_name = domain("_airplay._tcp._local.");
    let message = Message {
        header: Header {
            id: 0x0002,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: false,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: vec![Question {
            name: question_name.clone(),
            qtype: RecordType::Ptr,
            unique: false,
            qclass: RecordClass::IN,
        }],
        answers: vec![ResourceRecord::new_ptr(
            question_name,
            120,
            domain("example._airplay._tcp._local."),
        )],
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    let decoded = Message::from_octets(&octets).unwrap();
    assert_eq!(message, decoded);
    match &decoded.answers[0].rtype_with_data {
        RecordTypeWithData::Ptr { ptrdname } => {
            assert_eq!("example._airplay._tcp._local.", ptrdname.as_str());
        }
        other => panic!("expected PTR data, got {other:?}"),
    }
}

/// S5: a response mixing PTR, SRV, A, and TXT records round-trips, and
/// the A record's RDATA is exactly the four address octets.
#[test]
fn scenario_s5_mixed_sections() {
    let mut pairs = BTreeMap::new();
    pairs.insert("hello".to_string(), "world".to_string());

    let message = Message {
        header: Header {
            id: 0x0003,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: true,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: Vec::new(),
        answers: vec![
            ResourceRecord::new_ptr(
                domain("_airplay._tcp.local."),
                120,
                domain("example._airplay._tcp.local."),
            ),
            ResourceRecord::new_srv(domain("example._airplay._tcp.local."), 120, 0, 0, 7000, domain("example.local.")),
            ResourceRecord::new_a(domain("example.local."), 120, Ipv4Addr::new(10, 0, 1, 2)),
            ResourceRecord::new_txt(domain("example._airplay._tcp.local."), 120, pairs, Vec::new()),
        ],
        authority: Vec::new(),
        additional: Vec::new(),
    };

    let octets = message.to_octets().unwrap();
    let decoded = Message::from_octets(&octets).unwrap();
    assert_eq!(message, decoded);

    let a_record_bytes = decoded
        .answers
        .iter()
        .find_map(|rr| match &rr.rtype_with_data {
            RecordTypeWithData::A { address } => Some(address.octets()),
            _ => None,
        })
        .expect("an A record among the answers");
    assert_eq!([0x0a, 0x00, 0x01, 0x02], a_record_bytes);
}

/// S6: a fixed fixture buffer, decoded name-first with
/// `deserialise_domain_name` at a specific offset, matches a known
/// compressed-name extraction.
#[test]
fn scenario_s6_compressed_name_extraction() {
    let octets = from_hex(
        "000084000000000200000006075a6974686f656b0c5f6465766963652d696e666f\
         045f746370056c6f63616c000010000100001194000d0c6d6f64656c3d4a343264\
         4150085f616972706c6179c021000c000100001194000a075a6974686f656bc044",
    );
    let mut cursor = ConsumableBuffer::new(&octets).at_offset(89);
    let name = deserialise_domain_name(&mut cursor).unwrap();
    assert_eq!("Zithoek._airplay._tcp.local.", name.as_str());
    assert_eq!(99, cursor.position());
}

/// S7: a forward-pointing name pointer is rejected, not looped on.
#[test]
fn scenario_s7_forward_pointer_rejected() {
    // root-named question, then an answer whose name is a pointer to
    // an offset past the pointer itself.
    let mut octets = from_hex("11b180000001000100000000");
    octets.push(0x00); // question name: root
    octets.extend_from_slice(&u16::from(RecordType::A).to_be_bytes());
    octets.extend_from_slice(&u16::from(RecordClass::IN).to_be_bytes());
    let forward_pointer_offset = octets.len();
    octets.extend_from_slice(&[0xc0, ((forward_pointer_offset + 20) & 0xff) as u8]);
    octets.extend_from_slice(&u16::from(RecordType::A).to_be_bytes());
    octets.extend_from_slice(&u16::from(RecordClass::IN).to_be_bytes());
    octets.extend_from_slice(&300u32.to_be_bytes());
    octets.extend_from_slice(&4u16.to_be_bytes());
    octets.extend_from_slice(&[1, 2, 3, 4]);

    assert!(Message::from_octets(&octets).is_err());
}

/// Property 2: repeating a question's exact name grows the message by
/// exactly 6 bytes (a 2-byte pointer plus TYPE and CLASS).
#[test]
fn property_exact_name_repeat_costs_six_bytes() {
    let one_question = Message::from_question(
        1,
        Question {
            name: domain("abc.def.ghi.jk.local."),
            qtype: RecordType::A,
            unique: false,
            qclass: RecordClass::IN,
        },
    );
    let mut two_questions = one_question.clone();
    two_questions.questions.push(Question {
        name: domain("abc.def.ghi.jk.local."),
        qtype: RecordType::A,
        unique: false,
        qclass: RecordClass::IN,
    });

    let len_one = one_question.to_octets().unwrap().len();
    let len_two = two_questions.to_octets().unwrap().len();
    assert_eq!(6, len_two - len_one);
}

/// Property 3: a second question that shares only the tail of an
/// already-written name still compresses that shared suffix: the new
/// leading label (4 bytes) is written out, then a 2-byte pointer
/// replaces the rest, for 10 bytes total (4 + 2 + 4 for TYPE/CLASS).
#[test]
fn property_suffix_repeat_costs_ten_bytes() {
    let one_question = Message::from_question(
        1,
        Question {
            name: domain("abc.def.ghi.jk.local."),
            qtype: RecordType::A,
            unique: false,
            qclass: RecordClass::IN,
        },
    );
    let mut two_questions = one_question.clone();
    two_questions.questions.push(Question {
        // shares the "def.ghi.jk.local." suffix with the first
        // question, but not the leading label, so it can't collapse
        // to a single pointer the way an exact repeat does.
        name: domain("xyz.def.ghi.jk.local."),
        qtype: RecordType::A,
        unique: false,
        qclass: RecordClass::IN,
    });

    let len_one = one_question.to_octets().unwrap().len();
    let len_two = two_questions.to_octets().unwrap().len();
    assert_eq!(10, len_two - len_one);
}

/// Property 5: the mDNS cache-flush/unicast bit round-trips alongside
/// the rest of a record/question.
#[test]
fn property_unique_bit_roundtrips() {
    let message = Message {
        header: Header {
            id: 4,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: true,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: Vec::new(),
        answers: vec![a_record("example.local.", Ipv4Addr::new(1, 2, 3, 4)).unique()],
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    // the class field's high bit must be set on the wire: walk back
    // from the end past the A record's RDATA(4)+RDLENGTH(2)+TTL(4).
    let rr_class_offset = octets.len() - 4 - 2 - 4 - 2;
    let class = u16::from_be_bytes([octets[rr_class_offset], octets[rr_class_offset + 1]]);
    assert_ne!(0, class & CLASS_CACHE_FLUSH_BIT);

    let decoded = Message::from_octets(&octets).unwrap();
    assert!(decoded.answers[0].unique);
}

/// Property 6: a record of an RR type this crate doesn't interpret
/// round-trips with identical RDATA.
#[test]
fn property_unknown_rr_type_preserved() {
    let message = Message {
        header: Header {
            id: 5,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: false,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: Vec::new(),
        answers: vec![unknown_record("example.local.", 0x00FF, &[0xde, 0xad, 0xbe, 0xef])],
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();
    let decoded = Message::from_octets(&octets).unwrap();
    assert_eq!(message, decoded);
    match &decoded.answers[0].rtype_with_data {
        RecordTypeWithData::Unknown { rtype, octets } => {
            assert_eq!(0x00FF, *rtype);
            assert_eq!(&[0xde, 0xad, 0xbe, 0xef], octets.as_slice());
        }
        other => panic!("expected an unknown-type record, got {other:?}"),
    }
}

/// A batch of SRV records with fake-generated ids/ports/weights, the
/// shape a DNS-SD browse response actually carries, round-trips.
#[test]
fn roundtrip_fake_srv_batch() {
    for _ in 0..50 {
        let id: u16 = Faker.fake();
        let port: u16 = (1..65535).fake();
        let priority: u16 = Faker.fake();
        let weight: u16 = Faker.fake();
        let instance = format!("instance-{}", (1..1000).fake::<u32>());

        let message = Message::from_question(
            id,
            Question {
                name: domain(&format!("{instance}._http._tcp.local.")),
                qtype: RecordType::Srv,
                unique: false,
                qclass: RecordClass::IN,
            },
        );
        let mut message = message.make_response();
        message.answers.push(ResourceRecord::new_srv(
            domain(&format!("{instance}._http._tcp.local.")),
            120,
            priority,
            weight,
            port,
            domain(&format!("{instance}.local.")),
        ));

        let octets = message.to_octets().unwrap();
        let decoded = Message::from_octets(&octets).unwrap();
        assert_eq!(message, decoded);
    }
}

/// Fuzzing the decoder with arbitrary bytes should never panic: it
/// must either produce a valid `Message` or one of the closed set of
/// decode errors.
#[test]
fn decode_never_panics_on_arbitrary_bytes() {
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = (rng.next_u32() % 512) as usize;
        let mut buf = vec![0u8; len];
        rng.fill_bytes(&mut buf);
        let _ = Message::from_octets(&buf);
    }
}

/// Mutating single bytes of a known-good S5-shaped message should
/// still never panic the decoder.
#[test]
fn decode_never_panics_on_mutated_valid_message() {
    let mut pairs = BTreeMap::new();
    pairs.insert("hello".to_string(), "world".to_string());
    let message = Message {
        header: Header {
            id: 0x0003,
            is_response: true,
            opcode: Opcode::Standard,
            is_authoritative: true,
            is_truncated: false,
            recursion_desired: false,
            recursion_available: false,
            rcode: Rcode::NoError,
        },
        questions: Vec::new(),
        answers: vec![
            ResourceRecord::new_ptr(
                domain("_airplay._tcp.local."),
                120,
                domain("example._airplay._tcp.local."),
            ),
            ResourceRecord::new_srv(domain("example._airplay._tcp.local."), 120, 0, 0, 7000, domain("example.local.")),
            ResourceRecord::new_a(domain("example.local."), 120, Ipv4Addr::new(10, 0, 1, 2)),
            ResourceRecord::new_txt(domain("example._airplay._tcp.local."), 120, pairs, Vec::new()),
        ],
        authority: Vec::new(),
        additional: Vec::new(),
    };
    let octets = message.to_octets().unwrap();

    for i in 0..octets.len() {
        let mut mutated = octets.clone();
        mutated[i] ^= 0xFF;
        let _ = Message::from_octets(&mutated);
    }
}
