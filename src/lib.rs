//! A pointer-compressed codec for RFC 1035 DNS messages, with the
//! mDNS/DNS-SD cache-flush and unicast-response bit conventions layered
//! on top of the class field.
//!
//! This crate has no knowledge of sockets, CLI arguments, or logging: it
//! is a pure transformation between [`protocol::types::Message`] values
//! and the bytes that go on the wire. A caller that owns a UDP socket or
//! a TCP connection is expected to hand this crate exactly one
//! datagram's worth of bytes (or, for TCP, to use [`protocol::tcp`] to
//! peel off the 2-byte length prefix) and nothing more.
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::wildcard_imports)]

pub mod protocol;
