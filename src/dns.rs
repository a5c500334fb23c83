use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, Record, RecordType as WireType};

use crate::error::{DecodeError, EncodeError};
use crate::message::{DnsMessage, Flags, Question, Rcode, RecordData, RecordType, ResourceRecord};

/// Parse a domain into a wire name, rejecting names that cannot be encoded.
pub fn parse_name(domain: &str) -> Result<Name, EncodeError> {
	Name::from_ascii(domain).map_err(|e| EncodeError::InvalidName {
		domain: domain.to_string(),
		reason: e.to_string(),
	})
}

/// Build a single-question A query for the given domain.
///
/// Recursion desired is left cleared: iterative queries must not ask the
/// target server to recurse on our behalf.
/// Returns the serialized query bytes ready to send over UDP.
pub fn encode_query(domain: &str, txid: u16) -> Result<Vec<u8>, EncodeError> {
	let name = parse_name(domain)?;

	let mut message = Message::new();
	message.set_id(txid);
	message.set_message_type(MessageType::Query);
	message.set_op_code(OpCode::Query);
	message.set_recursion_desired(false);
	message.add_query(Query::query(name, WireType::A));

	message.to_vec()
		.map_err(|e| EncodeError::Serialize(e.to_string()))
}

/// Decode a received datagram into a [`DnsMessage`].
///
/// Compression pointers are handled by the wire decoder. Truncated or
/// malformed input yields a [`DecodeError`], never a panic.
pub fn decode_message(bytes: &[u8]) -> Result<DnsMessage, DecodeError> {
	let message = Message::from_vec(bytes)
		.map_err(|e| DecodeError(e.to_string()))?;
	Ok(from_wire(&message))
}

fn from_wire(message: &Message) -> DnsMessage {
	let flags = Flags {
		response: message.message_type() == MessageType::Response,
		opcode: u8::from(message.op_code()),
		authoritative: message.authoritative(),
		truncated: message.truncated(),
		recursion_desired: message.recursion_desired(),
		recursion_available: message.recursion_available(),
		rcode: rcode_from_wire(message.response_code()),
	};

	let questions = message.queries().iter()
		.map(|q| Question {
			name: q.name().to_ascii(),
			qtype: record_type_from_wire(q.query_type()),
		})
		.collect();

	DnsMessage {
		id: message.id(),
		flags,
		questions,
		answers: message.answers().iter().map(record_from_wire).collect(),
		authority: message.name_servers().iter().map(record_from_wire).collect(),
		additional: message.additionals().iter().map(record_from_wire).collect(),
	}
}

fn rcode_from_wire(code: ResponseCode) -> Rcode {
	match code {
		ResponseCode::NoError => Rcode::NoError,
		ResponseCode::NXDomain => Rcode::NxDomain,
		ResponseCode::ServFail => Rcode::ServFail,
		ResponseCode::Refused => Rcode::Refused,
		other => Rcode::Other(format!("{}", other)),
	}
}

fn record_type_from_wire(rtype: WireType) -> RecordType {
	match rtype {
		WireType::A => RecordType::A,
		WireType::NS => RecordType::Ns,
		WireType::CNAME => RecordType::Cname,
		WireType::SOA => RecordType::Soa,
		other => RecordType::Other(u16::from(other)),
	}
}

fn record_from_wire(record: &Record) -> ResourceRecord {
	let data = match record.data() {
		RData::A(a) => RecordData::A(a.0),
		RData::NS(ns) => RecordData::Ns(ns.0.to_ascii()),
		RData::CNAME(cname) => RecordData::Cname(cname.0.to_ascii()),
		_ => RecordData::Other,
	};
	ResourceRecord {
		name: record.name().to_ascii(),
		rtype: record_type_from_wire(record.record_type()),
		ttl: record.ttl(),
		data,
	}
}
