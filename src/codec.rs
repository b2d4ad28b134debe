use crate::model::{Name, RecordData, RecordSet, Response};
use hostwalk_proto::buffer::{BytePacketBuffer, ReaderError, WriterError};
use hostwalk_proto::packet::question::Question;
use hostwalk_proto::packet::record::Record;
use hostwalk_proto::packet::{Message, QueryType};

/// Builds the wire form of one iterative query. Recursion-desired stays
/// cleared: the walker does its own descending.
pub fn encode_query(id: u16, name: &Name, qtype: QueryType) -> Result<BytePacketBuffer, WriterError> {
    let mut message = Message::default();
    message.header.id = id;
    message
        .questions
        .push(Question::new(name.wire().to_string(), qtype));
    message.create_buffer()
}

/// Decodes a reply into the three-section view the engine works on,
/// grouping consecutive records that share an owner and a type.
pub fn decode(buffer: BytePacketBuffer) -> Result<Response, ReaderError> {
    let message = Message::try_from(buffer)?;
    Ok(Response {
        answer: group(message.answers),
        authority: group(message.authorities),
        additional: group(message.additionals),
    })
}

fn group(records: Vec<Record>) -> Vec<RecordSet> {
    let mut sets: Vec<RecordSet> = Vec::new();
    for record in records {
        let (owner, rtype, data) = match record {
            Record::A { owner, addr, .. } => (owner, QueryType::A, RecordData::A(addr)),
            Record::AAAA { owner, addr, .. } => (owner, QueryType::AAAA, RecordData::Aaaa(addr)),
            Record::CNAME { owner, target, .. } => (
                owner,
                QueryType::CNAME,
                RecordData::Cname(Name::new(&target)),
            ),
            Record::NS { owner, target, .. } => {
                (owner, QueryType::NS, RecordData::Ns(Name::new(&target)))
            }
            Record::MX {
                owner,
                preference,
                target,
                ..
            } => (
                owner,
                QueryType::MX,
                RecordData::Mx {
                    preference,
                    exchange: Name::new(&target),
                },
            ),
            // Record types outside the engine's vocabulary (OPT, TXT, SOA,
            // ...) are dropped here; the walker never sees them.
            Record::Unknown { .. } => continue,
        };
        let owner = Name::new(&owner);
        match sets.last_mut() {
            Some(set) if set.owner == owner && set.rtype == rtype => set.records.push(data),
            _ => sets.push(RecordSet {
                owner,
                rtype,
                records: vec![data],
            }),
        }
    }
    sets
}
