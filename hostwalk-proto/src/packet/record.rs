use super::QueryType;
use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::BytePacketBuffer;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::question::CLASS_IN;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum Record {
    Unknown {
        owner: String,
        qtype: u16,
        data_len: u16,
        ttl: u32,
    }, // 0
    A {
        owner: String,
        addr: Ipv4Addr,
        ttl: u32,
    }, // 1
    NS {
        owner: String,
        target: String,
        ttl: u32,
    }, // 2
    CNAME {
        owner: String,
        target: String,
        ttl: u32,
    }, // 5
    MX {
        owner: String,
        preference: u16,
        target: String,
        ttl: u32,
    }, // 15
    AAAA {
        owner: String,
        addr: Ipv6Addr,
        ttl: u32,
    }, // 28
}

impl Record {
    pub fn read(buffer: &mut BytePacketBuffer) -> Result<Record, ReaderError> {
        // NAME a domain name to which this resource record pertains.
        let owner = buffer.read_qname()?;

        // TYPE two octets containing one of the RR type codes.
        let qtype_num = buffer.read_u16()?;
        let qtype = QueryType::from_num(qtype_num);

        // CLASS two octets which specify the class of the data in the RDATA
        // field. Not validated; only IN traffic reaches this resolver.
        let _class = buffer.read_u16()?;

        // TTL a 32 bit unsigned integer that specifies the time interval
        // that the resource record may be cached before it should be
        // discarded.
        let ttl = buffer.read_u32()?;

        // RDLENGTH an unsigned 16 bit integer that specifies the length in
        // octets of the RDATA field.
        let data_len = buffer.read_u16()?;

        match qtype {
            QueryType::A => {
                let raw = buffer.read_u32()?;
                let addr = Ipv4Addr::from(raw);

                Ok(Record::A { owner, addr, ttl })
            }
            QueryType::AAAA => {
                let mut segments = [0u16; 8];
                for segment in segments.iter_mut() {
                    *segment = buffer.read_u16()?;
                }
                let addr = Ipv6Addr::from(segments);

                Ok(Record::AAAA { owner, addr, ttl })
            }
            QueryType::NS => {
                let target = buffer.read_qname()?;

                Ok(Record::NS { owner, target, ttl })
            }
            QueryType::CNAME => {
                let target = buffer.read_qname()?;

                Ok(Record::CNAME { owner, target, ttl })
            }
            QueryType::MX => {
                let preference = buffer.read_u16()?;
                let target = buffer.read_qname()?;

                Ok(Record::MX {
                    owner,
                    preference,
                    target,
                    ttl,
                })
            }
            QueryType::Unknown(_) => {
                buffer.step(data_len as usize)?;

                Ok(Record::Unknown {
                    owner,
                    qtype: qtype_num,
                    data_len,
                    ttl,
                })
            }
        }
    }

    pub fn write(&self, buffer: &mut BytePacketBuffer) -> Result<usize, WriterError> {
        let start_pos = buffer.pos();

        match *self {
            Record::A {
                ref owner,
                ref addr,
                ttl,
            } => {
                buffer.write_qname(owner)?;
                buffer.write_u16(QueryType::A.into_num())?;
                buffer.write_u16(CLASS_IN)?;
                buffer.write_u32(ttl)?;
                buffer.write_u16(4)?;

                for octet in addr.octets() {
                    buffer.write_u8(octet)?;
                }
            }
            Record::NS {
                ref owner,
                ref target,
                ttl,
            } => {
                buffer.write_qname(owner)?;
                buffer.write_u16(QueryType::NS.into_num())?;
                buffer.write_u16(CLASS_IN)?;
                buffer.write_u32(ttl)?;
                self.write_qname_data(buffer, target, None)?;
            }
            Record::CNAME {
                ref owner,
                ref target,
                ttl,
            } => {
                buffer.write_qname(owner)?;
                buffer.write_u16(QueryType::CNAME.into_num())?;
                buffer.write_u16(CLASS_IN)?;
                buffer.write_u32(ttl)?;
                self.write_qname_data(buffer, target, None)?;
            }
            Record::MX {
                ref owner,
                preference,
                ref target,
                ttl,
            } => {
                buffer.write_qname(owner)?;
                buffer.write_u16(QueryType::MX.into_num())?;
                buffer.write_u16(CLASS_IN)?;
                buffer.write_u32(ttl)?;
                self.write_qname_data(buffer, target, Some(preference))?;
            }
            Record::AAAA {
                ref owner,
                ref addr,
                ttl,
            } => {
                buffer.write_qname(owner)?;
                buffer.write_u16(QueryType::AAAA.into_num())?;
                buffer.write_u16(CLASS_IN)?;
                buffer.write_u32(ttl)?;
                buffer.write_u16(16)?;

                for segment in &addr.segments() {
                    buffer.write_u16(*segment)?;
                }
            }
            // Unknown records are only ever decoded, never re-emitted.
            Record::Unknown { .. } => {}
        }

        Ok(buffer.pos() - start_pos)
    }

    /// RDATA holding a domain name has a length that is only known once the
    /// name is written, so the length field gets patched afterwards.
    fn write_qname_data(
        &self,
        buffer: &mut BytePacketBuffer,
        target: &str,
        preference: Option<u16>,
    ) -> Result<(), WriterError> {
        let len_pos = buffer.pos();
        buffer.write_u16(0)?;

        if let Some(preference) = preference {
            buffer.write_u16(preference)?;
        }
        buffer.write_qname(target)?;

        let size = buffer.pos() - (len_pos + 2);
        buffer.set_u16(len_pos, size as u16)?;

        Ok(())
    }
}
