use super::name::Name;
use hostwalk_proto::packet::QueryType;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Typed payload of one resource record, with owner and type lifted out
/// into the enclosing [`RecordSet`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(Name),
    Mx { preference: u16, exchange: Name },
    Ns(Name),
}

/// Records sharing an owner name and a type, in wire order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSet {
    pub owner: Name,
    pub rtype: QueryType,
    pub records: Vec<RecordData>,
}

impl RecordSet {
    pub fn a<I: IntoIterator<Item = Ipv4Addr>>(owner: Name, addrs: I) -> Self {
        Self {
            owner,
            rtype: QueryType::A,
            records: addrs.into_iter().map(RecordData::A).collect(),
        }
    }

    pub fn aaaa<I: IntoIterator<Item = Ipv6Addr>>(owner: Name, addrs: I) -> Self {
        Self {
            owner,
            rtype: QueryType::AAAA,
            records: addrs.into_iter().map(RecordData::Aaaa).collect(),
        }
    }

    pub fn cname(owner: Name, target: Name) -> Self {
        Self {
            owner,
            rtype: QueryType::CNAME,
            records: vec![RecordData::Cname(target)],
        }
    }

    pub fn ns<I: IntoIterator<Item = Name>>(owner: Name, targets: I) -> Self {
        Self {
            owner,
            rtype: QueryType::NS,
            records: targets.into_iter().map(RecordData::Ns).collect(),
        }
    }

    pub fn mx(owner: Name, preference: u16, exchange: Name) -> Self {
        Self {
            owner,
            rtype: QueryType::MX,
            records: vec![RecordData::Mx {
                preference,
                exchange,
            }],
        }
    }
}

/// The engine-facing view of a DNS reply: the three record sections in wire
/// order. A default-constructed value doubles as the synthesized empty
/// response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub answer: Vec<RecordSet>,
    pub authority: Vec<RecordSet>,
    pub additional: Vec<RecordSet>,
}

impl Response {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Target of the first CNAME record in the answer owned by `name`.
    pub fn answer_alias(&self, name: &Name) -> Option<Name> {
        self.answer
            .iter()
            .filter(|set| set.rtype == QueryType::CNAME && set.owner == *name)
            .flat_map(|set| set.records.iter())
            .find_map(|record| match record {
                RecordData::Cname(target) => Some(target.clone()),
                _ => None,
            })
    }

    /// The CNAME record sets of the answer owned by `owner`, in order.
    /// Anything under another owner is not part of this name's alias
    /// chain and stays out of a merge head.
    pub fn cname_sets(&self, owner: &Name) -> Vec<RecordSet> {
        self.answer
            .iter()
            .filter(|set| set.rtype == QueryType::CNAME && set.owner == *owner)
            .cloned()
            .collect()
    }

    /// Appends a tail resolution behind the alias record sets that led to
    /// it. Authority and additional come from the tail; the head only ever
    /// contributes the alias chain.
    pub fn merge(head: Vec<RecordSet>, tail: Response) -> Response {
        let mut answer = head;
        answer.extend(tail.answer);
        Response {
            answer,
            authority: tail.authority,
            additional: tail.additional,
        }
    }
}
