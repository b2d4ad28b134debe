use crate::model::{Name, RecordData};
use crate::repository::cache::CacheService;
use crate::repository::transport::Transport;
use crate::resolver::Resolver;
use hostwalk_proto::packet::QueryType;
use std::fmt::Display;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Everything the CLI prints for one host, in `host(1)` order: aliases,
/// addresses, IPv6 addresses, mail exchangers. Collecting is separate from
/// printing so the output can be asserted on as a whole.
#[derive(Debug)]
pub struct HostReport {
    name: Name,
    /// (target, previous link); the chain starts at the argument as typed.
    aliases: Vec<(Name, String)>,
    addresses: Vec<Ipv4Addr>,
    v6_addresses: Vec<Ipv6Addr>,
    mail_exchangers: Vec<(u16, Name)>,
}

impl HostReport {
    /// Runs the four standard lookups for `host` and gathers the printable
    /// records of each, preserving merged-answer order.
    pub async fn collect<T, C>(resolver: &Resolver<T, C>, host: &str) -> Self
    where
        T: Transport,
        C: CacheService,
    {
        let name = Name::new(host);

        let response = resolver.resolve(&name, QueryType::CNAME).await;
        let mut aliases = Vec::new();
        let mut previous = host.to_string();
        // Only records that extend the chain from the queried name count;
        // a CNAME under any other owner is not a hop of this chain.
        let mut cursor = name.clone();
        for set in &response.answer {
            if set.rtype != QueryType::CNAME || set.owner != cursor {
                continue;
            }
            for record in &set.records {
                if let RecordData::Cname(target) = record {
                    aliases.push((target.clone(), previous.clone()));
                    previous = target.to_string();
                    cursor = target.clone();
                }
            }
        }

        let response = resolver.resolve(&name, QueryType::A).await;
        let mut addresses = Vec::new();
        for set in &response.answer {
            for record in &set.records {
                if let RecordData::A(addr) = record {
                    addresses.push(*addr);
                }
            }
        }

        let response = resolver.resolve(&name, QueryType::AAAA).await;
        let mut v6_addresses = Vec::new();
        for set in &response.answer {
            for record in &set.records {
                if let RecordData::Aaaa(addr) = record {
                    v6_addresses.push(*addr);
                }
            }
        }

        let response = resolver.resolve(&name, QueryType::MX).await;
        let mut mail_exchangers = Vec::new();
        for set in &response.answer {
            for record in &set.records {
                if let RecordData::Mx {
                    preference,
                    exchange,
                } = record
                {
                    mail_exchangers.push((*preference, exchange.clone()));
                }
            }
        }

        Self {
            name,
            aliases,
            addresses,
            v6_addresses,
            mail_exchangers,
        }
    }
}

impl Display for HostReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (target, previous) in &self.aliases {
            writeln!(f, "{target} is an alias for {previous}")?;
        }
        for addr in &self.addresses {
            writeln!(f, "{} has address {addr}", self.name)?;
        }
        for addr in &self.v6_addresses {
            writeln!(f, "{} has IPv6 address {addr}", self.name)?;
        }
        for (preference, exchange) in &self.mail_exchangers {
            writeln!(f, "{} mail is handled by {preference} {exchange}", self.name)?;
        }
        Ok(())
    }
}
