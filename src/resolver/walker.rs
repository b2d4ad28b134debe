use super::{Resolver, Session, ROOT_SERVERS};
use crate::model::{Name, RecordData, Response};
use crate::repository::cache::CacheService;
use crate::repository::transport::Transport;
use hostwalk_proto::packet::QueryType;
use std::collections::HashSet;
use std::net::Ipv4Addr;

/// Failed exchanges tolerated before the walk abandons its current branch
/// and falls back to the roots.
const FAILURE_RESET: u32 = 4;

impl<T: Transport, C: CacheService> Resolver<T, C> {
    /// Drives one query down the delegation chain: ask a candidate server,
    /// follow the referral it hands back, repeat. Ends with the first
    /// answer, or with the empty response once the candidate pool dries up
    /// or the call's server budget is spent.
    ///
    /// The tried set is local to this walk: a nested resolution may ask a
    /// server this walk already visited, since it asks about a different
    /// name. The budget lives in the session and is shared by all of them.
    pub(crate) async fn walk(
        &self,
        name: &Name,
        qtype: QueryType,
        seeds: Vec<Ipv4Addr>,
        session: &Session,
        depth: usize,
    ) -> Response {
        let mut candidates = seeds;
        let mut tried: HashSet<Ipv4Addr> = HashSet::new();
        let mut failures = 0u32;

        'delegation: loop {
            for server in candidates.clone() {
                if !tried.insert(server) {
                    continue;
                }
                if !session.spend() {
                    tracing::warn!("server budget exhausted resolving {name}");
                    return Response::empty();
                }

                let reply = match self.transport().query(server, name, qtype).await {
                    Ok(reply) => reply,
                    Err(error) => {
                        tracing::debug!("exchange with {server} failed: {error}");
                        failures += 1;
                        if failures >= FAILURE_RESET {
                            candidates = ROOT_SERVERS.to_vec();
                            failures = 0;
                            continue 'delegation;
                        }
                        continue;
                    }
                };

                if reply.has_answer() {
                    self.remember_good(vec![server]);
                    return reply;
                }

                let next = self
                    .referral_candidates(&reply, &candidates, session, depth)
                    .await;
                if next.is_empty() {
                    // A reply that neither answers nor delegates is as good
                    // as a dead server.
                    failures += 1;
                    if failures >= FAILURE_RESET {
                        candidates = ROOT_SERVERS.to_vec();
                        failures = 0;
                        continue 'delegation;
                    }
                    continue;
                }

                tracing::debug!("{server} delegated {name} to {} servers", next.len());
                self.remember_good(next.clone());
                candidates = next;
                continue 'delegation;
            }

            // A full pass over the candidates without progress.
            break 'delegation;
        }

        Response::empty()
    }

    /// Extracts the next hop from a referral: glue addresses first, then
    /// the addresses of unglued NS hosts, each resolved through the facade.
    /// Order follows the reply; duplicates are dropped.
    async fn referral_candidates(
        &self,
        reply: &Response,
        current: &[Ipv4Addr],
        session: &Session,
        depth: usize,
    ) -> Vec<Ipv4Addr> {
        let mut found: Vec<Ipv4Addr> = Vec::new();

        for set in &reply.additional {
            match set.rtype {
                QueryType::A => {
                    push_addresses(&set.records, &mut found);
                    self.cache_delegation(&set.owner, QueryType::A, reply).await;
                }
                // AAAA glue is remembered for completeness but never
                // dialed; transport is IPv4 only.
                QueryType::AAAA => {
                    self.cache_delegation(&set.owner, QueryType::AAAA, reply)
                        .await;
                }
                _ => {}
            }
        }
        for set in &reply.authority {
            self.cache_delegation(&set.owner, set.rtype, reply).await;
        }

        if !found.is_empty() {
            return found;
        }

        // Unglued delegation: the NS targets live outside the zone that
        // was just delegated, so each one needs its own resolution.
        let mut hosts: Vec<Name> = Vec::new();
        for set in &reply.authority {
            if set.rtype != QueryType::NS {
                continue;
            }
            for record in &set.records {
                if let RecordData::Ns(host) = record {
                    if !hosts.contains(host) {
                        hosts.push(host.clone());
                    }
                }
            }
        }

        for host in hosts {
            let resolved = match self.cache.fetch(&host, QueryType::A).await {
                Some(cached) => cached,
                None => {
                    // Seed the sub-resolution with our current position in
                    // the hierarchy; the caller's hint is restored after,
                    // a failed sub-resolution must not erase progress.
                    let saved = self.swap_good(current.to_vec());
                    let resolved = self
                        .lookup(host.clone(), QueryType::A, session, depth + 1)
                        .await;
                    self.swap_good(saved);
                    resolved
                }
            };
            harvest(&resolved, &host, &mut found);
        }

        found
    }

    /// Remembers which reply carried a delegation record, so later walks
    /// and unglued-NS lookups can reuse it without asking the network.
    async fn cache_delegation(&self, owner: &Name, qtype: QueryType, reply: &Response) {
        self.cache.store(owner, qtype, reply.clone()).await;
    }
}

/// IPv4 addresses for `host` in a resolved or cached response: every A
/// record in the answer, plus owner-matching glue kept in the additional
/// section of a remembered referral.
fn harvest(response: &Response, host: &Name, found: &mut Vec<Ipv4Addr>) {
    for set in &response.answer {
        push_addresses(&set.records, found);
    }
    for set in &response.additional {
        if set.owner == *host && set.rtype == QueryType::A {
            push_addresses(&set.records, found);
        }
    }
}

fn push_addresses(records: &[RecordData], found: &mut Vec<Ipv4Addr>) {
    for record in records {
        if let RecordData::A(addr) = record {
            if !found.contains(addr) {
                found.push(*addr);
            }
        }
    }
}
