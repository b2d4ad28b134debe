mod walker;

use crate::model::{Name, Response};
use crate::repository::cache::CacheService;
use crate::repository::transport::Transport;
use futures::future::BoxFuture;
use hostwalk_proto::packet::QueryType;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The thirteen IANA root servers, the seed delegation set every walk can
/// fall back to.
pub const ROOT_SERVERS: [Ipv4Addr; 13] = [
    Ipv4Addr::new(198, 41, 0, 4),
    Ipv4Addr::new(199, 9, 14, 201),
    Ipv4Addr::new(192, 33, 4, 12),
    Ipv4Addr::new(199, 7, 91, 13),
    Ipv4Addr::new(192, 203, 230, 10),
    Ipv4Addr::new(192, 5, 5, 241),
    Ipv4Addr::new(192, 112, 36, 4),
    Ipv4Addr::new(198, 97, 190, 53),
    Ipv4Addr::new(192, 36, 148, 17),
    Ipv4Addr::new(192, 58, 128, 30),
    Ipv4Addr::new(193, 0, 14, 129),
    Ipv4Addr::new(199, 7, 83, 42),
    Ipv4Addr::new(202, 12, 27, 33),
];

/// Nested lookups (CNAME tails, unglued NS hosts) beyond this depth yield
/// the empty response instead of recursing further.
const DEPTH_LIMIT: usize = 10;

/// Distinct servers one `resolve` call may contact before giving up,
/// counted across every nested walk of that call.
const SERVER_BUDGET: usize = 30;

/// Book-keeping shared by every nested lookup of one `resolve` call: the
/// names already part of the alias chain, and the exchanges already paid
/// for out of the server budget.
#[derive(Default)]
pub(crate) struct Session {
    aliases: Mutex<HashSet<Name>>,
    attempts: AtomicUsize,
}

impl Session {
    /// Marks a name as visited; false if it was already part of the chain.
    fn follow(&self, name: &Name) -> bool {
        self.aliases.lock().unwrap().insert(name.clone())
    }

    /// Accounts for one server exchange; false once the budget is spent.
    pub(crate) fn spend(&self) -> bool {
        self.attempts.fetch_add(1, Ordering::Relaxed) < SERVER_BUDGET
    }
}

/// Iterative resolver: answers queries by walking the delegation chain
/// itself, caching every complete response along the way.
///
/// The hint remembers the nameservers that last made progress so that
/// consecutive lookups skip the part of the hierarchy they already
/// descended.
pub struct Resolver<T, C> {
    transport: T,
    cache: C,
    hint: Mutex<Vec<Ipv4Addr>>,
}

impl<T: Transport, C: CacheService> Resolver<T, C> {
    pub fn new(transport: T, cache: C) -> Self {
        Self {
            transport,
            cache,
            hint: Mutex::new(ROOT_SERVERS.to_vec()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolves one (name, type) query. Never fails: servers that cannot
    /// be reached or understood are skipped, and total exhaustion surfaces
    /// as an empty response.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, name: &Name, qtype: QueryType) -> Response {
        let session = Session::default();
        self.lookup(name.clone(), qtype, &session, 0).await
    }

    pub(crate) fn lookup<'a>(
        &'a self,
        name: Name,
        qtype: QueryType,
        session: &'a Session,
        depth: usize,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if let Some(found) = self.cache.fetch(&name, qtype).await {
                return found;
            }
            if depth > DEPTH_LIMIT {
                tracing::warn!("giving up on {name} at nesting depth {depth}");
                return Response::empty();
            }
            session.follow(&name);

            let seeds = self.last_good();
            let reply = self.walk(&name, qtype, seeds, session, depth).await;

            if !reply.has_answer() {
                self.cache.store(&name, qtype, reply.clone()).await;
                return reply;
            }

            if let Some(alias) = reply.answer_alias(&name) {
                tracing::debug!("{name} is an alias for {alias}");
                let head = reply.cname_sets(&name);
                self.cache.store(&name, QueryType::CNAME, reply).await;

                // A repeated alias means the chain has looped; it gets an
                // empty tail instead of another trip through the network.
                let tail = if session.follow(&alias) {
                    self.lookup(alias, qtype, session, depth + 1).await
                } else {
                    Response::empty()
                };
                let merged = Response::merge(head, tail);
                self.cache.store(&name, qtype, merged.clone()).await;
                return merged;
            }

            self.cache.store(&name, qtype, reply.clone()).await;
            reply
        })
    }

    pub(crate) fn last_good(&self) -> Vec<Ipv4Addr> {
        self.hint.lock().unwrap().clone()
    }

    pub(crate) fn remember_good(&self, servers: Vec<Ipv4Addr>) {
        *self.hint.lock().unwrap() = servers;
    }

    /// Installs a hint and hands back the previous one, so sub-resolutions
    /// can borrow the walker's position and restore it afterwards.
    pub(crate) fn swap_good(&self, servers: Vec<Ipv4Addr>) -> Vec<Ipv4Addr> {
        std::mem::replace(&mut self.hint.lock().unwrap(), servers)
    }
}

#[cfg(test)]
mod tests {
    use super::{Resolver, ROOT_SERVERS};
    use crate::model::{Name, RecordSet, Response};
    use crate::repository::cache::MemoryCacheService;
    use crate::repository::mock::MockTransport;
    use hostwalk_proto::packet::QueryType;
    use std::net::Ipv4Addr;

    const AUTH: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 1);

    fn answer_a(owner: &str, addr: Ipv4Addr) -> Response {
        Response {
            answer: vec![RecordSet::a(Name::new(owner), [addr])],
            ..Default::default()
        }
    }

    /// Referral handing the whole root zone to one authoritative server.
    fn referral_to_auth(zone: &str, ns: &str) -> Response {
        Response {
            authority: vec![RecordSet::ns(Name::new(zone), [Name::new(ns)])],
            additional: vec![RecordSet::a(Name::new(ns), [AUTH])],
            ..Default::default()
        }
    }

    fn resolver(transport: MockTransport) -> Resolver<MockTransport, MemoryCacheService> {
        Resolver::new(transport, MemoryCacheService::default())
    }

    #[tokio::test]
    async fn second_resolution_should_come_from_cache() {
        let transport = MockTransport::default()
            .with_reply(
                ROOT_SERVERS[0],
                "example.com",
                QueryType::A,
                referral_to_auth("com", "ns1.example.com"),
            )
            .with_reply(
                AUTH,
                "example.com",
                QueryType::A,
                answer_a("example.com", Ipv4Addr::new(93, 184, 216, 34)),
            );
        let resolver = resolver(transport);
        let name = Name::new("example.com");

        let first = resolver.resolve(&name, QueryType::A).await;
        let spent = resolver.transport().call_count();
        assert!(first.has_answer());

        let second = resolver.resolve(&name, QueryType::A).await;
        assert_eq!(first, second);
        // Idempotent and network-free the second time around.
        assert_eq!(resolver.transport().call_count(), spent);
    }

    #[tokio::test]
    async fn cache_key_should_ignore_case() {
        let transport = MockTransport::default()
            .with_reply(
                ROOT_SERVERS[0],
                "example.com",
                QueryType::A,
                referral_to_auth("com", "ns1.example.com"),
            )
            .with_reply(
                AUTH,
                "example.com",
                QueryType::A,
                answer_a("example.com", Ipv4Addr::new(93, 184, 216, 34)),
            );
        let resolver = resolver(transport);

        let first = resolver
            .resolve(&Name::new("Example.Com"), QueryType::A)
            .await;
        let spent = resolver.transport().call_count();
        let second = resolver
            .resolve(&Name::new("EXAMPLE.COM"), QueryType::A)
            .await;
        assert_eq!(first, second);
        assert_eq!(resolver.transport().call_count(), spent);
    }

    #[tokio::test]
    async fn cname_merge_should_keep_alias_first() {
        let www = Name::new("www.example.com");
        let apex = Name::new("example.com");
        let addr = Ipv4Addr::new(93, 184, 216, 34);

        let transport = MockTransport::default()
            .with_reply(
                ROOT_SERVERS[0],
                "www.example.com",
                QueryType::A,
                Response {
                    answer: vec![RecordSet::cname(www.clone(), apex.clone())],
                    ..Default::default()
                },
            )
            .with_reply(
                ROOT_SERVERS[0],
                "example.com",
                QueryType::A,
                answer_a("example.com", addr),
            );
        let resolver = resolver(transport);

        let merged = resolver.resolve(&www, QueryType::A).await;
        assert_eq!(merged.answer.len(), 2);
        assert_eq!(merged.answer[0], RecordSet::cname(www.clone(), apex.clone()));
        assert_eq!(merged.answer[1], RecordSet::a(apex.clone(), [addr]));

        // Merged under (name, qtype), the bare alias under (name, CNAME).
        let cached = resolver.resolve(&www, QueryType::CNAME).await;
        assert_eq!(cached.answer, vec![RecordSet::cname(www, apex)]);
    }

    #[tokio::test]
    async fn self_referencing_cname_should_terminate() {
        let www = Name::new("www.example.com");
        let transport = MockTransport::default().with_fallback(
            crate::repository::mock::Script::Reply(Response {
                answer: vec![RecordSet::cname(www.clone(), www.clone())],
                ..Default::default()
            }),
        );
        let resolver = resolver(transport);

        // The loop is cut on the spot: one exchange, an empty tail, and
        // the single alias record as the whole answer.
        let response = resolver.resolve(&www, QueryType::A).await;
        assert_eq!(
            response.answer,
            vec![RecordSet::cname(www.clone(), www)]
        );
        assert_eq!(resolver.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn cname_cycle_should_yield_finite_chain() {
        let www = Name::new("www.example.com");
        let other = Name::new("other.example.com");
        let transport = MockTransport::default()
            .with_reply(
                ROOT_SERVERS[0],
                "www.example.com",
                QueryType::A,
                Response {
                    answer: vec![RecordSet::cname(www.clone(), other.clone())],
                    ..Default::default()
                },
            )
            .with_reply(
                ROOT_SERVERS[0],
                "other.example.com",
                QueryType::A,
                Response {
                    answer: vec![RecordSet::cname(other.clone(), www.clone())],
                    ..Default::default()
                },
            );
        let resolver = resolver(transport);

        // Each hop is followed once; the closing edge gets an empty tail.
        let response = resolver.resolve(&www, QueryType::A).await;
        assert_eq!(
            response.answer,
            vec![
                RecordSet::cname(www.clone(), other.clone()),
                RecordSet::cname(other, www),
            ]
        );
        assert_eq!(resolver.transport().call_count(), 2);
    }

    #[tokio::test]
    async fn mixed_failures_should_still_yield_empty_response() {
        use crate::repository::mock::Script;

        let useless = Response::default();
        let transport = MockTransport::default()
            .with_script(ROOT_SERVERS[0], "broken.test", QueryType::A, Script::Garbage)
            .with_script(ROOT_SERVERS[1], "broken.test", QueryType::A, Script::Timeout)
            .with_reply(ROOT_SERVERS[2], "broken.test", QueryType::A, useless.clone())
            .with_script(ROOT_SERVERS[3], "broken.test", QueryType::A, Script::Garbage)
            .with_reply(ROOT_SERVERS[4], "broken.test", QueryType::A, useless);
        let resolver = resolver(transport);

        let response = resolver.resolve(&Name::new("broken.test"), QueryType::A).await;
        assert_eq!(response, Response::empty());
        assert!(resolver.transport().call_count() <= ROOT_SERVERS.len());
    }

    #[tokio::test]
    async fn total_timeout_should_yield_cached_empty_response() {
        let resolver = resolver(MockTransport::default());
        let name = Name::new("x.test");

        let response = resolver.resolve(&name, QueryType::A).await;
        assert_eq!(response, Response::empty());
        // One attempt per root server, no more.
        assert_eq!(resolver.transport().call_count(), ROOT_SERVERS.len());

        // The failure is cached: no further traffic.
        let again = resolver.resolve(&name, QueryType::A).await;
        assert_eq!(again, Response::empty());
        assert_eq!(resolver.transport().call_count(), ROOT_SERVERS.len());
    }

    #[tokio::test]
    async fn hint_should_start_lookups_near_the_last_answer() {
        let addr = Ipv4Addr::new(93, 184, 216, 34);
        let transport = MockTransport::default()
            .with_reply(
                ROOT_SERVERS[0],
                "example.com",
                QueryType::A,
                referral_to_auth("com", "ns1.example.com"),
            )
            .with_reply(AUTH, "example.com", QueryType::A, answer_a("example.com", addr))
            .with_reply(AUTH, "example.com", QueryType::MX, {
                Response {
                    answer: vec![RecordSet::mx(
                        Name::new("example.com"),
                        10,
                        Name::new("mail.example.com"),
                    )],
                    ..Default::default()
                }
            });
        let resolver = resolver(transport);
        let name = Name::new("example.com");

        resolver.resolve(&name, QueryType::A).await;
        resolver.resolve(&name, QueryType::MX).await;

        // The MX lookup went straight to the server that answered before.
        let journal = resolver.transport().journal();
        assert_eq!(journal.last().unwrap().0, AUTH);
        assert_eq!(journal.len(), 3);
    }
}
