use derive_more::Display;
use rand::Rng;
use rand::seq::SliceRandom;

/// Where a transcript request is sent from.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProxyCandidate {
    #[display("{}", redact_credentials(_0))]
    Proxy(String),
    #[display("direct")]
    Direct,
}

impl ProxyCandidate {
    pub fn proxy_url(&self) -> Option<&str> {
        match self {
            Self::Proxy(url) => Some(url),
            Self::Direct => None,
        }
    }
}

/// Split a comma separated proxy list, dropping blank entries.
pub fn parse_proxy_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configured proxies in random order, followed by a direct connection.
/// Built fresh for every fetch so load spreads across the pool.
pub fn candidate_sequence<R: Rng + ?Sized>(proxies: &[String], rng: &mut R) -> Vec<ProxyCandidate> {
    let mut shuffled = proxies.to_vec();
    shuffled.shuffle(rng);

    shuffled
        .into_iter()
        .map(ProxyCandidate::Proxy)
        .chain(std::iter::once(ProxyCandidate::Direct))
        .collect()
}

/// Hide `user:pass@` so proxy credentials never reach the logs.
fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        (None, Some(at)) => format!("***@{}", &url[at + 1..]),
        _ => url.to_string(),
    }
}
