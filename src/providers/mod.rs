pub mod hosted;
pub mod local;

use std::time::Duration;

use reqwest::Client;

pub use hosted::HostedClient;
pub use local::LocalClient;

/// Shared HTTP client for both provider backends. Connection pooling is
/// per-process; per-request timeouts are applied at call sites.
pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
}

/// Quick reachability probe for the local daemon, used during provider
/// auto-detection. Anything short of a 2xx from `/api/tags` within two
/// seconds counts as unreachable.
pub async fn probe_daemon(base_url: &str) -> bool {
    let client = build_http_client();
    let url = format!("{base_url}/api/tags");
    match client
        .get(&url)
        .timeout(Duration::from_secs(2))
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}
