use crate::config::{Config, Credentials, Settings, GLOBAL_CONFIG};
use crate::error::{FactomError, Result};
use crate::network::jsonrpc::{Request, Response};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide request id; the first call returns 1
pub fn next_request_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Which daemon a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Factomd,
    Walletd,
}

#[derive(Debug, Clone)]
struct Endpoint {
    url: String,
    credentials: Option<Credentials>,
}

/// Blocking JSON-RPC client for one factomd and one walletd
///
/// Every call is a fresh POST; nothing is retried.
#[derive(Debug, Clone)]
pub struct Client {
    factomd: Endpoint,
    walletd: Endpoint,
    http: HttpClient,
}

/// `host:port` becomes `scheme://host:port/v2`; a full URL is kept as given
fn endpoint_url(server: &str, tls: bool) -> String {
    if server.contains("://") {
        return server.to_string();
    }
    let scheme = if tls { "https" } else { "http" };
    format!("{scheme}://{}/v2", server.trim_end_matches('/'))
}

fn load_certificate(path: &Path) -> Result<reqwest::Certificate> {
    let pem = std::fs::read(path)
        .map_err(|e| FactomError::Config(format!("{}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| FactomError::Config(e.to_string()))
}

impl Client {
    pub fn new(settings: &Settings) -> Result<Client> {
        // No idle pool: each call opens its own connection
        let mut builder = HttpClient::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(0);
        for cert in [&settings.factomd_cert, &settings.walletd_cert].into_iter().flatten() {
            builder = builder.add_root_certificate(load_certificate(cert)?);
        }
        let http = builder.build()?;

        Ok(Client {
            factomd: Endpoint {
                url: endpoint_url(&settings.factomd_server, settings.factomd_tls),
                credentials: settings.factomd_credentials.clone(),
            },
            walletd: Endpoint {
                url: endpoint_url(&settings.walletd_server, settings.walletd_tls),
                credentials: settings.walletd_credentials.clone(),
            },
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Client> {
        Self::new(&config.snapshot())
    }

    /// Client for the process default configuration
    pub fn from_global() -> Result<Client> {
        Self::from_config(&GLOBAL_CONFIG)
    }

    pub fn factomd_url(&self) -> &str {
        &self.factomd.url
    }

    pub fn walletd_url(&self) -> &str {
        &self.walletd.url
    }

    fn endpoint(&self, target: Target) -> &Endpoint {
        match target {
            Target::Factomd => &self.factomd,
            Target::Walletd => &self.walletd,
        }
    }

    /// Call a factomd method with a fresh id
    pub fn factomd_request<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        let request = Request::new(method, next_request_id(), params);
        self.send(Target::Factomd, &request)
    }

    /// Call a walletd method with a fresh id
    pub fn walletd_request<T: DeserializeOwned>(&self, method: &str, params: Option<Value>) -> Result<T> {
        let request = Request::new(method, next_request_id(), params);
        self.send(Target::Walletd, &request)
    }

    /// Post a prebuilt request, such as one returned by the compose functions
    pub fn send<T: DeserializeOwned>(&self, target: Target, request: &Request) -> Result<T> {
        let endpoint = self.endpoint(target);
        debug!("{} id={} -> {}", request.method, request.id, endpoint.url);

        let mut http_request = self.http.post(&endpoint.url).json(request);
        if let Some(creds) = &endpoint.credentials {
            http_request = http_request.basic_auth(&creds.user, Some(&creds.password));
        }
        let http_response = http_request.send()?;

        let status = http_response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(match target {
                Target::Walletd => FactomError::WalletCredentials,
                Target::Factomd => FactomError::Transport(format!("{status} from factomd")),
            });
        }

        let body = http_response.text()?;
        // factomd reports RPC failures with non-2xx codes and a JSON body,
        // so only fall back to the status when the body is not an envelope
        match serde_json::from_str::<Response>(&body) {
            Ok(response) => response.into_result(),
            Err(_) if !status.is_success() => {
                Err(FactomError::Transport(format!("{status}: {}", body.trim())))
            }
            Err(e) => Err(FactomError::Transport(format!("malformed response: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_increase() {
        let a = next_request_id();
        let b = next_request_id();
        assert!(a >= 1);
        assert!(b > a);
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(endpoint_url("localhost:8088", false), "http://localhost:8088/v2");
        assert_eq!(endpoint_url("wallet:8089", true), "https://wallet:8089/v2");
        assert_eq!(
            endpoint_url("https://api.factomd.net/v2", false),
            "https://api.factomd.net/v2"
        );
    }

    #[test]
    fn test_client_from_defaults() {
        let client = Client::new(&Settings::default()).unwrap();
        assert_eq!(client.factomd_url(), "http://localhost:8088/v2");
        assert_eq!(client.walletd_url(), "http://localhost:8089/v2");
    }

    #[test]
    fn test_factomd_tls_scheme() {
        let settings = Settings {
            factomd_server: "courtesy-node.factom.com:443".to_string(),
            factomd_tls: true,
            ..Settings::default()
        };
        let client = Client::new(&settings).unwrap();
        assert_eq!(client.factomd_url(), "https://courtesy-node.factom.com:443/v2");
        assert_eq!(client.walletd_url(), "http://localhost:8089/v2");

        let missing = Settings {
            factomd_cert: Some("/nonexistent/factomd.pem".into()),
            ..settings
        };
        assert!(matches!(Client::new(&missing), Err(FactomError::Config(_))));
    }

    #[test]
    fn test_missing_certificate_is_config_error() {
        let settings = Settings {
            walletd_tls: true,
            walletd_cert: Some("/nonexistent/walletd.pem".into()),
            ..Settings::default()
        };
        assert!(matches!(Client::new(&settings), Err(FactomError::Config(_))));
    }
}
