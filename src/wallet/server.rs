use crate::config::Credentials;
use crate::error::{FactomError, Result};
use crate::network::{error_message, Request, Response, RpcError, PARSE_ERROR};
use crate::wallet::api::handle_request;
use crate::wallet::Wallet;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Request as HttpRequest, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response as HttpResponse},
    routing::post,
    serve, Json, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use data_encoding::BASE64;
use log::{debug, error, info, warn};
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

pub const DEFAULT_WALLETD_PORT: u16 = 8089;
pub const RPC_PATH: &str = "/v2";
// Larger bodies get a 413 before the handler runs
pub const MAX_BODY_LEN: usize = 1 << 20;

/// Certificate chain and private key, both PEM
#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Clone)]
struct ServerState {
    wallet: Arc<Wallet>,
    credentials: Option<Arc<Credentials>>,
}

/// JSON-RPC over HTTP(S) front end for a wallet
///
/// The socket is bound in [`WalletServer::bind`] so callers can learn the
/// port before anything is served; the tokio runtime only exists once
/// [`WalletServer::run`] is called.
pub struct WalletServer {
    listener: TcpListener,
    state: ServerState,
    tls: Option<TlsFiles>,
}

impl WalletServer {
    pub fn bind(addr: &str, wallet: Arc<Wallet>, credentials: Option<Credentials>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| FactomError::Transport(format!("Failed to bind to {addr}: {e}")))?;
        Ok(WalletServer {
            listener,
            state: ServerState {
                wallet,
                credentials: credentials.map(Arc::new),
            },
            tls: None,
        })
    }

    /// Serve HTTPS with the given PEM files instead of plain HTTP
    pub fn with_tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls = Some(TlsFiles {
            cert: cert.into(),
            key: key.into(),
        });
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Block the calling thread serving requests
    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.serve())
    }

    /// Run on a background thread
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            if let Err(e) = self.run() {
                error!("Wallet server stopped: {e}");
            }
        })
    }

    pub async fn serve(self) -> Result<()> {
        let addr = self.local_addr()?;
        let app = router(self.state);
        self.listener.set_nonblocking(true)?;

        match self.tls {
            Some(tls) => {
                let config = rustls_config(&tls).await?;
                info!("Wallet server listening on https://{addr}{RPC_PATH}");
                axum_server::from_tcp_rustls(self.listener, config)
                    .serve(app.into_make_service())
                    .await?;
            }
            None => {
                let listener = tokio::net::TcpListener::from_std(self.listener)?;
                info!("Wallet server listening on http://{addr}{RPC_PATH}");
                serve(listener, app.into_make_service()).await?;
            }
        }
        Ok(())
    }
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route(RPC_PATH, post(rpc))
        .layer(DefaultBodyLimit::max(MAX_BODY_LEN))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}

async fn rustls_config(tls: &TlsFiles) -> Result<RustlsConfig> {
    // Only ring is compiled in; a second install is a no-op error
    let _ = rustls::crypto::ring::default_provider().install_default();
    RustlsConfig::from_pem_file(&tls.cert, &tls.key)
        .await
        .map_err(|e| {
            FactomError::Config(format!(
                "{} / {}: {e}",
                tls.cert.display(),
                tls.key.display()
            ))
        })
}

async fn rpc(State(state): State<ServerState>, body: Bytes) -> HttpResponse {
    // sled and the blocking factomd client must stay off the async workers
    let wallet = Arc::clone(&state.wallet);
    let answered = tokio::task::spawn_blocking(move || answer(&wallet, &body)).await;
    match answered {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("RPC handler failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn answer(wallet: &Wallet, body: &[u8]) -> Response {
    match serde_json::from_slice::<Request>(body) {
        Ok(rpc) => handle_request(wallet, &rpc),
        Err(e) => {
            debug!("Unparseable request body: {e}");
            Response::failure(
                serde_json::Value::Null,
                RpcError::new(PARSE_ERROR, error_message(PARSE_ERROR), None),
            )
        }
    }
}

async fn require_auth(
    State(state): State<ServerState>,
    request: HttpRequest,
    next: Next,
) -> HttpResponse {
    if let Some(expected) = &state.credentials {
        let given = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        if !authorized(given, expected) {
            warn!("Rejected unauthenticated request to {}", request.uri());
            return (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"factom-walletd\"")],
            )
                .into_response();
        }
    }
    next.run(request).await
}

fn authorized(header: Option<&str>, expected: &Credentials) -> bool {
    let Some(encoded) = header.and_then(|h| h.strip_prefix("Basic ")) else {
        return false;
    };
    let Ok(decoded) = BASE64.decode(encoded.trim().as_bytes()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    match decoded.split_once(':') {
        Some((user, password)) => user == expected.user && password == expected.password,
        None => false,
    }
}
