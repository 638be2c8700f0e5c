use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_WALLET_PATH: &str = "factom_wallet.db";
pub const DEFAULT_UNLOCK_SECS: u64 = 300;

#[derive(Debug, Parser)]
#[command(name = "factom-walletd", version, about = "Factom wallet daemon")]
pub struct Opt {
    #[arg(short = 'w', long = "wallet", default_value = DEFAULT_WALLET_PATH, help = "Wallet database directory")]
    pub wallet_path: PathBuf,
    #[arg(short = 'p', long = "port", default_value_t = 8089, help = "Port to serve JSON-RPC on")]
    pub port: u16,
    #[arg(long = "bind", default_value = "127.0.0.1", help = "Interface to listen on")]
    pub bind: String,
    #[arg(short = 's', long = "factomd", help = "factomd host:port, overrides config")]
    pub factomd_server: Option<String>,
    #[arg(short = 'c', long = "config", help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long = "rpc-user", requires = "rpc_password", help = "Basic auth user for clients")]
    pub rpc_user: Option<String>,
    #[arg(long = "rpc-password", requires = "rpc_user", help = "Basic auth password for clients")]
    pub rpc_password: Option<String>,
    #[arg(
        long = "encrypt",
        value_name = "PASSPHRASE",
        help = "Encrypt a new wallet, or unlock an encrypted one at start"
    )]
    pub passphrase: Option<String>,
    #[arg(long = "unlock-secs", default_value_t = DEFAULT_UNLOCK_SECS, help = "How long --encrypt unlocks for")]
    pub unlock_secs: u64,
    #[arg(long = "import-v1", value_name = "PATH", help = "Import every key from a version 1 wallet")]
    pub import_v1: Option<PathBuf>,
    #[arg(long = "ec-rate", help = "Fixed EC rate instead of asking factomd")]
    pub ec_rate: Option<u64>,
    #[arg(long = "tls", requires_all = ["tls_cert", "tls_key"], help = "Serve HTTPS instead of HTTP")]
    pub tls: bool,
    #[arg(long = "tls-cert", value_name = "PEM", requires = "tls", help = "Certificate chain for --tls")]
    pub tls_cert: Option<PathBuf>,
    #[arg(long = "tls-key", value_name = "PEM", requires = "tls", help = "Private key for --tls")]
    pub tls_key: Option<PathBuf>,
}

impl Opt {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Certificate and key when `--tls` is on
    pub fn tls_files(&self) -> Option<(PathBuf, PathBuf)> {
        if !self.tls {
            return None;
        }
        Some((self.tls_cert.clone()?, self.tls_key.clone()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opt = Opt::parse_from(["factom-walletd"]);
        assert_eq!(opt.wallet_path, PathBuf::from(DEFAULT_WALLET_PATH));
        assert_eq!(opt.listen_addr(), "127.0.0.1:8089");
        assert!(opt.passphrase.is_none());
        assert_eq!(opt.unlock_secs, DEFAULT_UNLOCK_SECS);
    }

    #[test]
    fn test_flags() {
        let opt = Opt::parse_from([
            "factom-walletd",
            "-p",
            "9000",
            "-s",
            "courtesy-node.factom.com:80",
            "--rpc-user",
            "u",
            "--rpc-password",
            "p",
            "--ec-rate",
            "1000",
        ]);
        assert_eq!(opt.port, 9000);
        assert_eq!(opt.factomd_server.as_deref(), Some("courtesy-node.factom.com:80"));
        assert_eq!(opt.rpc_user.as_deref(), Some("u"));
        assert_eq!(opt.ec_rate, Some(1000));
    }

    #[test]
    fn test_tls_flags() {
        let opt = Opt::parse_from([
            "factom-walletd",
            "--tls",
            "--tls-cert",
            "walletd.pem",
            "--tls-key",
            "walletd.key",
        ]);
        assert_eq!(
            opt.tls_files(),
            Some((PathBuf::from("walletd.pem"), PathBuf::from("walletd.key")))
        );
        assert!(Opt::parse_from(["factom-walletd"]).tls_files().is_none());
        assert!(Opt::try_parse_from(["factom-walletd", "--tls"]).is_err());
        assert!(Opt::try_parse_from(["factom-walletd", "--tls-cert", "walletd.pem"]).is_err());
    }

    #[test]
    fn test_rpc_user_needs_password() {
        assert!(Opt::try_parse_from(["factom-walletd", "--rpc-user", "u"]).is_err());
    }
}
