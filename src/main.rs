// factom-walletd: serves a local wallet over JSON-RPC
use clap::Parser;
use factom_client::cli::Opt;
use factom_client::config::{Config, Credentials};
use factom_client::network::Client;
use factom_client::storage::WalletDb;
use factom_client::wallet::{Wallet, WalletServer};
use log::{error, info, LevelFilter};
use std::process;
use std::sync::Arc;

fn main() {
    // RUST_LOG still wins over the default filter
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();
    if let Err(e) = run(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(opt.config.as_deref())?;
    if let Some(server) = &opt.factomd_server {
        config.set_factomd_server(server);
    }
    let client = Client::from_config(&config)?;
    info!("Using factomd at {}", client.factomd_url());

    let mut db = WalletDb::open(&opt.wallet_path)?;
    if let Some(passphrase) = &opt.passphrase {
        if !db.is_encrypted() {
            db.init_encryption(passphrase)?;
            info!("Encrypted wallet at {}", opt.wallet_path.display());
        }
    }

    let mut wallet = Wallet::open(db, Some(client))?;
    if let Some(rate) = opt.ec_rate {
        wallet = wallet.with_ec_rate(rate);
    }
    if wallet.is_encrypted() {
        if let Some(passphrase) = &opt.passphrase {
            wallet.unlock(passphrase, opt.unlock_secs)?;
        }
    }

    if let Some(path) = &opt.import_v1 {
        let imported = wallet.import_legacy(path)?;
        info!("Imported {} keys from {}", imported.len(), path.display());
    }

    let credentials = match (&opt.rpc_user, &opt.rpc_password) {
        (Some(user), Some(password)) => Some(Credentials::new(user, password)),
        _ => None,
    };
    let mut server = WalletServer::bind(&opt.listen_addr(), Arc::new(wallet), credentials)?;
    if let Some((cert, key)) = opt.tls_files() {
        server = server.with_tls(cert, key);
    }
    server.run()?;
    Ok(())
}
