// Shared helpers for the integration tests: a throwaway HTTP responder that
// stands in for factomd, and clients pointed at local ports.
#![allow(dead_code)]

use factom_client::config::{Credentials, Settings};
use factom_client::network::Client;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

pub const FS_ZERO: &str = "Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj";
pub const FA_ZERO: &str = "FA1zT4aFpEvcnPqPCigB3fvGu4Q4mTXY22iiuV69DqE1pNhdF2MC";
pub const ES_ZERO: &str = "Es2Rf7iM6PdsqfYCo3D1tnAR65SkLENyWJG1deUzpRMQmbh9F3eG";
pub const EC_ZERO: &str = "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r";

/// What the fake node answers: an HTTP status and a JSON body
pub type Reply = (u16, Value);

/// Answers every POST with `handler(method, params)` wrapped in an envelope
/// carrying the caller's id. Handlers that return a full envelope (anything
/// with an `error` key) are sent as is.
pub struct FakeNode {
    pub addr: SocketAddr,
    pub seen: Arc<Mutex<Vec<Value>>>,
}

impl FakeNode {
    pub fn start<F>(handler: F) -> FakeNode
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);
        let log = Arc::clone(&seen);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                thread::spawn(move || serve_one(stream, handler.as_ref(), &log));
            }
        });
        FakeNode { addr, seen }
    }

    pub fn server(&self) -> String {
        self.addr.to_string()
    }

    pub fn methods(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

fn serve_one<F>(mut stream: TcpStream, handler: &F, log: &Mutex<Vec<Value>>)
where
    F: Fn(&str, &Value) -> Reply,
{
    let mut reader = BufReader::new(&mut stream);
    let mut line = String::new();
    let mut content_length = 0usize;
    reader.read_line(&mut line).unwrap();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap() == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).unwrap();
    let request: Value = serde_json::from_slice(&body).unwrap();
    log.lock().unwrap().push(request.clone());

    let method = request["method"].as_str().unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let (status, reply) = handler(method, &params);
    let envelope = if reply.get("error").is_some() || status != 200 {
        reply
    } else {
        json!({"jsonrpc": "2.0", "id": request["id"], "result": reply})
    };
    let out = serde_json::to_vec(&envelope).unwrap();
    let head = format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        out.len()
    );
    stream.write_all(head.as_bytes()).unwrap();
    stream.write_all(&out).unwrap();
}

pub fn rpc_error(code: i64, message: &str, data: Option<&str>) -> Value {
    let mut error = json!({"code": code, "message": message});
    if let Some(data) = data {
        error["data"] = json!(data);
    }
    json!({"jsonrpc": "2.0", "id": 0, "error": error})
}

pub fn client(factomd: &str, walletd: &str, walletd_credentials: Option<Credentials>) -> Client {
    let settings = Settings {
        factomd_server: factomd.to_string(),
        walletd_server: walletd.to_string(),
        walletd_credentials,
        ..Settings::default()
    };
    Client::new(&settings).unwrap()
}
