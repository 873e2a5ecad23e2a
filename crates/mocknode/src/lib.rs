use {
  cryptonote::{Block, Hash},
  jsonrpc_core::{ErrorCode, IoHandler, Params},
  jsonrpc_http_server::{CloseHandle, ServerBuilder},
  serde::Deserialize,
  serde_json::{Value, json},
  std::{
    sync::{Arc, Mutex, MutexGuard},
    thread,
  },
};

pub use chain::{MemoryChain, TransactionTemplate};

mod chain;

const WRONG_PARAM: i64 = -1;
const TOO_BIG_HEIGHT: i64 = -2;

/// Misbehavior to inject into responses.
#[derive(Clone, Debug, PartialEq)]
pub enum Fault {
  /// Report this `status` instead of `OK`.
  Status(String),
  /// Answer `f_block_json` with a hash other than the one asked for.
  BlockHash,
}

pub fn builder() -> Builder {
  Builder {
    chain: MemoryChain::new(),
  }
}

pub fn spawn() -> Handle {
  builder().build()
}

pub struct Builder {
  chain: MemoryChain,
}

impl Builder {
  pub fn chain(self, chain: MemoryChain) -> Self {
    Self { chain }
  }

  pub fn build(self) -> Handle {
    let server = Arc::new(Server {
      chain: Mutex::new(self.chain),
      fault: Mutex::new(None),
    });

    let mut io = IoHandler::default();

    register(&mut io, "getblockcount", &server, Server::get_block_count);
    register(&mut io, "on_getblockhash", &server, Server::on_get_block_hash);
    register(&mut io, "f_block_json", &server, Server::f_block_json);
    register(
      &mut io,
      "gettransactiondetails",
      &server,
      Server::get_transaction_details,
    );

    let rpc_server = ServerBuilder::new(io)
      .threads(1)
      .start_http(&"127.0.0.1:0".parse().unwrap())
      .unwrap();

    let close_handle = rpc_server.close_handle();
    let port = rpc_server.address().port();

    thread::spawn(|| rpc_server.wait());

    Handle {
      close_handle: Some(close_handle),
      port,
      server,
    }
  }
}

fn register<F>(io: &mut IoHandler, name: &str, server: &Arc<Server>, method: F)
where
  F: Fn(&Server, Params) -> jsonrpc_core::Result<Value> + Send + Sync + 'static,
{
  let server = server.clone();
  io.add_sync_method(name, move |params| method(&server, params));
}

fn error(code: i64, message: impl Into<String>) -> jsonrpc_core::Error {
  jsonrpc_core::Error {
    code: ErrorCode::ServerError(code),
    message: message.into(),
    data: None,
  }
}

#[derive(Deserialize)]
struct HashParams {
  hash: Hash,
}

struct Server {
  chain: Mutex<MemoryChain>,
  fault: Mutex<Option<Fault>>,
}

impl Server {
  fn chain(&self) -> MutexGuard<MemoryChain> {
    self.chain.lock().unwrap()
  }

  fn fault(&self) -> Option<Fault> {
    self.fault.lock().unwrap().clone()
  }

  fn status(&self) -> String {
    match self.fault() {
      Some(Fault::Status(status)) => status,
      _ => "OK".into(),
    }
  }

  fn get_block_count(&self, params: Params) -> jsonrpc_core::Result<Value> {
    params.expect_no_params()?;

    Ok(json!({
      "count": self.chain().height() + 1,
      "status": self.status(),
    }))
  }

  fn on_get_block_hash(&self, params: Params) -> jsonrpc_core::Result<Value> {
    let (height,) = params.parse::<(u32,)>()?;

    match self.chain().block(height) {
      Some(block) => Ok(json!(block.hash)),
      None => Err(error(TOO_BIG_HEIGHT, "Too big height")),
    }
  }

  fn f_block_json(&self, params: Params) -> jsonrpc_core::Result<Value> {
    let HashParams { hash } = params.parse()?;

    let chain = self.chain();

    let Some(block) = chain.block_by_hash(hash) else {
      return Err(error(WRONG_PARAM, "Block not found"));
    };

    let reported_hash = if self.fault() == Some(Fault::BlockHash) {
      Hash([0xff; 32])
    } else {
      block.hash
    };

    Ok(json!({
      "block": {
        "height": block.height,
        "hash": reported_hash,
        "timestamp": block.timestamp,
        "transactions": block
          .transaction_hashes
          .iter()
          .map(|hash| json!({ "hash": hash }))
          .collect::<Vec<Value>>(),
      },
      "status": self.status(),
    }))
  }

  fn get_transaction_details(&self, params: Params) -> jsonrpc_core::Result<Value> {
    let HashParams { hash } = params.parse()?;

    match self.chain().transaction(hash) {
      Some(transaction) => Ok(json!({
        "transaction": transaction,
        "status": self.status(),
      })),
      None => Err(error(WRONG_PARAM, "Transaction not found")),
    }
  }
}

pub struct Handle {
  close_handle: Option<CloseHandle>,
  port: u16,
  server: Arc<Server>,
}

impl Handle {
  pub fn url(&self) -> String {
    format!("http://127.0.0.1:{}/json_rpc", self.port)
  }

  pub fn state(&self) -> MutexGuard<MemoryChain> {
    self.server.chain()
  }

  pub fn push_block(&self, templates: &[TransactionTemplate]) -> Block {
    self.state().push_block(templates)
  }

  pub fn fail(&self, fault: Fault) {
    *self.server.fault.lock().unwrap() = Some(fault);
  }
}

impl Drop for Handle {
  fn drop(&mut self) {
    if let Some(close_handle) = self.close_handle.take() {
      close_handle.close();
    }
  }
}
