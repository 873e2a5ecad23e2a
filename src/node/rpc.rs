use super::*;

// CryptoNote daemon error codes
const WRONG_PARAM: i64 = -1;
const TOO_BIG_HEIGHT: i64 = -2;

const STATUS_OK: &str = "OK";

const NO_PARAMS: [u8; 0] = [];

#[derive(Serialize)]
struct Request<'a, P> {
  jsonrpc: &'static str,
  id: u64,
  method: &'a str,
  params: P,
}

#[derive(Deserialize)]
struct Response<T> {
  result: Option<T>,
  error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
  code: i64,
  message: String,
}

#[derive(Serialize)]
struct HashParams {
  hash: Hash,
}

#[derive(Deserialize)]
struct BlockCount {
  count: u64,
  status: String,
}

#[derive(Deserialize)]
struct BlockJson {
  height: u32,
  hash: Hash,
  #[serde(default)]
  timestamp: u64,
  transactions: Vec<TransactionShort>,
}

#[derive(Deserialize)]
struct TransactionShort {
  hash: Hash,
}

#[derive(Deserialize)]
struct BlockResponse {
  block: BlockJson,
  status: String,
}

#[derive(Deserialize)]
struct TransactionResponse {
  transaction: TransactionDetails,
  status: String,
}

/// JSON-RPC client for a CryptoNote daemon's `/json_rpc` endpoint.
pub struct RpcClient {
  client: reqwest::blocking::Client,
  credentials: Option<(String, String)>,
  id: AtomicU64,
  url: String,
}

impl RpcClient {
  pub fn new(url: impl Into<String>, credentials: Option<(String, String)>) -> Result<Self> {
    let client = reqwest::blocking::Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .context("failed to build HTTP client")?;

    Ok(Self {
      client,
      credentials,
      id: AtomicU64::new(0),
      url: url.into(),
    })
  }

  fn call<P: Serialize, T: DeserializeOwned>(
    &self,
    method: &str,
    params: P,
  ) -> Result<std::result::Result<T, JsonRpcError>> {
    let id = self.id.fetch_add(1, atomic::Ordering::Relaxed);

    log::trace!("calling `{method}` on {} with id {id}", self.url);

    let mut request = self.client.post(&self.url).json(&Request {
      jsonrpc: "2.0",
      id,
      method,
      params,
    });

    if let Some((username, password)) = &self.credentials {
      request = request.basic_auth(username, Some(password));
    }

    let response = request
      .send()
      .with_context(|| format!("failed to call `{method}` on {}", self.url))?
      .error_for_status()
      .with_context(|| format!("`{method}` returned an HTTP error"))?
      .json::<Response<T>>()
      .with_context(|| format!("failed to parse `{method}` response"))?;

    match (response.result, response.error) {
      (_, Some(err)) => Ok(Err(err)),
      (Some(result), None) => Ok(Ok(result)),
      (None, None) => bail!("`{method}` returned neither result nor error"),
    }
  }

  /// Calls `method`, mapping the node's `not_found` error code to `None`.
  fn call_optional<P: Serialize, T: DeserializeOwned>(
    &self,
    method: &str,
    params: P,
    not_found: i64,
  ) -> Result<Option<T>> {
    match self.call(method, params)? {
      Ok(result) => Ok(Some(result)),
      Err(err) if err.code == not_found => {
        log::debug!("`{method}` found nothing: {}", err.message);
        Ok(None)
      }
      Err(err) => Err(rpc_error(method, err)),
    }
  }
}

fn rpc_error(method: &str, err: JsonRpcError) -> Error {
  SnafuError::Rpc {
    method: method.into(),
    code: err.code,
    message: err.message,
  }
  .into()
}

fn check_status(method: &str, status: &str) -> Result {
  ensure!(
    status == STATUS_OK,
    "`{method}` returned status `{status}`"
  );
  Ok(())
}

impl ChainSource for RpcClient {
  fn top_height(&self) -> Result<u32> {
    let count = self
      .call::<_, BlockCount>("getblockcount", NO_PARAMS)?
      .map_err(|err| rpc_error("getblockcount", err))?;

    check_status("getblockcount", &count.status)?;

    let top = count
      .count
      .checked_sub(1)
      .context("node reported an empty chain")?;

    u32::try_from(top).context("node reported a height that does not fit in 32 bits")
  }

  fn block_at_height(&self, height: u32) -> Result<Option<Block>> {
    let Some(hash) = self.call_optional::<_, Hash>("on_getblockhash", [height], TOO_BIG_HEIGHT)?
    else {
      return Ok(None);
    };

    let Some(response) =
      self.call_optional::<_, BlockResponse>("f_block_json", HashParams { hash }, WRONG_PARAM)?
    else {
      return Ok(None);
    };

    check_status("f_block_json", &response.status)?;

    let block = response.block;

    ensure!(
      block.height == height && block.hash == hash,
      "node returned block {} at height {} when asked for {hash} at height {height}",
      block.hash,
      block.height,
    );

    Ok(Some(Block {
      height: block.height,
      hash: block.hash,
      timestamp: block.timestamp,
      transaction_hashes: block
        .transactions
        .into_iter()
        .map(|transaction| transaction.hash)
        .collect(),
    }))
  }

  fn transaction_details(&self, hash: Hash) -> Result<Option<TransactionDetails>> {
    let Some(response) = self.call_optional::<_, TransactionResponse>(
      "gettransactiondetails",
      HashParams { hash },
      WRONG_PARAM,
    )?
    else {
      return Ok(None);
    };

    check_status("gettransactiondetails", &response.status)?;

    ensure!(
      response.transaction.hash == hash,
      "node returned transaction {} when asked for {hash}",
      response.transaction.hash,
    );

    Ok(Some(response.transaction))
  }
}
