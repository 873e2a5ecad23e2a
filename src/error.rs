use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SnafuError {
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
  #[snafu(display("block {height} not found"))]
  BlockNotFound { height: u32 },
  #[snafu(display(
    "environment variable `{variable}` not valid unicode: `{}`",
    value.to_string_lossy()
  ))]
  EnvVarUnicode {
    backtrace: Backtrace,
    value: OsString,
    variable: String,
  },
  #[snafu(display("extraction interrupted before block {height}"))]
  Interrupted { height: u32 },
  #[snafu(display("invalid height range {start}..={stop}"))]
  InvalidRange { start: u32, stop: u32 },
  #[snafu(display("malformed ring in input {input} of transaction {transaction}"))]
  RingDecode {
    source: cryptonote::DecodeError,
    transaction: Hash,
    input: usize,
  },
  #[snafu(display("node call `{method}` failed with code {code}: {message}"))]
  Rpc {
    method: String,
    code: i64,
    message: String,
  },
  #[snafu(display(
    "database `{}` already holds blocks up to {height}, past the requested stop {stop}, use `--fresh` to replace them",
    path.display()
  ))]
  StoreAhead { path: PathBuf, height: u32, stop: u32 },
  #[snafu(display(
    "database `{}` holds rows from a different extraction, use `--fresh` to replace them",
    path.display()
  ))]
  StoreNotEmpty { path: PathBuf },
  #[snafu(display("transaction {hash} in block {height} not found"))]
  TransactionNotFound { hash: Hash, height: u32 },
}

impl From<Error> for SnafuError {
  fn from(err: Error) -> SnafuError {
    Self::Anyhow { err }
  }
}

/// `snafu::ResultExt::context` under a name that does not collide with
/// `anyhow::Context::context`.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}
