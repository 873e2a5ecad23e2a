use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
  #[arg(
    long,
    help = "Commit to the database every <COMMIT_INTERVAL> blocks. [default: once, at the end]"
  )]
  pub(crate) commit_interval: Option<u32>,
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, alias = "datadir", help = "Store data in <DATA_DIR>.")]
  pub(crate) data_dir: Option<PathBuf>,
  #[arg(
    long,
    help = "Write rows to SQLite database at <DATABASE>. [default: <DATA_DIR>/ringscan.sqlite3]"
  )]
  pub(crate) database: Option<PathBuf>,
  #[arg(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(long, help = "Authenticate to node RPC with <NODE_RPC_PASSWORD>.")]
  pub(crate) node_rpc_password: Option<String>,
  #[arg(
    long,
    help = "Connect to node JSON-RPC at <NODE_RPC_URL>. [default: http://127.0.0.1:8081/json_rpc]"
  )]
  pub(crate) node_rpc_url: Option<String>,
  #[arg(long, help = "Authenticate to node RPC as <NODE_RPC_USERNAME>.")]
  pub(crate) node_rpc_username: Option<String>,
  #[arg(
    long,
    global = true,
    value_enum,
    help = "On a failed row write, <WRITE_ERRORS> the run or skip the row. [default: abort]"
  )]
  pub(crate) write_errors: Option<WriteErrorPolicy>,
}
