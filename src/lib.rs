//! Extracts ring-signature decoy sets from a CryptoNote node into an SQLite
//! database of inputs, outputs, and input-to-candidate references.

use {
  self::{
    arguments::Arguments,
    error::ResultExt,
    index::{
      Index,
      denominations::Denominations,
      store::{Checkpoint, InputRow, RefRow, Run, Store, WriteErrorPolicy},
    },
    node::{ChainSource, RpcClient},
    options::Options,
    settings::Settings,
    subcommand::{OutputFormat, Subcommand},
  },
  anyhow::{Context, Error, anyhow, bail, ensure},
  clap::{Parser, ValueEnum},
  cryptonote::{Amount, Block, GlobalIndex, Hash, OutputId, TransactionDetails},
  indicatif::{ProgressBar, ProgressStyle},
  log::log_enabled,
  serde::{Deserialize, Serialize, de::DeserializeOwned},
  snafu::{Backtrace, ErrorCompat, Snafu},
  std::{
    collections::{BTreeMap, HashMap},
    env,
    ffi::OsString,
    fs::{self, File},
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process,
    sync::atomic::{self, AtomicBool, AtomicU64},
    time::{Duration, Instant},
  },
};

pub use self::error::SnafuError;

pub mod arguments;
mod error;
pub mod index;
pub mod node;
pub mod options;
pub mod settings;
pub mod subcommand;

type Result<T = (), E = Error> = std::result::Result<T, E>;
type SnafuResult<T = (), E = SnafuError> = std::result::Result<T, E>;

pub static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

pub fn main() {
  env_logger::init();

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    eprintln!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");
  })
  .expect("Error setting <CTRL-C> handler");

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      if let SnafuError::Anyhow { err } = err {
        for (i, err) in err.chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if env::var_os("RUST_BACKTRACE")
          .map(|val| val == "1")
          .unwrap_or_default()
        {
          eprintln!("{}", err.backtrace());
        }
      } else {
        for (i, err) in err.iter_chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if let Some(backtrace) = err.backtrace() {
          eprintln!("backtrace:");
          eprintln!("{backtrace}");
        }
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
