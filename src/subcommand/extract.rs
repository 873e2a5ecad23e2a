use {super::*, crate::index::{Extraction, Summary}};

#[derive(Debug, Parser)]
pub(crate) struct Extract {
  #[arg(long, default_value_t = 1, help = "Start extracting at block <FROM>.")]
  from: u32,
  #[arg(long, help = "Stop after block <TO>. [default: node's top block]")]
  to: Option<u32>,
  #[arg(long, help = "Delete rows of previous extractions before starting.")]
  fresh: bool,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub database: PathBuf,
  #[serde(flatten)]
  pub summary: Summary,
}

impl Extract {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let mut index = Index::open(&settings)?;

    let summary = index.update(
      &Extraction {
        start_height: self.from,
        stop_height: self.to,
        fresh: self.fresh,
      },
      &SHUTTING_DOWN,
    )?;

    Ok(Some(Box::new(Output {
      database: settings.database(),
      summary,
    })))
  }
}
