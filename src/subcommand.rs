use super::*;

pub mod extract;
pub mod info;
pub mod settings;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Extract inputs, outputs, and ring references from the node")]
  Extract(extract::Extract),
  #[command(about = "Print database statistics")]
  Info,
  #[command(about = "Print settings")]
  Settings,
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Extract(extract) => extract.run(settings),
      Self::Info => info::run(settings),
      Self::Settings => settings::run(settings),
    }
  }
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;
