use super::*;

const DEFAULT_NODE_RPC_URL: &str = "http://127.0.0.1:8081/json_rpc";

#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
  commit_interval: Option<u32>,
  config: Option<PathBuf>,
  data_dir: Option<PathBuf>,
  database: Option<PathBuf>,
  node_rpc_password: Option<String>,
  node_rpc_url: Option<String>,
  node_rpc_username: Option<String>,
  write_errors: Option<WriteErrorPolicy>,
}

impl Settings {
  pub fn load(options: Options) -> Result<Settings> {
    let mut env = BTreeMap::<String, String>::new();

    for (var, value) in env::vars_os() {
      let Some(var) = var.to_str() else {
        continue;
      };

      let Some(key) = var.strip_prefix("RINGSCAN_") else {
        continue;
      };

      env.insert(
        key.into(),
        value.into_string().map_err(|value| SnafuError::EnvVarUnicode {
          backtrace: Backtrace::capture(),
          value,
          variable: var.into(),
        })?,
      );
    }

    Self::merge(options, env)
  }

  pub fn merge(options: Options, env: BTreeMap<String, String>) -> Result<Self> {
    let settings = Settings::from_options(options).or(Settings::from_env(env)?);

    let config_path = match &settings.config {
      Some(path) => Some(path.clone()),
      None => {
        let path = settings.data_dir_or_default()?.join("ringscan.yaml");
        path.exists().then_some(path)
      }
    };

    let config = match &config_path {
      Some(path) => {
        log::info!("Loading configuration from `{}`", path.display());
        serde_yaml::from_reader(
          File::open(path)
            .with_context(|| format!("failed to open config file `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to parse config file `{}`", path.display()))?
      }
      None => Settings::default(),
    };

    let settings = Settings {
      config: config_path,
      ..settings
    }
    .or(config)
    .or_defaults()?;

    ensure!(
      settings.commit_interval != Some(0),
      "commit interval must be at least one block"
    );

    Ok(settings)
  }

  pub(crate) fn or(self, source: Settings) -> Self {
    Self {
      commit_interval: self.commit_interval.or(source.commit_interval),
      config: self.config.or(source.config),
      data_dir: self.data_dir.or(source.data_dir),
      database: self.database.or(source.database),
      node_rpc_password: self.node_rpc_password.or(source.node_rpc_password),
      node_rpc_url: self.node_rpc_url.or(source.node_rpc_url),
      node_rpc_username: self.node_rpc_username.or(source.node_rpc_username),
      write_errors: self.write_errors.or(source.write_errors),
    }
  }

  pub(crate) fn from_options(options: Options) -> Self {
    Self {
      commit_interval: options.commit_interval,
      config: options.config,
      data_dir: options.data_dir,
      database: options.database,
      node_rpc_password: options.node_rpc_password,
      node_rpc_url: options.node_rpc_url,
      node_rpc_username: options.node_rpc_username,
      write_errors: options.write_errors,
    }
  }

  pub(crate) fn from_env(env: BTreeMap<String, String>) -> Result<Self> {
    let get_string = |key: &str| env.get(key).cloned();

    let get_path = |key: &str| env.get(key).map(PathBuf::from);

    let get_u32 = |key: &str| {
      env
        .get(key)
        .map(|value| {
          value
            .parse::<u32>()
            .with_context(|| format!("failed to parse environment variable RINGSCAN_{key} as u32"))
        })
        .transpose()
    };

    Ok(Self {
      commit_interval: get_u32("COMMIT_INTERVAL")?,
      config: get_path("CONFIG"),
      data_dir: get_path("DATA_DIR"),
      database: get_path("DATABASE"),
      node_rpc_password: get_string("NODE_RPC_PASSWORD"),
      node_rpc_url: get_string("NODE_RPC_URL"),
      node_rpc_username: get_string("NODE_RPC_USERNAME"),
      write_errors: env
        .get("WRITE_ERRORS")
        .map(|value| {
          WriteErrorPolicy::from_str(value, true).map_err(|err| {
            anyhow!("failed to parse environment variable RINGSCAN_WRITE_ERRORS: {err}")
          })
        })
        .transpose()?,
    })
  }

  fn data_dir_or_default(&self) -> Result<PathBuf> {
    match &self.data_dir {
      Some(data_dir) => Ok(data_dir.clone()),
      None => Ok(
        dirs::data_dir()
          .context("could not get data dir")?
          .join("ringscan"),
      ),
    }
  }

  pub(crate) fn or_defaults(self) -> Result<Self> {
    let data_dir = self.data_dir_or_default()?;

    Ok(Self {
      commit_interval: self.commit_interval,
      config: self.config,
      database: Some(
        self
          .database
          .unwrap_or_else(|| data_dir.join("ringscan.sqlite3")),
      ),
      data_dir: Some(data_dir),
      node_rpc_password: self.node_rpc_password,
      node_rpc_url: Some(
        self
          .node_rpc_url
          .unwrap_or_else(|| DEFAULT_NODE_RPC_URL.into()),
      ),
      node_rpc_username: self.node_rpc_username,
      write_errors: Some(self.write_errors.unwrap_or_default()),
    })
  }

  pub fn commit_interval(&self) -> Option<u32> {
    self.commit_interval
  }

  pub fn database(&self) -> PathBuf {
    self.database.as_ref().unwrap().into()
  }

  pub fn node_rpc_url(&self) -> &str {
    self.node_rpc_url.as_deref().unwrap()
  }

  /// Credentials are only used when both username and password are set.
  pub fn node_rpc_credentials(&self) -> Option<(String, String)> {
    Some((
      self.node_rpc_username.clone()?,
      self.node_rpc_password.clone()?,
    ))
  }

  pub fn write_errors(&self) -> WriteErrorPolicy {
    self.write_errors.unwrap_or_default()
  }

  /// Settings as printed by `ringscan settings`, with the password hidden.
  pub fn redacted(&self) -> Self {
    Self {
      node_rpc_password: self
        .node_rpc_password
        .as_ref()
        .map(|_| "<redacted>".into()),
      ..self.clone()
    }
  }
}
