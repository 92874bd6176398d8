use std::fs;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use xslforms::Encoding;
use xslforms::FieldProcessor;
use xslforms::FieldsError;
use xslforms::DEFAULT_MAX_POSITION;

const CONFIG_FILE: &str = "xslforms.toml";
const HIDDEN_CONFIG_FILE: &str = ".xslforms.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
    #[error("Invalid encoding setting")]
    Encoding(#[from] FieldsError),
}

/// How submitted fields are interpreted.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Encoding of raw request bytes.
    pub encoding: String,
    /// Whether repeated field names carry every value into multivalue fields.
    pub values_are_lists: bool,
    /// Whether selectors create the elements they point at.
    pub create_selectors: bool,
    /// Highest child position a field may address.
    pub max_position: usize,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encoding: Encoding::default().label().to_string(),
            values_are_lists: true,
            create_selectors: false,
            max_position: DEFAULT_MAX_POSITION,
            debug: false,
        }
    }
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("org", "xslforms", "xslforms")
            .map(|proj_dirs| proj_dirs.config_dir().join(CONFIG_FILE))
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok());

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            tracing::debug!(%path, "adding user settings");
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let full_toml_value: toml::Value = toml::from_str(&content)?;

            let table = ["tool", "xslforms"]
                .iter()
                .try_fold(&full_toml_value, |current, &key| current.get(key))
                .and_then(toml::Value::as_table);

            if let Some(table) = table {
                let table_string = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&table_string, FileFormat::Toml));
            }
        }

        for name in [HIDDEN_CONFIG_FILE, CONFIG_FILE] {
            builder = builder.add_source(
                File::from(project_root.join(name).as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// A field processor configured by these settings.
    pub fn processor(&self) -> Result<FieldProcessor, ConfigError> {
        let encoding: Encoding = self.encoding.parse()?;
        Ok(FieldProcessor::new(encoding, self.values_are_lists)
            .with_max_position(self.max_position))
    }
}
