mod error;
mod naming;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

pub use error::RunnerError;
pub use naming::ArtifactName;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Installs the stderr `tracing` subscriber. `RUST_LOG` overrides the default
/// `info` filter. Later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Where a model run gets its inputs and puts its artifacts.
///
/// Input documents look like
/// `{"input": {..., "seed": 42}, "output": {"spec": "filesystem", "dir": "out"}}`;
/// the output section may also be `{"profile": {"default": {...}}}`.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: Option<u64>,
    output_dir: PathBuf,
}

impl Environment {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_json: serde_json::Map::new(),
            input: None,
            seed: None,
            output_dir: output_dir.into(),
        }
    }

    /// # Errors
    ///
    /// Returns [`RunnerError::Input`] if `input.seed` is present but is not an
    /// unsigned integer.
    pub fn from_json(data: Value) -> Result<Self, RunnerError> {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = match input_json.remove("seed") {
            None => None,
            Some(value) => Some(value.as_u64().ok_or_else(|| {
                RunnerError::Input(format!("seed must be an unsigned integer, got {value}"))
            })?),
        };

        let output_dir = data
            .get("output")
            .and_then(filesystem_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            input_json,
            input: None,
            seed,
            output_dir,
        })
    }

    /// Reads a JSON document, typically stdin.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, RunnerError> {
        let mut raw = String::new();
        reader
            .read_to_string(&mut raw)
            .map_err(|source| RunnerError::io("<stdin>", source))?;
        if raw.trim().is_empty() {
            return Err(RunnerError::Input("no input document".to_string()));
        }
        let data: Value = serde_json::from_str(&raw)?;
        Self::from_json(data)
    }

    /// Reads a `.toml` or JSON document from disk.
    pub fn from_path(path: &Path) -> Result<Self, RunnerError> {
        let raw = fs::read_to_string(path).map_err(|source| RunnerError::io(path, source))?;
        let data: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };
        debug!(path = %path.display(), "loaded run document");
        Self::from_json(data)
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>, RunnerError> {
        let input_value = Value::Object(self.input_json.clone());
        let input = serde_json::from_value(input_value)?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            output_dir: self.output_dir,
        })
    }
}

fn filesystem_dir(output: &Value) -> Option<PathBuf> {
    if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
        return output.get("dir").and_then(|v| v.as_str()).map(PathBuf::from);
    }

    let profiles = output.get("profile").and_then(|v| v.as_object())?;
    let profile = profiles
        .get("default")
        .or_else(|| profiles.values().next())?;
    if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
        return profile.get("dir").and_then(|v| v.as_str()).map(PathBuf::from);
    }
    None
}

impl<I> Environment<I> {
    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Creates the output directory if needed.
    pub fn prepare_output_dir(&self) -> Result<&Path, RunnerError> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|source| RunnerError::io(&self.output_dir, source))?;
        Ok(&self.output_dir)
    }

    /// Free path for `name` inside the (created) output directory.
    pub fn artifact_path(&self, name: &ArtifactName) -> Result<PathBuf, RunnerError> {
        let dir = self.prepare_output_dir()?;
        Ok(name.next_free_in(dir))
    }

    pub fn write(&self, name: &ArtifactName, data: &[u8]) -> Result<PathBuf, RunnerError> {
        let path = self.artifact_path(name)?;
        fs::write(&path, data).map_err(|source| RunnerError::io(&path, source))?;
        debug!(path = %path.display(), bytes = data.len(), "wrote artifact");
        Ok(path)
    }

    pub fn write_csv(
        &self,
        name: &ArtifactName,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<PathBuf, RunnerError> {
        let path = self.artifact_path(name)?;
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(headers)?;
        for row in rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(|source| RunnerError::io(&path, source))?;
        debug!(path = %path.display(), rows = rows.len(), "wrote csv");
        Ok(path)
    }
}
