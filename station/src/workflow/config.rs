use anyhow::{ensure, Context};
use kpcore::feed::DEFAULT_REFRESH_PERIOD;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Directory holding the persisted profile and mission log.
    pub state_dir: PathBuf,
    /// URL or file path of the Kp table.
    pub source: String,
    pub refresh_secs: u64,
    pub bind: SocketAddr,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("state"),
            source: "http://127.0.0.1:8080/space_weather_data.csv".into(),
            refresh_secs: DEFAULT_REFRESH_PERIOD.as_secs(),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

impl StationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading station config {}", path_ref.display()))?;
        let config: StationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing station config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        state_dir: Option<PathBuf>,
        source: Option<String>,
        refresh_secs: Option<u64>,
        bind: Option<SocketAddr>,
    ) -> Self {
        if let Some(state_dir) = state_dir {
            self.state_dir = state_dir;
        }
        if let Some(source) = source {
            self.source = source;
        }
        if let Some(refresh_secs) = refresh_secs {
            self.refresh_secs = refresh_secs;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.refresh_secs > 0, "refresh_secs must be positive");
        ensure!(!self.source.trim().is_empty(), "source must not be empty");
        Ok(())
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_refresh_every_ten_minutes() {
        let cfg = StationConfig::default();
        assert_eq!(cfg.refresh_period(), Duration::from_secs(600));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_load_reads_yaml_with_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"state_dir: /var/lib/kp\nsource: data/kp.csv\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = StationConfig::load(&path).unwrap();
        assert_eq!(cfg.state_dir, PathBuf::from("/var/lib/kp"));
        assert_eq!(cfg.source, "data/kp.csv");
        assert_eq!(cfg.refresh_secs, 600);
        assert_eq!(cfg.bind.port(), 9000);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let cfg = StationConfig::default().with_overrides(None, Some("kp.csv".into()), Some(30), None);
        assert_eq!(cfg.source, "kp.csv");
        assert_eq!(cfg.refresh_secs, 30);
        assert_eq!(cfg.state_dir, PathBuf::from("state"));
    }

    #[test]
    fn zero_refresh_is_rejected() {
        let cfg = StationConfig::default().with_overrides(None, None, Some(0), None);
        assert!(cfg.validate().is_err());
    }
}
