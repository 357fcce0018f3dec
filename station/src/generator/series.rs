use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const KP_MAX: f64 = 9.0;

/// Configuration for generating a synthetic Kp table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub samples: usize,
    pub step_hours: u32,
    pub baseline: f64,
    pub noise: f64,
    /// Peak Kp of a storm centred in the window, if any.
    pub storm_peak: Option<f64>,
    pub seed: u64,
    pub source_label: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: 8,
            step_hours: 3,
            baseline: 2.0,
            noise: 0.7,
            storm_peak: None,
            seed: 0,
            source_label: "synthetic".into(),
        }
    }
}

impl GeneratorConfig {
    fn normalized_samples(&self) -> usize {
        self.samples.max(1)
    }
}

/// Kp values snap to thirds like the published index (0, 0+, 1-, ...).
fn snap_to_thirds(value: f64) -> f64 {
    ((value * 3.0).round() / 3.0).clamp(0.0, KP_MAX)
}

fn build_kp_values(config: &GeneratorConfig) -> Vec<f64> {
    let samples = config.normalized_samples();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let centre = (samples / 2) as f64;
    let half_width = (samples as f64 / 4.0).max(1.0);

    (0..samples)
        .map(|index| {
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            let mut value = config.baseline + jitter;
            if let Some(peak) = config.storm_peak {
                let distance = (index as f64 - centre).abs();
                let envelope = (1.0 - distance / half_width).max(0.0);
                value = value.max(peak * envelope);
            }
            snap_to_thirds(value)
        })
        .collect()
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    time: String,
    kp_index: f64,
    source: &'a str,
}

/// Renders a `time,kp_index,source` table.
pub fn build_series_csv(config: &GeneratorConfig) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (index, kp) in build_kp_values(config).into_iter().enumerate() {
        let hour = (index as u64 * u64::from(config.step_hours)) % 24;
        writer
            .serialize(SeriesRow {
                time: format!("{:02}:00", hour),
                kp_index: (kp * 100.0).round() / 100.0,
                source: &config.source_label,
            })
            .context("writing synthetic Kp row")?;
    }
    let bytes = writer
        .into_inner()
        .context("flushing synthetic Kp table")?;
    String::from_utf8(bytes).context("synthetic Kp table is not UTF-8")
}

pub fn write_series_csv(path: &Path, config: &GeneratorConfig) -> anyhow::Result<usize> {
    let csv = build_series_csv(config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(path, &csv).with_context(|| format!("writing {}", path.display()))?;
    Ok(config.normalized_samples())
}
