//! Generate command implementation
//!
//! Creates a generator from the resolved configuration, draws samples from
//! one distribution and writes them as JSON, CSV or a summary table.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, info};

use rng_core::{Residency, RngType};
use rng_facade::{api, GeneratorHandle, Stream};

use crate::config::{CliConfig, OutputFormat};
use crate::{CliError, Result};

/// Distributions the CLI can sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Distribution {
    /// Raw 32-bit integers
    Bits,
    /// Raw 64-bit integers (64-bit quasi-random types only)
    Bits64,
    /// Single-precision uniform on (0, 1]
    Uniform,
    /// Double-precision uniform on (0, 1]
    UniformDouble,
    /// Single-precision normal
    Normal,
    /// Double-precision normal
    NormalDouble,
    /// Single-precision log-normal
    LogNormal,
    /// Double-precision log-normal
    LogNormalDouble,
    /// Poisson counts
    Poisson,
}

impl Distribution {
    /// Returns the command-line name.
    pub fn name(self) -> &'static str {
        match self {
            Distribution::Bits => "bits",
            Distribution::Bits64 => "bits64",
            Distribution::Uniform => "uniform",
            Distribution::UniformDouble => "uniform-double",
            Distribution::Normal => "normal",
            Distribution::NormalDouble => "normal-double",
            Distribution::LogNormal => "log-normal",
            Distribution::LogNormalDouble => "log-normal-double",
            Distribution::Poisson => "poisson",
        }
    }
}

/// Parameters of one generate invocation.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub distribution: Distribution,
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub lambda: f64,
    pub output: Option<PathBuf>,
}

/// Generated values in their native type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Samples {
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    fn len(&self) -> usize {
        match self {
            Samples::U32(v) => v.len(),
            Samples::U64(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    fn value(&self, index: usize) -> f64 {
        match self {
            Samples::U32(v) => v[index] as f64,
            Samples::U64(v) => v[index] as f64,
            Samples::F32(v) => v[index] as f64,
            Samples::F64(v) => v[index],
        }
    }

    /// Count, min, max and mean of the values.
    fn summary(&self) -> Summary {
        let count = self.len();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for i in 0..count {
            let x = self.value(i);
            min = min.min(x);
            max = max.max(x);
            sum += x;
        }
        let mean = if count == 0 { f64::NAN } else { sum / count as f64 };
        Summary {
            count,
            min,
            max,
            mean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    count: usize,
    min: f64,
    max: f64,
    mean: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    rng_type: RngType,
    residency: Residency,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    offset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
    distribution: &'static str,
    count: usize,
    values: &'a Samples,
}

#[derive(Serialize)]
struct Row<T> {
    index: u64,
    dimension: u32,
    value: T,
}

/// Run the generate command
pub fn run(config: &CliConfig, request: &GenerateRequest) -> Result<()> {
    info!(
        rng_type = %config.rng_type,
        residency = %config.residency,
        distribution = request.distribution.name(),
        count = request.count,
        "Generating samples"
    );

    let samples = sample(config, request)?;

    match &request.output {
        Some(path) => {
            let file = File::create(path)?;
            write_samples(config, request, &samples, BufWriter::new(file))?;
            info!(path = %path.display(), "Samples written");
        }
        None => write_samples(config, request, &samples, io::stdout().lock())?,
    }
    Ok(())
}

/// Draws the requested samples from a fresh generator.
///
/// The generator is destroyed before returning, whether or not sampling
/// succeeded.
pub fn sample(config: &CliConfig, request: &GenerateRequest) -> Result<Samples> {
    let handle = match config.residency {
        Residency::Device => api::create(config.rng_type)?,
        Residency::Host => api::create_host(config.rng_type)?,
    };
    debug!(%handle, "generator created");

    let drawn = configure(handle, config).and_then(|()| draw(handle, request));
    let destroyed = api::destroy(handle);
    let samples = drawn?;
    destroyed?;
    Ok(samples)
}

fn configure(handle: GeneratorHandle, config: &CliConfig) -> Result<()> {
    if config.rng_type.is_quasi() {
        api::set_quasi_random_generator_dimensions(handle, config.dimensions)?;
    } else {
        api::set_pseudo_random_generator_seed(handle, config.seed)?;
    }
    api::set_generator_offset(handle, config.offset)?;
    if let Some(threads) = config.threads {
        api::set_stream(handle, Some(Stream::new(threads)?))?;
    }
    Ok(())
}

fn draw(handle: GeneratorHandle, request: &GenerateRequest) -> Result<Samples> {
    let n = request.count;
    let (mean, stddev) = (request.mean, request.stddev);
    let samples = match request.distribution {
        Distribution::Bits => {
            let mut v = vec![0u32; n];
            api::generate(handle, &mut v)?;
            Samples::U32(v)
        }
        Distribution::Bits64 => {
            let mut v = vec![0u64; n];
            api::generate_long_long(handle, &mut v)?;
            Samples::U64(v)
        }
        Distribution::Uniform => {
            let mut v = vec![0.0f32; n];
            api::generate_uniform(handle, &mut v)?;
            Samples::F32(v)
        }
        Distribution::UniformDouble => {
            let mut v = vec![0.0f64; n];
            api::generate_uniform_double(handle, &mut v)?;
            Samples::F64(v)
        }
        Distribution::Normal => {
            let mut v = vec![0.0f32; n];
            api::generate_normal(handle, &mut v, mean as f32, stddev as f32)?;
            Samples::F32(v)
        }
        Distribution::NormalDouble => {
            let mut v = vec![0.0f64; n];
            api::generate_normal_double(handle, &mut v, mean, stddev)?;
            Samples::F64(v)
        }
        Distribution::LogNormal => {
            let mut v = vec![0.0f32; n];
            api::generate_log_normal(handle, &mut v, mean as f32, stddev as f32)?;
            Samples::F32(v)
        }
        Distribution::LogNormalDouble => {
            let mut v = vec![0.0f64; n];
            api::generate_log_normal_double(handle, &mut v, mean, stddev)?;
            Samples::F64(v)
        }
        Distribution::Poisson => {
            let mut v = vec![0u32; n];
            api::generate_poisson(handle, &mut v, request.lambda)?;
            Samples::U32(v)
        }
    };
    Ok(samples)
}

fn write_samples<W: Write>(
    config: &CliConfig,
    request: &GenerateRequest,
    samples: &Samples,
    mut out: W,
) -> Result<()> {
    let dimensions = config.rng_type.is_quasi().then_some(config.dimensions);

    match config.format {
        OutputFormat::Json => {
            let report = Report {
                rng_type: config.rng_type,
                residency: config.residency,
                seed: config.rng_type.is_pseudo().then_some(config.seed),
                offset: config.offset,
                dimensions,
                distribution: request.distribution.name(),
                count: samples.len(),
                values: samples,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let dimensions = dimensions.unwrap_or(1);
            let offset = config.offset;
            match samples {
                Samples::U32(v) => write_csv(&mut out, v, dimensions, offset)?,
                Samples::U64(v) => write_csv(&mut out, v, dimensions, offset)?,
                Samples::F32(v) => write_csv(&mut out, v, dimensions, offset)?,
                Samples::F64(v) => write_csv(&mut out, v, dimensions, offset)?,
            }
        }
        OutputFormat::Table => write_table(&mut out, config, request, samples)?,
    }
    out.flush()?;
    Ok(())
}

/// Writes one row per value. Quasi-random output is dimension-major, so the
/// first `len / dimensions` rows are dimension 0.
fn write_csv<W: Write, T: Serialize>(
    out: W,
    values: &[T],
    dimensions: u32,
    offset: u64,
) -> Result<()> {
    let points = values.len() / dimensions.max(1) as usize;
    let mut writer = csv::Writer::from_writer(out);
    for (i, value) in values.iter().enumerate() {
        let (dimension, point) = if points == 0 {
            (0, i)
        } else {
            (i / points, i % points)
        };
        writer.serialize(Row {
            index: offset + point as u64,
            dimension: dimension as u32,
            value,
        })?;
    }
    writer.flush()?;
    Ok(())
}

const PREVIEW: usize = 8;

fn write_table<W: Write>(
    out: &mut W,
    config: &CliConfig,
    request: &GenerateRequest,
    samples: &Samples,
) -> Result<()> {
    let summary = samples.summary();
    writeln!(out, "┌──────────────┬──────────────────────────┐")?;
    writeln!(out, "│ Type         │ {:<24} │", config.rng_type.to_string())?;
    writeln!(out, "│ Residency    │ {:<24} │", config.residency.to_string())?;
    writeln!(out, "│ Distribution │ {:<24} │", request.distribution.name())?;
    writeln!(out, "├──────────────┼──────────────────────────┤")?;
    writeln!(out, "│ Count        │ {:<24} │", summary.count)?;
    writeln!(out, "│ Min          │ {:<24.10} │", summary.min)?;
    writeln!(out, "│ Max          │ {:<24.10} │", summary.max)?;
    writeln!(out, "│ Mean         │ {:<24.10} │", summary.mean)?;
    writeln!(out, "├──────────────┼──────────────────────────┤")?;
    for i in 0..samples.len().min(PREVIEW) {
        writeln!(out, "│ [{:<10}] │ {:<24.10} │", i, samples.value(i))?;
    }
    writeln!(out, "└──────────────┴──────────────────────────┘")?;
    Ok(())
}

/// Rejects requests the generator would refuse, before creating it.
pub fn validate(request: &GenerateRequest) -> Result<()> {
    if request.distribution == Distribution::Poisson
        && !(request.lambda.is_finite() && request.lambda > 0.0)
    {
        return Err(CliError::InvalidArgument(format!(
            "lambda must be positive, got {}",
            request.lambda
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn request(distribution: Distribution, count: usize) -> GenerateRequest {
        GenerateRequest {
            distribution,
            count,
            mean: 0.0,
            stddev: 1.0,
            lambda: 4.0,
            output: None,
        }
    }

    #[test]
    fn test_sample_is_reproducible() {
        let config = CliConfig {
            seed: 12345,
            ..Default::default()
        };
        let a = sample(&config, &request(Distribution::Uniform, 1000)).unwrap();
        let b = sample(&config, &request(Distribution::Uniform, 1000)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_host_matches_device() {
        let device = CliConfig {
            seed: 3,
            threads: Some(2),
            ..Default::default()
        };
        let host = CliConfig {
            residency: Residency::Host,
            ..device.clone()
        };
        let r = request(Distribution::NormalDouble, 5001);
        assert_eq!(sample(&device, &r).unwrap(), sample(&host, &r).unwrap());
    }

    #[test]
    fn test_quasi_bits64() {
        let config = CliConfig {
            rng_type: RngType::QuasiSobol64,
            dimensions: 2,
            ..Default::default()
        };
        let samples = sample(&config, &request(Distribution::Bits64, 4)).unwrap();
        assert_eq!(samples, Samples::U64(vec![0, 1 << 63, 0, 1 << 63]));
    }

    #[test]
    fn test_generator_errors_propagate() {
        let config = CliConfig {
            rng_type: RngType::QuasiSobol32,
            dimensions: 3,
            ..Default::default()
        };
        let err = sample(&config, &request(Distribution::Uniform, 10)).unwrap_err();
        assert!(matches!(err, CliError::Rng(_)));
    }

    #[test]
    fn test_validate_lambda() {
        let mut r = request(Distribution::Poisson, 1);
        r.lambda = 0.0;
        assert!(validate(&r).is_err());
        r.distribution = Distribution::Uniform;
        assert!(validate(&r).is_ok());
    }

    #[test]
    fn test_summary() {
        let summary = Samples::F64(vec![1.0, 2.0, 6.0]).summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 6.0);
        assert_relative_eq!(summary.mean, 3.0);
    }

    #[test]
    fn test_csv_rows_are_dimension_major() {
        let mut out = Vec::new();
        write_csv(&mut out, &[10u32, 11, 20, 21], 2, 5).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "index,dimension,value",
                "5,0,10",
                "6,0,11",
                "5,1,20",
                "6,1,21"
            ]
        );
    }

    #[test]
    fn test_json_report() {
        let config = CliConfig {
            format: OutputFormat::Json,
            seed: 9,
            ..Default::default()
        };
        let r = request(Distribution::Bits, 2);
        let samples = Samples::U32(vec![1, 2]);
        let mut out = Vec::new();
        write_samples(&config, &r, &samples, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["rng_type"], "pseudo-default");
        assert_eq!(json["seed"], 9);
        assert_eq!(json["distribution"], "bits");
        assert_eq!(json["values"], serde_json::json!([1, 2]));
        assert!(json.get("dimensions").is_none());
    }
}
