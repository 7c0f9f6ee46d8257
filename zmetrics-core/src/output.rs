//! Writing of the collected metrics: one JSON document, or one HTML file per block.
//!
//! HTML output is not transactional. A failure leaves the files already written for lower
//! heights in place.

use std::{
    fs::{self, File},
    io::{self, BufWriter, IntoInnerError, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{error::OutputError, metric::BlockMetric, render::BlockRenderer};

/// File name of the JSON report inside the output directory.
pub const JSON_FILE_NAME: &str = "zcashmetrics.json";

const PROBE_FILE_NAME: &str = ".zmetrics-write-probe";

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// A single `zcashmetrics.json` array.
    #[default]
    Json,
    /// One `<height>.html` file per block.
    Html,
}

impl OutputFormat {
    /// Maps a configured format name to a format.
    ///
    /// Only `html` selects HTML. Every other value, recognised or not, selects JSON.
    pub fn from_config_value(value: &str) -> Self {
        match value {
            "html" => OutputFormat::Html,
            "json" => OutputFormat::Json,
            other => {
                warn!("Unrecognised output format '{other}', writing JSON");
                OutputFormat::Json
            }
        }
    }

    /// The canonical config name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }
}

/// Where and how the report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory receiving the report files.
    pub output_dir: PathBuf,
    /// Report format.
    pub format: OutputFormat,
    /// Template used for HTML output.
    pub html_template: PathBuf,
}

/// Checks that files can be created in `dir`, creating the directory if needed.
///
/// Run before any node request so that an unwritable directory fails the run early.
pub fn probe_output_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(OutputError::io(dir))?;

    let probe = dir.join(PROBE_FILE_NAME);
    let mut file = File::create(&probe).map_err(OutputError::io(&probe))?;
    file.write_all(b"zmetrics")
        .and_then(|_| file.flush())
        .map_err(OutputError::io(&probe))?;
    drop(file);
    fs::remove_file(&probe).map_err(OutputError::io(&probe))?;

    debug!("Output directory {} is writable", dir.display());
    Ok(())
}

/// Encodes the whole sequence as one array with four space indentation.
///
/// Encoding happens before the file is created, so an encoding failure leaves nothing behind.
pub fn write_json(metrics: &[BlockMetric], dir: &Path) -> Result<PathBuf, OutputError> {
    let encoded = encode_json(metrics)?;

    let path = dir.join(JSON_FILE_NAME);
    fs::write(&path, encoded).map_err(OutputError::io(&path))?;
    info!(
        "Wrote metrics for {} blocks to {}",
        metrics.len(),
        path.display()
    );
    Ok(path)
}

pub(crate) fn encode_json(metrics: &[BlockMetric]) -> Result<Vec<u8>, OutputError> {
    let mut encoded = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut encoded, formatter);
    metrics.serialize(&mut serializer)?;
    Ok(encoded)
}

/// Renders one metric into `<dir>/<height>.html`.
///
/// The page is flushed and synced before returning, so a failed close is reported like a failed
/// write.
pub fn write_html_page<R>(
    metric: &BlockMetric,
    dir: &Path,
    renderer: &R,
) -> Result<PathBuf, OutputError>
where
    R: BlockRenderer + ?Sized,
{
    let path = dir.join(format!("{}.html", metric.height));
    let file = File::create(&path).map_err(OutputError::io(&path))?;
    let file =
        render_page(metric, renderer, BufWriter::new(file)).map_err(OutputError::io(&path))?;
    file.sync_all().map_err(OutputError::io(&path))?;

    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Renders into `writer` and hands back the inner sink once every buffered byte reached it.
fn render_page<R, W>(
    metric: &BlockMetric,
    renderer: &R,
    mut writer: BufWriter<W>,
) -> io::Result<W>
where
    R: BlockRenderer + ?Sized,
    W: Write,
{
    renderer.render(metric, &mut writer)?;
    writer.into_inner().map_err(IntoInnerError::into_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(height: u32) -> BlockMetric {
        BlockMetric {
            height,
            sapling_value_pool: 2.5,
            sprout_value_pool: 0.125,
            size: 1000 + i64::from(height),
            time: 1_600_000_000 + i64::from(height) * 75,
            number_of_transactions: 2,
            number_of_transparent: 1,
            number_of_mixed: 0,
            number_of_shielded: 1,
        }
    }

    /// Renders the height, failing for one chosen height.
    struct FailingRenderer(u32);

    impl BlockRenderer for FailingRenderer {
        fn render(&self, metric: &BlockMetric, out: &mut dyn Write) -> io::Result<()> {
            if metric.height == self.0 {
                return Err(io::Error::other("template execution failed"));
            }
            write!(out, "{}", metric.height)
        }
    }

    #[test]
    fn json_uses_four_space_indent_and_camel_case() {
        let encoded = String::from_utf8(encode_json(&[metric(90)]).unwrap()).unwrap();
        let expected = r#"[
    {
        "height": 90,
        "saplingValuePool": 2.5,
        "sproutValuePool": 0.125,
        "size": 1090,
        "time": 1600006750,
        "numberOfTransactions": 2,
        "numberOfTransparent": 1,
        "numberOfMixed": 0,
        "numberOfShielded": 1
    }
]"#;
        assert_eq!(encoded, expected);
    }

    #[test]
    fn json_output_is_deterministic() {
        let metrics: Vec<_> = (90..=100).map(metric).collect();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let a = write_json(&metrics, first.path()).unwrap();
        let b = write_json(&metrics, second.path()).unwrap();

        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }

    /// Accepts nothing: every write fails as a full disk would.
    #[derive(Debug)]
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn write_pages<R: BlockRenderer>(
        metrics: &[BlockMetric],
        dir: &Path,
        renderer: &R,
    ) -> Result<Vec<PathBuf>, OutputError> {
        metrics
            .iter()
            .map(|metric| write_html_page(metric, dir, renderer))
            .collect()
    }

    #[test]
    fn html_writes_one_file_per_height() {
        let dir = tempfile::tempdir().unwrap();
        let metrics: Vec<_> = (90..=92).map(metric).collect();

        let written = write_pages(&metrics, dir.path(), &FailingRenderer(u32::MAX)).unwrap();

        assert_eq!(written.len(), 3);
        for height in 90..=92 {
            let body = fs::read_to_string(dir.path().join(format!("{height}.html"))).unwrap();
            assert_eq!(body, height.to_string());
        }
    }

    #[test]
    fn html_failure_keeps_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let metrics: Vec<_> = (90..=100).map(metric).collect();

        let err = write_pages(&metrics, dir.path(), &FailingRenderer(95)).unwrap_err();

        assert!(matches!(err, OutputError::Io { ref path, .. } if path.ends_with("95.html")));
        for height in 90..=94 {
            assert!(dir.path().join(format!("{height}.html")).exists());
        }
        for height in 96..=100 {
            assert!(!dir.path().join(format!("{height}.html")).exists());
        }
    }

    #[test]
    fn html_page_uses_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("block.template.html");
        fs::write(&template, "<p>{{height}} / {{numberOfShielded}}</p>").unwrap();
        let out = dir.path().join("blocks");
        fs::create_dir(&out).unwrap();

        let template = crate::render::HtmlTemplate::from_file(&template).unwrap();
        let path = write_html_page(&metric(7), &out, &template).unwrap();

        assert_eq!(path, out.join("7.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "<p>7 / 1</p>");
    }

    #[test]
    fn buffered_page_failure_surfaces_when_finishing() {
        // The page fits in the buffer, so the sink only fails once the buffer is handed over.
        let err = render_page(
            &metric(7),
            &FailingRenderer(u32::MAX),
            BufWriter::new(FullDisk),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "no space left on device");
    }

    #[test]
    fn unknown_format_falls_back_to_json() {
        crate::init_tracing();
        assert_eq!(OutputFormat::from_config_value("csv"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config_value("HTML"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config_value("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config_value("html"), OutputFormat::Html);
    }

    #[test]
    fn probe_creates_missing_directory_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("blocks");

        probe_output_dir(&out).unwrap();

        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn probe_fails_when_output_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("blocks");
        fs::write(&not_a_dir, "occupied").unwrap();

        assert!(matches!(
            probe_output_dir(&not_a_dir),
            Err(OutputError::Io { .. })
        ));
    }
}
