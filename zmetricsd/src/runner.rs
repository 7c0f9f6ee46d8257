//! zmetricsd run pipeline.

use std::path::PathBuf;

use tracing::info;
use zmetrics_core::{
    collect_block_metrics, collect_block_metrics_with, probe_output_dir, write_html_page,
    write_json, HeightRange, HtmlTemplate, OutputFormat,
};
use zmetrics_fetch::jsonrpsee::connector::JsonRpcConnector;

use crate::{config::ZmetricsdConfig, error::MetricsdError};

/// Runs one metrics collection and returns the paths of the files written.
///
/// The output directory is probed before the node is contacted. JSON is written once, after every
/// block was collected. HTML pages are written as their blocks arrive, so a failure leaves the
/// pages of lower heights on disk.
pub async fn run(config: ZmetricsdConfig) -> Result<Vec<PathBuf>, MetricsdError> {
    config.check_config()?;
    let output = config.output_config();

    info!("Checking output directory {}..", output.output_dir.display());
    probe_output_dir(&output.output_dir)?;

    let template = match output.format {
        OutputFormat::Html => Some(HtmlTemplate::from_file(&output.html_template)?),
        OutputFormat::Json => None,
    };

    let connector = JsonRpcConnector::new_from_config_parts(
        config.node_address()?,
        config.rpc_user.clone(),
        config.rpc_password.clone(),
        config.rpc_timeout(),
    )?;
    info!(" - Reading blocks from node at {}.", connector.url());

    let range = HeightRange::resolve(&config.range_options(), &connector).await?;

    let written = match template {
        None => {
            let metrics = collect_block_metrics(range, &connector).await?;
            vec![write_json(&metrics, &output.output_dir)?]
        }
        Some(template) => {
            let mut pages = Vec::new();
            collect_block_metrics_with(range, &connector, |metric| {
                pages.push(write_html_page(metric, &output.output_dir, &template)?);
                Ok::<_, MetricsdError>(())
            })
            .await?;
            pages
        }
    };

    info!(
        "Finished: {} file(s) written as {}",
        written.len(),
        output.format.as_str()
    );
    Ok(written)
}
