//! Command-line entry point for `nudge-bot`.

use std::path::PathBuf;

use clap::Parser;
use nudge_bot::base::{
    config::Config,
    types::{Res, Void},
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Posts Slack review requests and follows up in their threads until someone approves them.
///
/// Settings come from `config.json` (or `--config`), overridden by
/// `NUDGE_BOT_*` environment variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to load instead of `./config.json`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Log verbosity: `-v` for debug, `-vv` for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export session spans over OTLP/HTTP.
    #[arg(long)]
    otlp: bool,
    /// Collector endpoint for `--otlp`; the exporter's default is used when omitted.
    #[arg(long, requires = "otlp")]
    otlp_endpoint: Option<String>,
}

impl Args {
    fn level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Builds the span exporter pipeline when OTLP export is requested.
fn otlp_provider(args: &Args) -> Res<Option<SdkTracerProvider>> {
    if !args.otlp {
        return Ok(None);
    }

    let mut exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary);
    if let Some(endpoint) = &args.otlp_endpoint {
        exporter = exporter.with_endpoint(endpoint);
    }

    let provider = SdkTracerProvider::builder().with_batch_exporter(exporter.build()?).build();

    Ok(Some(provider))
}

/// Installs the global subscriber and returns the OTLP provider, if any, so it can be flushed on exit.
fn init_tracing(args: &Args) -> Res<Option<SdkTracerProvider>> {
    let provider = otlp_provider(args)?;

    let stdout = tracing_subscriber::fmt::layer().with_target(false).with_span_events(FmtSpan::CLOSE);
    let otel = provider.as_ref().map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer("nudge-bot")));

    tracing_subscriber::registry().with(args.level()).with(stdout).with(otel).init();

    Ok(provider)
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();
    let provider = init_tracing(&args)?;

    let config = Config::load(args.config.as_deref())?;
    let result = nudge_bot::start(config).await;

    if let Some(provider) = provider {
        provider.shutdown().map_err(|e| anyhow::anyhow!("Failed to flush spans: {:?}", e))?;
    }

    result
}
