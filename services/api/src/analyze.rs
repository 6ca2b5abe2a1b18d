use crate::infra::{build_pipeline, parse_factor};
use clap::Args;
use insurcap::config::AppConfig;
use insurcap::error::AppError;
use insurcap::telemetry;
use insurcap::workflows::underwriting::{
    ClassifierInput, FactorInput, UnderwritingReport, UnderwritingRequest,
};
use serde_json::Value;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Enquiry text, or a JSON document when --structured is set
    #[arg(long)]
    pub(crate) text: String,
    /// Treat --text as a JSON document rather than plain text
    #[arg(long)]
    pub(crate) structured: bool,
    /// Exposure factor as NAME=VALUE; repeat for several factors
    #[arg(long = "factor", value_parser = parse_factor)]
    pub(crate) factors: Vec<(String, FactorInput)>,
    /// Location for the weather lookup (defaults to DEFAULT_LOCATION)
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Print single-line JSON instead of the indented form
    #[arg(long)]
    pub(crate) compact: bool,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline = build_pipeline(&config.impact)?;
    let compact = args.compact;
    let request = request_from_args(args)?;

    let report = pipeline.run(request).await?;
    println!("{}", render(&report, compact)?);
    Ok(())
}

fn request_from_args(args: AnalyzeArgs) -> Result<UnderwritingRequest, AppError> {
    let AnalyzeArgs {
        text,
        structured,
        factors,
        location,
        ..
    } = args;

    let request = if structured {
        ClassifierInput::Structured(serde_json::from_str::<Value>(&text)?)
    } else {
        ClassifierInput::Text(text)
    };

    Ok(UnderwritingRequest {
        request,
        factors: factors.into_iter().collect(),
        location,
    })
}

fn render(report: &UnderwritingReport, compact: bool) -> Result<String, AppError> {
    let rendered = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    Ok(rendered)
}
