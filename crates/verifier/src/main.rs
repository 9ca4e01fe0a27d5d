//! `checkin-verify` -- verify a progress check-in photo from the command line.
//!
//! Compares a check-in photo against its baseline via the Cloud Vision
//! REST API and prints the outcome as JSON. Without a baseline, or when the
//! vision call fails, the self-reported conditions decide.
//!
//! ```text
//! checkin-verify <checkin-image> [baseline-image]
//! ```
//!
//! # Environment variables
//!
//! | Variable               | Required | Default | Description                        |
//! |------------------------|----------|---------|------------------------------------|
//! | `VISION_API_KEY`       | yes      | --      | Cloud Vision API key               |
//! | `SELF_REPORT_LIGHTING` | no       | --      | `good`, `fair` or `poor`           |
//! | `SELF_REPORT_ANGLE`    | no       | --      | `good`, `fair` or `poor`           |
//! | `SELF_REPORT_DISTANCE` | no       | --      | `good`, `fair` or `poor`           |
//!
//! See [`VerifierConfig::from_env`] for provider and threshold settings.
//!
//! Exits `0` when the check-in is valid, `1` when it is not, and `2` on
//! usage or configuration errors.

use std::process::ExitCode;

use checkin_core::self_report::SelfReport;
use checkin_verifier::{VerificationRequest, Verifier, VerifierConfig};
use checkin_vision::CloudVisionApi;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: checkin-verify <checkin-image> [baseline-image]";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_verifier=info,checkin_vision=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (checkin, baseline) = match args.as_slice() {
        [checkin] => (checkin.as_str(), None),
        [checkin, baseline] => (checkin.as_str(), Some(baseline.as_str())),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = match VerifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let env = |key: &str| std::env::var(key).ok();
    let self_report = match SelfReport::parse(
        env("SELF_REPORT_LIGHTING").as_deref(),
        env("SELF_REPORT_ANGLE").as_deref(),
        env("SELF_REPORT_DISTANCE").as_deref(),
    ) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Invalid self report");
            return ExitCode::from(2);
        }
    };

    let request = match VerificationRequest::parse(checkin, baseline, self_report) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Invalid request");
            return ExitCode::from(2);
        }
    };

    let api = match config.cloud_vision().and_then(|vision| {
        CloudVisionApi::new(vision)
            .map_err(|e| checkin_verifier::VerifyError::Config(e.to_string()))
    }) {
        Ok(api) => api,
        Err(e) => {
            tracing::error!(error = %e, "Cannot build vision client");
            return ExitCode::from(2);
        }
    };

    tracing::info!(
        checkin = %request.checkin,
        has_baseline = request.baseline.is_some(),
        "Starting check-in verification",
    );

    let verifier = Verifier::with_thresholds(api, config.thresholds);
    let outcome = match verifier.verify(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Verification failed");
            return ExitCode::from(2);
        }
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize outcome");
            return ExitCode::from(2);
        }
    }

    if outcome.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
