use crate::render::{render_filters, render_overview, render_skills};
use chrono::NaiveDate;
use clap::Args;
use offer_insights::config::AppConfig;
use offer_insights::error::AppError;
use offer_insights::offers::{FilterOptions, LoadedOffers, OfferSource, OverviewReport, SkillsReport};
use offer_insights::telemetry::{self, LogTarget};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Read offers from a CSV snapshot instead of the configured source
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Fail instead of reporting on an empty table when ingestion fails
    #[arg(long)]
    pub(crate) strict: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OverviewArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Only offers in this city
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Only offers in this category (marker icon)
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Employment types to keep (repeatable, defaults to all)
    #[arg(long = "employment-type")]
    pub(crate) employment_types: Vec<String>,
    /// Workplace types to keep (repeatable, defaults to all)
    #[arg(long = "workplace-type")]
    pub(crate) workplace_types: Vec<String>,
    /// Experience levels to keep (repeatable, defaults to all)
    #[arg(long = "experience-level")]
    pub(crate) experience_levels: Vec<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SkillsArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Count offers published on or before this date (YYYY-MM-DD). Defaults to the earliest date.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) cutoff: Option<NaiveDate>,
    /// Restrict the ranking to one category
    #[arg(long)]
    pub(crate) category: Option<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct FiltersArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

pub(crate) async fn run_overview(args: OverviewArgs) -> Result<(), AppError> {
    let loaded = load_offers(&args.source).await?;
    let options = FilterOptions::from_table(&loaded.table);

    let mut filter = options.select_all(args.city, args.category);
    if !args.employment_types.is_empty() {
        filter.employment_types = args.employment_types.into_iter().collect();
    }
    if !args.workplace_types.is_empty() {
        filter.workplace_types = args.workplace_types.into_iter().collect();
    }
    if !args.experience_levels.is_empty() {
        filter.experience_levels = args.experience_levels.into_iter().collect();
    }

    let report = OverviewReport::build(&loaded.table, &filter);
    if args.output.json {
        print_json(&report)
    } else {
        print!("{}", render_overview(&report, &loaded.summary));
        Ok(())
    }
}

pub(crate) async fn run_skills(args: SkillsArgs) -> Result<(), AppError> {
    let loaded = load_offers(&args.source).await?;
    let filter = args
        .category
        .map(|category| FilterOptions::from_table(&loaded.table).select_all(None, Some(category)));

    let report = SkillsReport::build(&loaded.table, args.cutoff, filter.as_ref());
    if args.output.json {
        print_json(&report)
    } else {
        print!("{}", render_skills(&report, &loaded.summary));
        Ok(())
    }
}

pub(crate) async fn run_filters(args: FiltersArgs) -> Result<(), AppError> {
    let loaded = load_offers(&args.source).await?;
    let options = FilterOptions::from_table(&loaded.table);
    if args.output.json {
        print_json(&options)
    } else {
        print!("{}", render_filters(&options, &loaded.summary));
        Ok(())
    }
}

/// Resolves the source for a one-shot report. Logs go to stderr so stdout stays parseable.
async fn load_offers(args: &SourceArgs) -> Result<LoadedOffers, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_target(&config.telemetry, LogTarget::Stderr)?;

    let source = match &args.csv {
        Some(path) => OfferSource::Csv(path.clone()),
        None => OfferSource::from_config(&config.source),
    };

    if args.strict {
        Ok(source.try_load().await?)
    } else {
        Ok(source.load().await)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
