use crate::reports::{run_filters, run_overview, run_skills, FiltersArgs, OverviewArgs, SkillsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use offer_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Offer Insights",
    about = "Serve or print job-offer dashboards from the offer API or a CSV snapshot",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print offer counts, average salary and top cities for a selection
    Overview(OverviewArgs),
    /// Print the top skills among offers published up to a cutoff date
    Skills(SkillsArgs),
    /// List the values each filter can take
    Filters(FiltersArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Overview(args) => run_overview(args).await,
        Command::Skills(args) => run_skills(args).await,
        Command::Filters(args) => run_filters(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["offer-insights"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn overview_accepts_repeated_multi_selects() {
        let cli = Cli::try_parse_from([
            "offer-insights",
            "overview",
            "--csv",
            "offers.csv",
            "--city",
            "Warszawa",
            "--workplace-type",
            "remote",
            "--workplace-type",
            "hybrid",
            "--json",
        ])
        .expect("parses");

        let Some(Command::Overview(args)) = cli.command else {
            panic!("expected overview command");
        };
        assert_eq!(args.city.as_deref(), Some("Warszawa"));
        assert_eq!(args.workplace_types, vec!["remote", "hybrid"]);
        assert!(args.employment_types.is_empty());
        assert!(args.output.json);
    }

    #[test]
    fn skills_cutoff_must_be_a_date() {
        let cli = Cli::try_parse_from(["offer-insights", "skills", "--cutoff", "2023-03-10"])
            .expect("parses");
        let Some(Command::Skills(args)) = cli.command else {
            panic!("expected skills command");
        };
        assert_eq!(args.cutoff, NaiveDate::from_ymd_opt(2023, 3, 10));

        assert!(Cli::try_parse_from(["offer-insights", "skills", "--cutoff", "March"]).is_err());
    }
}
