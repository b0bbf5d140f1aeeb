use offer_insights::offers::{FilterOptions, GroupCount, IngestSummary, OverviewReport, SkillsReport};

pub(crate) fn render_overview(report: &OverviewReport, summary: &IngestSummary) -> String {
    let mut lines = source_lines(summary);
    lines.push(String::new());
    lines.push(format!(
        "Offers matching selection: {} of {}",
        report.filtered_offers, report.total_offers
    ));
    lines.push(format!("Average salary: {}", report.average_salary.label));
    lines.push(format!(
        "Mapped offers: {} (centre {:.6}, {:.6}, zoom {})",
        report.map_points.len(),
        report.map_center.latitude,
        report.map_center.longitude,
        report.map_center.zoom
    ));

    lines.push(String::new());
    lines.push("Top cities".to_string());
    push_ranking(&mut lines, &report.top_cities);

    lines.push(String::new());
    lines.push("Top categories".to_string());
    push_ranking(&mut lines, &report.top_categories);

    finish(lines)
}

pub(crate) fn render_skills(report: &SkillsReport, summary: &IngestSummary) -> String {
    let mut lines = source_lines(summary);
    if let Some(bounds) = report.date_bounds {
        lines.push(format!("Published between {} and {}", bounds.earliest, bounds.latest));
    }
    lines.push(String::new());
    lines.push(format!("Offers in window: {}", report.window_offers));
    lines.push(format!("Average salary: {}", report.average_salary.label));

    lines.push(String::new());
    lines.push(report.title());
    push_ranking(&mut lines, &report.top_skills);

    finish(lines)
}

pub(crate) fn render_filters(options: &FilterOptions, summary: &IngestSummary) -> String {
    let mut lines = source_lines(summary);
    lines.push(String::new());
    for (name, values) in [
        ("Cities", &options.cities),
        ("Categories", &options.categories),
        ("Employment types", &options.employment_types),
        ("Workplace types", &options.workplace_types),
        ("Experience levels", &options.experience_levels),
    ] {
        if values.is_empty() {
            lines.push(format!("{name}: none"));
        } else {
            lines.push(format!("{name}: {}", values.join(", ")));
        }
    }
    if let Some(bounds) = options.date_bounds {
        lines.push(format!("Dates: {} .. {}", bounds.earliest, bounds.latest));
    }

    finish(lines)
}

fn source_lines(summary: &IngestSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Source: {} ({})",
        summary.source.label(),
        summary.location
    )];
    if summary.degraded {
        lines.push(format!(
            "Ingestion failed, showing an empty table: {}",
            summary.error.as_deref().unwrap_or("unknown error")
        ));
    } else {
        lines.push(format!(
            "Loaded {} offers ({} records read, {} skipped)",
            summary.offers_loaded, summary.records_seen, summary.records_skipped
        ));
    }
    lines
}

fn push_ranking(lines: &mut Vec<String>, groups: &[GroupCount]) {
    if groups.is_empty() {
        lines.push("  no data".to_string());
        return;
    }
    let width = groups.iter().map(|group| group.key.chars().count()).max().unwrap_or(0);
    for (rank, group) in groups.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {:<width$}  {}",
            rank + 1,
            group.key,
            group.count,
            width = width
        ));
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use offer_insights::offers::ingest::{read_csv, SourceKind};
    use offer_insights::offers::OfferTable;

    const SNAPSHOT: &str = "\
title,city,marker_icon,workplace_type,employment_type,experience_level,published_at,salary_from,salary_to,skills_one,skills_two
Java Dev,Warszawa,java,remote,b2b,mid,2023-03-08,15000,20000,Java,Spring
Go Dev,Warszawa,go,office,b2b,senior,2023-03-10,,,Go,
Python Dev,Kraków,python,remote,permanent,mid,2023-03-11,12000,16000,Python,SQL
";

    fn table() -> OfferTable {
        OfferTable::new(read_csv(SNAPSHOT.as_bytes()).expect("snapshot parses").offers)
    }

    fn summary(degraded: bool) -> IngestSummary {
        IngestSummary {
            source: SourceKind::Csv,
            location: "offers.csv".to_string(),
            records_seen: 3,
            offers_loaded: if degraded { 0 } else { 3 },
            records_skipped: 0,
            degraded,
            error: degraded.then(|| "file not found".to_string()),
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn overview_lists_rankings_and_salary() {
        let table = table();
        let filter = FilterOptions::from_table(&table).select_all(None, None);
        let rendered = render_overview(&OverviewReport::build(&table, &filter), &summary(false));

        assert!(rendered.contains("Source: CSV snapshot (offers.csv)"));
        assert!(rendered.contains("Offers matching selection: 3 of 3"));
        assert!(rendered.contains("Average salary: 13500.00 - 18000.00 PLN"));
        assert!(rendered.contains("   1. Warszawa  2"));
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn skills_report_names_cutoff() {
        let table = table();
        let report = SkillsReport::build(&table, None, None);
        let rendered = render_skills(&report, &summary(false));

        assert!(rendered.contains("Top 10 skills (2023-03-08)"));
        assert!(rendered.contains("Offers in window: 1"));
        assert!(rendered.contains("Published between 2023-03-08 and 2023-03-11"));
    }

    #[test]
    fn degraded_source_is_called_out() {
        let empty = OfferTable::empty();
        let rendered = render_filters(&FilterOptions::from_table(&empty), &summary(true));

        assert!(rendered.contains("Ingestion failed, showing an empty table: file not found"));
        assert!(rendered.contains("Cities: none"));
        assert!(!rendered.contains("Dates:"));
    }

    #[test]
    fn empty_ranking_reads_no_data() {
        let mut lines = Vec::new();
        push_ranking(&mut lines, &[]);
        assert_eq!(lines, vec!["  no data".to_string()]);
    }
}
