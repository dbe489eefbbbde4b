use crate::analysis::{Plan, RunSummary};
use crate::store::Config;
use chrono::NaiveDateTime;
use std::fmt::Write;

/// The commented block written above the table. Every line starts with `#`.
pub fn format_header(config: &Config, plan: &Plan, created: NaiveDateTime) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "THIS IS AN AUTOGENERATED FILE. DO NOT EDIT THIS FILE DIRECTLY.");
    let _ = writeln!(out);
    let _ = writeln!(out, "Created on {}.", created.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);
    out.push_str(&run_description(config, plan));
    comment(&out)
}

/// The parameter sections, uncommented. Also logged when a run starts.
pub fn run_description(config: &Config, plan: &Plan) -> String {
    let mut out = String::new();
    let p = &config.parameters;
    let _ = writeln!(out, "GENERAL PARAMETERS");
    let _ = writeln!(out, "  Analysis period: {} - {}", p.date_start, p.date_end);
    let _ = writeln!(out, "  Start time: {:02} UTC", p.start_time);
    let _ = writeln!(out, "  Interval between model runs: {}h", p.model_interval);
    let _ = writeln!(out, "  Interval between lead times: {}h", p.step_interval);
    let _ = writeln!(out, "  Spin-up limit: t+{}", p.spinup_limit);
    let _ = writeln!(out);

    let pd = &config.predictand;
    let _ = writeln!(out, "PREDICTAND");
    let _ = writeln!(out, "  Code: {}", pd.code);
    match pd.accumulation {
        Some(acc) => {
            let _ = writeln!(out, "  Type: accumulated over {acc}h");
        }
        None => {
            let _ = writeln!(out, "  Type: instantaneous");
        }
    }
    if let Some(threshold) = plan.threshold() {
        let _ = writeln!(out, "  Min value: {} (scaled {})", pd.min_value, threshold);
    }
    let _ = writeln!(out, "  Error: {}", pd.error.column_name());
    let _ = writeln!(out, "  Units: {}", pd.units.as_deref().unwrap_or("-"));
    let _ = writeln!(out);

    let pr = &config.predictors;
    let _ = writeln!(out, "PREDICTORS");
    let _ = writeln!(out, "  Path: {}", pr.path.display());
    let _ = writeln!(out, "  Codes: {}", pr.codes.join(", "));
    let _ = writeln!(out, "  Sampling interval: {}h", pr.sampling_interval);
    let _ = writeln!(out);

    let _ = writeln!(out, "OBSERVATIONS");
    let _ = writeln!(out, "  Path: {}", config.observations.path.display());
    let _ = writeln!(out, "  Units: {}", config.observations.units.as_deref().unwrap_or("-"));
    let _ = writeln!(out);

    let _ = writeln!(out, "OUTPUT FILE");
    let _ = writeln!(out, "  Path: {}", p.out_path.display());
    let _ = writeln!(out, "  Format: {}", p.out_format.name());
    let _ = writeln!(out);

    let _ = writeln!(out, "COMPUTATIONS");
    let entries: Vec<_> = plan.base().chain(plan.derived()).collect();
    for (i, planned) in entries.iter().enumerate() {
        let c = &planned.computation;
        let connector = if i == entries.len() - 1 && plan.local_solar_time().is_none() { "`--" } else { "|--" };
        let role = if planned.is_reference { " [predictand]" } else if !planned.is_exposed() { " [hidden]" } else { "" };
        let inputs: Vec<_> = c.input_codes().collect();
        let _ = writeln!(
            out,
            "  {connector} {} ({}) = {}({}){role}",
            c.shortname,
            c.fullname,
            c.field,
            inputs.join(", ")
        );
    }
    if let Some(lst) = plan.local_solar_time() {
        let _ = writeln!(out, "  `-- {} ({}) = {}", lst.shortname, lst.fullname, lst.field);
    }
    out
}

/// Observation counts written below the table.
pub fn format_footer(config: &Config, plan: &Plan, summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "No of observations considered in the calibration period: {}",
        summary.observations_seen
    );
    if let (Some(acc), Some(threshold)) = (plan.accumulation(), plan.threshold()) {
        let units = config.observations.units.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "No of observations that correspond to {} >= {} {}/{}h: {}",
            plan.reference().shortname(),
            threshold,
            units,
            acc,
            summary.observations_retained
        );
    }
    if summary.cancelled {
        let _ = writeln!(out, "Run cancelled after {} case(s).", summary.cases_considered);
    }
    comment(&out)
}

fn comment(text: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| if line.is_empty() { "#".to_string() } else { format!("# {line}") })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::config::tests::SAMPLE;
    use chrono::NaiveDate;

    fn setup() -> (Config, Plan) {
        let config = Config::from_json_str(SAMPLE).unwrap();
        let plan = Plan::from_config(&config).unwrap();
        (config, plan)
    }

    #[test]
    fn test_header_is_fully_commented() {
        let (config, plan) = setup();
        let created = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(8, 30, 0).unwrap();
        let header = format_header(&config, &plan, created);

        assert!(header.lines().all(|l| l.starts_with('#')));
        assert!(header.contains("# Created on 2024-05-01 08:30:00."));
        assert!(header.contains("# GENERAL PARAMETERS"));
        assert!(header.contains("Analysis period: 2020-01-01 - 2020-01-02"));
        assert!(header.contains("|-- TP (Total Precipitation) = ACCUMULATED_FIELD(tp) [predictand]"));
        assert!(header.contains("|-- CP (Convective Precipitation) = ACCUMULATED_FIELD(cp) [hidden]"));
        assert!(header.contains("`-- CPR (Convective Precipitation Ratio) = RATIO_FIELD(CP, TP)"));
    }

    #[test]
    fn test_footer_counts() {
        let (mut config, plan) = setup();
        let summary = RunSummary { observations_seen: 12, observations_retained: 3, ..Default::default() };
        let footer = format_footer(&config, &plan, &summary);
        assert_eq!(
            footer,
            "# No of observations considered in the calibration period: 12\n\
             # No of observations that correspond to TP >= 1000 mm/6h: 3"
        );

        config.predictand.accumulation = None;
        let plan = Plan::from_config(&config).unwrap();
        let footer = format_footer(&config, &plan, &summary);
        assert_eq!(footer, "# No of observations considered in the calibration period: 12");
    }
}
