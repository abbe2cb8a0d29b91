use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;
use tracing::info;

use crate::aggregate::{all_values, count_by, count_by_within, values_for};
use crate::dataset::Datasets;
use crate::stats::DashboardData;
use crate::utils::format_number;
use crate::Args;

/// Computes every mapping the presentation layer consumes, fresh from the
/// loaded tables. Nothing is cached between calls.
pub fn compute_dashboard(datasets: &Datasets) -> Result<DashboardData> {
    let start_time = Instant::now();
    info!(action = "start", component = "dashboard", "Computing dashboard aggregates");

    let state_counts = count_by(&datasets.records, "state")?;

    let mut city_counts = Vec::with_capacity(state_counts.len());
    let mut state_income = Vec::with_capacity(state_counts.len());
    for state in state_counts.keys() {
        let cities = count_by_within(&datasets.records, "state", state, "city")?;
        city_counts.push((state.to_string(), cities));

        let income = values_for(&datasets.income, "State_ab", state, "Mean")?;
        state_income.push((state.to_string(), income));
    }

    let us_income = all_values(&datasets.income, "Mean")?;

    let total_time = start_time.elapsed();
    info!(
        action = "complete",
        component = "dashboard",
        state_count = state_counts.len(),
        record_count = datasets.records.len(),
        duration_ms = total_time.as_millis(),
        "Dashboard aggregates computed"
    );

    Ok(DashboardData {
        state_counts,
        city_counts,
        state_income,
        us_income,
        records: datasets.records.clone(),
    })
}

pub fn print_dashboard(data: &DashboardData, args: &Args) {
    println!("\n--- State & City Dashboard ---");
    println!("Generated: {}", chrono::Local::now().format("%B %-d, %Y"));
    println!("Total records: {}", format_number(data.records.len() as u64));
    println!(
        "States represented: {}",
        format_number(data.state_counts.len() as u64)
    );
    println!("Income rows: {}", format_number(data.us_income.len() as u64));

    println!(
        "\nTop {} states by record count:",
        std::cmp::min(args.top, data.state_counts.len())
    );

    for (((state, count), (_, cities)), (_, income)) in data
        .state_counts
        .iter()
        .zip(data.city_counts.iter())
        .zip(data.state_income.iter())
        .take(args.top)
    {
        println!("- {}: {} records", state, format_number(count));
        for (city, city_count) in cities.iter().take(args.cities) {
            println!("    {}: {}", city, format_number(city_count));
        }
        if !income.is_empty() {
            let means: Vec<String> = income.iter().map(|mean| format!("{:.2}", mean)).collect();
            println!("    mean household income: {}", means.join(", "));
        }
    }
}

pub fn write_json(data: &DashboardData, args: &Args) -> Result<()> {
    let json =
        serde_json::to_string_pretty(data).context("Failed to serialize dashboard data")?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write output to {:?}", path))?;
            info!(action = "write", component = "dashboard", path = ?path, "Dashboard JSON written");
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn sample_datasets() -> Datasets {
        Datasets {
            records: Table::new(
                vec!["state".to_string(), "city".to_string()],
                vec![
                    vec!["CA".to_string(), "LA".to_string()],
                    vec!["CA".to_string(), "SF".to_string()],
                    vec!["NY".to_string(), "NYC".to_string()],
                    vec!["TX".to_string(), "Austin".to_string()],
                ],
            ),
            income: Table::new(
                vec!["State_ab".to_string(), "Mean".to_string()],
                vec![
                    vec!["CA".to_string(), "70000".to_string()],
                    vec!["NY".to_string(), "65000".to_string()],
                ],
            ),
        }
    }

    #[test]
    fn dashboard_state_counts_cover_every_record() {
        let datasets = sample_datasets();
        let data = compute_dashboard(&datasets).unwrap();
        assert_eq!(data.state_counts.total(), datasets.records.len() as u64);
    }

    #[test]
    fn dashboard_city_totals_match_state_counts() {
        let data = compute_dashboard(&sample_datasets()).unwrap();
        for ((state, count), (city_state, cities)) in
            data.state_counts.iter().zip(data.city_counts.iter())
        {
            assert_eq!(state, city_state);
            assert_eq!(cities.total(), count);
        }
    }

    #[test]
    fn dashboard_income_follows_state_order() {
        let data = compute_dashboard(&sample_datasets()).unwrap();
        for ((state, _), (income_state, _)) in
            data.state_counts.iter().zip(data.state_income.iter())
        {
            assert_eq!(state, income_state);
        }
    }

    #[test]
    fn state_without_income_yields_empty_list() {
        let data = compute_dashboard(&sample_datasets()).unwrap();
        let (_, texas_income) = data
            .state_income
            .iter()
            .find(|(state, _)| state == "TX")
            .unwrap();
        assert!(texas_income.is_empty());
    }

    #[test]
    fn dashboard_serializes_full_contract() {
        let data = compute_dashboard(&sample_datasets()).unwrap();
        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value["state_counts"]["CA"], 2);
        assert_eq!(value["city_counts"]["CA"]["LA"], 1);
        assert_eq!(value["state_income"]["NY"][0], 65000.0);
        assert_eq!(value["us_income"].as_array().unwrap().len(), 2);
        assert_eq!(value["records"][0]["city"], "LA");
    }
}
