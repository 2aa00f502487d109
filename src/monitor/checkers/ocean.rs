//! Freshness of ocean-portal download tasks, inferred from the dates embedded in
//! the names of the files each task last fetched and will fetch next.

use chrono::format::{Parsed, StrftimeItems};
use chrono::{Datelike, NaiveDate, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::CheckOutcome;
use super::partner::{PartnerClient, PartnerError, extract_items};
use crate::config::MonitorConfig;
use crate::db::enums::ServiceStatus;
use crate::db::models::MonitoredService;

pub const OCEAN_CONTEXT: &str = "Ocean Portal API check";
pub const OCEAN_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

const CORAL_OUTLOOK_TASK: &str = "download_coral_bleaching_monthly_outlook";
const CORAL_OUTLOOK_PREFIX: &str = "cfsv2_outlook-060perc_4mon-and-wkly_v5_icwk";
const CORAL_OUTLOOK_SUFFIX: &str = "_for_20250706to20251026.nc";
const SSH_MONTHLY_TASK: &str = "calculate_ssh_monthly";
const SST_ANOMALIES_TASK: &str = "calculate_sst_anomalies_monthly";
const SST_ANOMALIES_PREFIX: &str = "oisst-avhrr-v02r01.";
const SST_ANOMALIES_SUFFIX: &str = ".nc";
const BLUELINK_FORECAST_TASK: &str = "download_bluelink_daily_forecast";

/// Dataset whose monthly product is published one month behind.
const LAGGING_MONTHLY_DATASET: i64 = 2;

static SSH_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{6})_(\d{6})\.nc$").expect("static regex is valid")
});

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OceanDataset {
    pub id: i64,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub frequency_hours: Option<i64>,
    #[serde(default)]
    pub frequency_days: Option<i64>,
    #[serde(default)]
    pub frequency_months: Option<i64>,
    #[serde(default)]
    pub download_file_prefix: Option<String>,
    #[serde(default)]
    pub download_file_infix: Option<String>,
    #[serde(default)]
    pub download_file_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OceanTask {
    pub id: i64,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub last_download_file: Option<String>,
    #[serde(default)]
    pub next_download_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Monthly,
    Unclassified,
}

/// Daily when an hour or day frequency is set, monthly when a month frequency is set.
/// The month rule is applied last, so a dataset with both is monthly.
pub fn classify(dataset: &OceanDataset) -> Cadence {
    let set = |v: Option<i64>| v.is_some_and(|v| v != 0);
    let mut cadence = Cadence::Unclassified;
    if set(dataset.frequency_hours) || set(dataset.frequency_days) {
        cadence = Cadence::Daily;
    }
    if set(dataset.frequency_months) {
        cadence = Cadence::Monthly;
    }
    cadence
}

/// Period dates found in a task's next (current) and last download file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodDates {
    pub current_start: Option<NaiveDate>,
    pub current_end: Option<NaiveDate>,
    pub last_start: Option<NaiveDate>,
    pub last_end: Option<NaiveDate>,
}

/// Drops `prefix_len` leading and `suffix_len` trailing characters.
fn strip_affixes(file: &str, prefix_len: usize, suffix_len: usize) -> &str {
    let total = file.chars().count();
    if prefix_len + suffix_len >= total {
        return "";
    }
    let byte_at = |n: usize| file.char_indices().nth(n).map_or(file.len(), |(i, _)| i);
    &file[byte_at(prefix_len)..byte_at(total - suffix_len)]
}

/// Parses `value` with a strftime `format`. A format without a day or month
/// lands on the first day or month.
pub fn parse_period_date(value: &str, format: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    let mut parsed = Parsed::new();
    chrono::format::parse(&mut parsed, value, StrftimeItems::new(format)).ok()?;
    // Both setters fail harmlessly when the format already supplied the field.
    let _ = parsed.set_month(1);
    let _ = parsed.set_day(1);
    parsed.to_naive_date().ok()
}

fn parse_pair(value: &str, format: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (start_format, end_format) = split_exactly_two(format)?;
    let (start, end) = split_exactly_two(value)?;
    Some((parse_period_date(start, start_format)?, parse_period_date(end, end_format)?))
}

fn split_exactly_two(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.split('_');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

fn ssh_pair(file: &str) -> Option<(NaiveDate, NaiveDate)> {
    let captures = SSH_PAIR.captures(file)?;
    Some((
        parse_period_date(&captures[1], "%Y%m")?,
        parse_period_date(&captures[2], "%Y%m")?,
    ))
}

/// Extracts the period dates for `task` using `dataset`'s file naming convention
/// and the per-task naming exceptions. Unparseable names yield no dates.
pub fn extract_period_dates(dataset: &OceanDataset, task: &OceanTask) -> PeriodDates {
    let task_name = task.task_name.trim();
    let next_file = task.next_download_file.as_deref().unwrap_or_default();
    let last_file = task.last_download_file.as_deref().unwrap_or_default();
    let infix = dataset.download_file_infix.as_deref().unwrap_or("none");
    let (prefix, suffix) = if task_name == CORAL_OUTLOOK_TASK {
        (CORAL_OUTLOOK_PREFIX, CORAL_OUTLOOK_SUFFIX)
    } else {
        (
            dataset.download_file_prefix.as_deref().unwrap_or_default(),
            dataset.download_file_suffix.as_deref().unwrap_or_default(),
        )
    };
    let (prefix_len, suffix_len) = (prefix.chars().count(), suffix.chars().count());
    let next_str = strip_affixes(next_file, prefix_len, suffix_len);
    let last_str = strip_affixes(last_file, prefix_len, suffix_len);

    if infix.contains("_%H") {
        let first_token = |s: &str| s.split('_').next().unwrap_or_default().to_string();
        let current_start = parse_period_date(&first_token(next_str), "%Y%m%d");
        let last_start = parse_period_date(&first_token(last_str), "%Y%m%d");
        return match (current_start, last_start) {
            (Some(_), Some(_)) => PeriodDates {
                current_start,
                last_start,
                ..Default::default()
            },
            _ => PeriodDates::default(),
        };
    }

    if next_str.contains('_') {
        if task_name == SSH_MONTHLY_TASK {
            // A missing current pair leaves everything unset; a missing last pair only the last dates.
            let Some((current_start, current_end)) = ssh_pair(next_file) else {
                return PeriodDates::default();
            };
            let last = ssh_pair(last_file);
            return PeriodDates {
                current_start: Some(current_start),
                current_end: Some(current_end),
                last_start: last.map(|(start, _)| start),
                last_end: last.map(|(_, end)| end),
            };
        }
        return match (parse_pair(next_str, infix), parse_pair(last_str, infix)) {
            (Some((cs, ce)), Some((ls, le))) => PeriodDates {
                current_start: Some(cs),
                current_end: Some(ce),
                last_start: Some(ls),
                last_end: Some(le),
            },
            _ => PeriodDates::default(),
        };
    }

    let (next_str, last_str, format) = if task_name == SST_ANOMALIES_TASK {
        let (prefix_len, suffix_len) = (SST_ANOMALIES_PREFIX.len(), SST_ANOMALIES_SUFFIX.len());
        (
            strip_affixes(next_file, prefix_len, suffix_len),
            strip_affixes(last_file, prefix_len, suffix_len),
            "%Y%m",
        )
    } else if task_name == BLUELINK_FORECAST_TASK || infix == "none" {
        return PeriodDates::default();
    } else {
        (next_str, last_str, infix)
    };

    match (parse_period_date(next_str, format), parse_period_date(last_str, format)) {
        (Some(current_start), Some(last_start)) => PeriodDates {
            current_start: Some(current_start),
            last_start: Some(last_start),
            ..Default::default()
        },
        _ => PeriodDates::default(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: ServiceStatus,
    pub message: String,
}

impl Verdict {
    fn new(status: ServiceStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}

/// Reduces the extracted dates to a status relative to `today`.
pub fn evaluate_freshness(
    dataset_id: i64,
    cadence: Cadence,
    dates: &PeriodDates,
    today: NaiveDate,
) -> Verdict {
    match cadence {
        Cadence::Monthly => {
            let Some(date) = dates.current_end.or(dates.current_start) else {
                return Verdict::new(
                    ServiceStatus::Unknown,
                    format!("Dataset {dataset_id}: no period date in the next download file"),
                );
            };
            let expected = if dataset_id == LAGGING_MONTHLY_DATASET {
                previous_month(today)
            } else {
                (today.year(), today.month())
            };
            if (date.year(), date.month()) == expected {
                Verdict::new(ServiceStatus::Up, format!("Dataset {dataset_id}: monthly period {date} is current"))
            } else {
                Verdict::new(
                    ServiceStatus::Down,
                    format!(
                        "Dataset {dataset_id}: monthly period {date} is stale, expected {:04}-{:02}",
                        expected.0, expected.1
                    ),
                )
            }
        }
        Cadence::Daily => {
            let Some(date) = dates.last_start else {
                return Verdict::new(
                    ServiceStatus::Unknown,
                    format!("Dataset {dataset_id}: no period date in the last download file"),
                );
            };
            let yesterday = today - TimeDelta::days(1);
            let two_days_ago = today - TimeDelta::days(2);
            if date == yesterday || date == two_days_ago {
                Verdict::new(ServiceStatus::Up, format!("Dataset {dataset_id}: last download {date} is current"))
            } else {
                Verdict::new(
                    ServiceStatus::Down,
                    format!("Dataset {dataset_id}: last download {date} is stale, expected {yesterday} or {two_days_ago}"),
                )
            }
        }
        Cadence::Unclassified => Verdict::new(
            ServiceStatus::Unknown,
            format!("Dataset {dataset_id}: no recognised download frequency"),
        ),
    }
}

/// Full assessment of one dataset; a dataset without a task has no dates.
pub fn assess(dataset: &OceanDataset, task: Option<&OceanTask>, today: NaiveDate) -> Verdict {
    let dates = task
        .map(|task| extract_period_dates(dataset, task))
        .unwrap_or_default();
    debug!(dataset_id = dataset.id, ?dates, "Extracted ocean period dates.");
    evaluate_freshness(dataset.id, classify(dataset), &dates, today)
}

/// Leading integer of a `"<id>: <short_name>"` service name.
pub fn parse_task_id(service_name: &str) -> Option<i64> {
    let token = service_name.trim_start().split([':', ' ']).next()?;
    token.parse().ok()
}

/// Both ocean collections, each sorted by ascending id.
#[derive(Debug, Clone, Default)]
pub struct OceanCatalogue {
    pub datasets: Vec<OceanDataset>,
    pub tasks: Vec<OceanTask>,
}

fn decode_collection<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, PartnerError> {
    extract_items(value)?
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(PartnerError::from))
        .collect()
}

impl OceanCatalogue {
    pub async fn fetch(partner: &PartnerClient, config: &MonitorConfig) -> Result<Self, PartnerError> {
        let datasets = partner.get_json(&config.ocean_dataset_url(), OCEAN_FETCH_TIMEOUT).await?;
        let tasks = partner.get_json(&config.ocean_task_url(), OCEAN_FETCH_TIMEOUT).await?;
        Self::from_json(datasets, tasks)
    }

    pub fn from_json(datasets: Value, tasks: Value) -> Result<Self, PartnerError> {
        let mut datasets: Vec<OceanDataset> = decode_collection(datasets)?;
        let mut tasks: Vec<OceanTask> = decode_collection(tasks)?;
        datasets.sort_by_key(|d| d.id);
        tasks.sort_by_key(|t| t.id);
        Ok(Self { datasets, tasks })
    }

    pub fn dataset(&self, id: i64) -> Option<&OceanDataset> {
        self.datasets.iter().find(|d| d.id == id)
    }

    pub fn task(&self, id: i64) -> Option<&OceanTask> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

pub async fn check_ocean(
    partner: &PartnerClient,
    config: &MonitorConfig,
    service: &MonitoredService,
    today: NaiveDate,
) -> CheckOutcome {
    let Some(task_id) = parse_task_id(&service.name) else {
        return CheckOutcome::new(
            ServiceStatus::Down,
            format!("Cannot derive an ocean task id from service name '{}'", service.name),
            OCEAN_CONTEXT,
        );
    };

    let catalogue = match OceanCatalogue::fetch(partner, config).await {
        Ok(catalogue) => catalogue,
        Err(e) => {
            warn!(service_id = service.id, error = %e, "Failed to fetch ocean portal data.");
            return CheckOutcome::new(
                ServiceStatus::Down,
                format!("Failed to fetch ocean portal data: {e}"),
                OCEAN_CONTEXT,
            );
        }
    };

    let Some(dataset) = catalogue.dataset(task_id) else {
        return CheckOutcome::new(ServiceStatus::Down, format!("Dataset {task_id} not found"), OCEAN_CONTEXT);
    };
    let Some(task) = catalogue.task(task_id) else {
        return CheckOutcome::new(ServiceStatus::Down, format!("Task {task_id} not found"), OCEAN_CONTEXT);
    };

    let verdict = assess(dataset, Some(task), today);
    CheckOutcome::new(verdict.status, verdict.message, OCEAN_CONTEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dataset(id: i64, prefix: &str, infix: &str, suffix: &str) -> OceanDataset {
        OceanDataset {
            id,
            short_name: format!("ds{id}"),
            download_file_prefix: Some(prefix.to_string()),
            download_file_infix: Some(infix.to_string()),
            download_file_suffix: Some(suffix.to_string()),
            ..Default::default()
        }
    }

    fn task(id: i64, name: &str, last: &str, next: &str) -> OceanTask {
        OceanTask {
            id,
            task_name: name.to_string(),
            last_download_file: Some(last.to_string()),
            next_download_file: Some(next.to_string()),
        }
    }

    #[test]
    fn test_months_override_daily_classification() {
        let mut ds = OceanDataset::default();
        assert_eq!(classify(&ds), Cadence::Unclassified);
        ds.frequency_days = Some(1);
        assert_eq!(classify(&ds), Cadence::Daily);
        ds.frequency_months = Some(1);
        assert_eq!(classify(&ds), Cadence::Monthly);
        ds.frequency_days = Some(0);
        ds.frequency_hours = Some(6);
        assert_eq!(classify(&ds), Cadence::Monthly);
    }

    #[test]
    fn test_parse_period_date_defaults_missing_fields() {
        assert_eq!(parse_period_date("202603", "%Y%m"), Some(date(2026, 3, 1)));
        assert_eq!(parse_period_date("2026", "%Y"), Some(date(2026, 1, 1)));
        assert_eq!(parse_period_date("20260315", "%Y%m%d"), Some(date(2026, 3, 15)));
        assert_eq!(parse_period_date("2026-03-15", "%Y%m%d"), None);
        assert_eq!(parse_period_date("", "%Y%m"), None);
    }

    #[test]
    fn test_strip_affixes() {
        assert_eq!(strip_affixes("sst_20260301.nc", 4, 3), "20260301");
        assert_eq!(strip_affixes("abc", 2, 2), "");
        assert_eq!(strip_affixes("abc.nc", 0, 0), "abc.nc");
    }

    #[test]
    fn test_single_date_infix() {
        let ds = dataset(5, "sst_", "%Y%m%d", ".nc");
        let t = task(5, "download_sst", "sst_20260309.nc", "sst_20260310.nc");
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 3, 10)));
        assert_eq!(dates.last_start, Some(date(2026, 3, 9)));
        assert_eq!(dates.current_end, None);
    }

    #[test]
    fn test_hourly_infix_uses_first_token() {
        let ds = dataset(1, "wave_", "%Y%m%d_%H", ".nc");
        let t = task(1, "download_wave", "wave_20260309_12.nc", "wave_20260310_00.nc");
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 3, 10)));
        assert_eq!(dates.last_start, Some(date(2026, 3, 9)));
    }

    #[test]
    fn test_pair_infix_splits_start_and_end() {
        let ds = dataset(9, "chl_", "%Y%m%d_%Y%m%d", ".nc");
        let t = task(9, "download_chl", "chl_20260201_20260228.nc", "chl_20260301_20260331.nc");
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 3, 1)));
        assert_eq!(dates.current_end, Some(date(2026, 3, 31)));
        assert_eq!(dates.last_end, Some(date(2026, 2, 28)));
    }

    #[test]
    fn test_ssh_monthly_reads_the_filename_tail() {
        let ds = dataset(15, "ssh_anom_", "%Y%m", ".nc");
        let t = task(
            15,
            " calculate_ssh_monthly ",
            "ssh_anom_202601_202602.nc",
            "ssh_anom_202602_202603.nc",
        );
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 2, 1)));
        assert_eq!(dates.current_end, Some(date(2026, 3, 1)));
        assert_eq!(dates.last_start, Some(date(2026, 1, 1)));
    }

    #[test]
    fn test_sst_anomalies_override() {
        let ds = dataset(4, "ignored", "%Y-%m", "ignored");
        let t = task(
            4,
            "calculate_sst_anomalies_monthly",
            "oisst-avhrr-v02r01.202602.nc",
            "oisst-avhrr-v02r01.202603.nc",
        );
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 3, 1)));
        assert_eq!(dates.last_start, Some(date(2026, 2, 1)));
    }

    #[test]
    fn test_coral_outlook_override() {
        let ds = dataset(17, "wrong_prefix", "%Y%m%d", "wrong_suffix");
        let file = |d: &str| format!("{CORAL_OUTLOOK_PREFIX}{d}{CORAL_OUTLOOK_SUFFIX}");
        let t = task(17, CORAL_OUTLOOK_TASK, &file("20260301"), &file("20260308"));
        let dates = extract_period_dates(&ds, &t);
        assert_eq!(dates.current_start, Some(date(2026, 3, 8)));
    }

    #[test]
    fn test_dateless_tasks_have_no_dates() {
        let ds = dataset(3, "bl_", "none", ".nc");
        let t = task(3, "download_other", "bl_x.nc", "bl_y.nc");
        assert_eq!(extract_period_dates(&ds, &t), PeriodDates::default());

        let ds = dataset(6, "bl_", "%Y%m%d", ".nc");
        let t = task(6, BLUELINK_FORECAST_TASK, "bl_20260301.nc", "bl_20260302.nc");
        assert_eq!(extract_period_dates(&ds, &t), PeriodDates::default());
    }

    #[test]
    fn test_garbage_filename_yields_no_dates() {
        let ds = dataset(5, "sst_", "%Y%m%d", ".nc");
        let t = task(5, "download_sst", "sst_latest.nc", "sst_pending.nc");
        assert_eq!(extract_period_dates(&ds, &t), PeriodDates::default());
    }

    #[test]
    fn test_monthly_freshness() {
        let today = date(2026, 3, 10);
        let in_march = PeriodDates {
            current_start: Some(date(2026, 3, 1)),
            ..Default::default()
        };
        let in_february = PeriodDates {
            current_start: Some(date(2026, 2, 1)),
            ..Default::default()
        };

        assert_eq!(evaluate_freshness(9, Cadence::Monthly, &in_march, today).status, ServiceStatus::Up);
        assert_eq!(evaluate_freshness(9, Cadence::Monthly, &in_february, today).status, ServiceStatus::Down);
        assert_eq!(evaluate_freshness(2, Cadence::Monthly, &in_february, today).status, ServiceStatus::Up);
        assert_eq!(evaluate_freshness(2, Cadence::Monthly, &in_march, today).status, ServiceStatus::Down);
        assert_eq!(
            evaluate_freshness(9, Cadence::Monthly, &PeriodDates::default(), today).status,
            ServiceStatus::Unknown
        );
    }

    #[test]
    fn test_monthly_prefers_the_period_end() {
        let today = date(2026, 3, 10);
        let dates = PeriodDates {
            current_start: Some(date(2026, 2, 1)),
            current_end: Some(date(2026, 3, 1)),
            ..Default::default()
        };
        assert_eq!(evaluate_freshness(15, Cadence::Monthly, &dates, today).status, ServiceStatus::Up);
    }

    #[test]
    fn test_lagging_dataset_across_new_year() {
        let today = date(2027, 1, 5);
        let dates = PeriodDates {
            current_start: Some(date(2026, 12, 1)),
            ..Default::default()
        };
        assert_eq!(evaluate_freshness(2, Cadence::Monthly, &dates, today).status, ServiceStatus::Up);
    }

    #[test]
    fn test_daily_freshness() {
        let today = date(2026, 3, 10);
        let last = |d| PeriodDates {
            last_start: Some(d),
            ..Default::default()
        };
        let status = |dates: PeriodDates| evaluate_freshness(5, Cadence::Daily, &dates, today).status;

        assert_eq!(status(last(date(2026, 3, 9))), ServiceStatus::Up);
        assert_eq!(status(last(date(2026, 3, 8))), ServiceStatus::Up);
        assert_eq!(status(last(date(2026, 3, 7))), ServiceStatus::Down);
        assert_eq!(status(last(date(2026, 3, 10))), ServiceStatus::Down);
        assert_eq!(status(PeriodDates::default()), ServiceStatus::Unknown);
    }

    #[test]
    fn test_missing_next_file_is_unknown() {
        let today = date(2026, 3, 10);
        let mut monthly = dataset(9, "chl_", "%Y%m", ".nc");
        monthly.frequency_months = Some(1);
        let mut pending = task(9, "download_chl", "chl_202602.nc", "");
        pending.next_download_file = None;

        assert_eq!(extract_period_dates(&monthly, &pending), PeriodDates::default());
        let verdict = assess(&monthly, Some(&pending), today);
        assert_eq!(verdict.status, ServiceStatus::Unknown);

        let mut daily = dataset(5, "sst_", "%Y%m%d", ".nc");
        daily.frequency_days = Some(1);
        let mut pending = task(5, "download_sst", "sst_20260309.nc", "");
        pending.next_download_file = None;
        assert_eq!(assess(&daily, Some(&pending), today).status, ServiceStatus::Unknown);
    }

    #[test]
    fn test_unclassified_is_unknown() {
        let dates = PeriodDates {
            last_start: Some(date(2026, 3, 9)),
            ..Default::default()
        };
        let verdict = evaluate_freshness(5, Cadence::Unclassified, &dates, date(2026, 3, 10));
        assert_eq!(verdict.status, ServiceStatus::Unknown);
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id("12: sst_daily"), Some(12));
        assert_eq!(parse_task_id("  3 : wave"), Some(3));
        assert_eq!(parse_task_id("sst: 12"), None);
        assert_eq!(parse_task_id(""), None);
    }

    #[test]
    fn test_catalogue_sorts_and_unwraps() {
        let datasets = serde_json::json!({"results": [{"id": 3}, {"id": 1}]});
        let tasks = serde_json::json!([{"id": 2, "task_name": "b"}, {"id": 1, "task_name": "a"}]);
        let catalogue = OceanCatalogue::from_json(datasets, tasks).unwrap();
        assert_eq!(catalogue.datasets.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(catalogue.task(1).map(|t| t.task_name.as_str()), Some("a"));
    }
}
