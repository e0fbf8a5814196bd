//! NEIS open-data client for school attributes.
//!
//! The schoolInfo endpoint is queried once per provincial education office.
//! Its JSON envelope is irregular (the first array element is result
//! metadata, the second carries the rows), so the walk is defensive and a
//! failed office degrades to zero rows instead of aborting the sweep.

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{info, warn};

use crate::category::SchoolLevel;
use crate::model::SchoolInfo;

const SCHOOL_INFO_URL: &str = "https://open.neis.go.kr/hub/schoolInfo";
const PAGE_SIZE: u32 = 1000;
const REQUEST_DELAY_MS: u64 = 100;

/// Provincial education office codes (ATPT_OFCDC_SC_CODE).
static SIDO_CODES: &[(&str, &str)] = &[
    ("서울", "B10"),
    ("부산", "C10"),
    ("대구", "D10"),
    ("인천", "E10"),
    ("광주", "F10"),
    ("대전", "G10"),
    ("울산", "H10"),
    ("세종", "I10"),
    ("경기", "J10"),
    ("강원", "K10"),
    ("충북", "M10"),
    ("충남", "N10"),
    ("전북", "P10"),
    ("전남", "Q10"),
    ("경북", "R10"),
    ("경남", "S10"),
    ("제주", "T10"),
];

/// Fetch every school of the given level nationwide.
pub async fn fetch_all_schools(api_key: &str, level: SchoolLevel) -> Result<Vec<SchoolInfo>> {
    let client = reqwest::Client::new();
    let mut schools = Vec::new();

    let pb = ProgressBar::new(SIDO_CODES.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    for &(sido_name, sido_code) in SIDO_CODES {
        pb.set_message(sido_name.to_string());

        let mut page = 1;
        loop {
            let rows = match fetch_page(&client, api_key, sido_code, level, page).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("NEIS query failed for {} page {}: {}", sido_name, page, e);
                    Vec::new()
                }
            };
            let count = rows.len();
            schools.extend(rows.iter().map(|row| row_to_school(row, sido_name)));

            if count < PAGE_SIZE as usize {
                break;
            }
            page += 1;
            tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;
        }

        tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Fetched {} {} records from NEIS", schools.len(), level.kind_name());
    Ok(schools)
}

async fn fetch_page(
    client: &reqwest::Client,
    api_key: &str,
    sido_code: &str,
    level: SchoolLevel,
    page: u32,
) -> Result<Vec<Value>> {
    let page = page.to_string();
    let size = PAGE_SIZE.to_string();
    let resp = client
        .get(SCHOOL_INFO_URL)
        .query(&[
            ("KEY", api_key),
            ("Type", "json"),
            ("pIndex", page.as_str()),
            ("pSize", size.as_str()),
            ("ATPT_OFCDC_SC_CODE", sido_code),
            ("SCHUL_KND_SC_NM", level.kind_name()),
        ])
        .send()
        .await
        .context("NEIS request failed")?
        .error_for_status()
        .context("NEIS returned an error status")?;

    let body: Value = resp.json().await.context("Malformed NEIS response")?;
    Ok(extract_rows(&body))
}

/// Pull the row array out of the schoolInfo envelope. An error envelope
/// (quota exceeded, no data) has no second element and yields no rows.
fn extract_rows(body: &Value) -> Vec<Value> {
    body.get("schoolInfo")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.get(1))
        .and_then(|v| v.get("row"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default()
}

fn row_to_school(row: &Value, sido_name: &str) -> SchoolInfo {
    let field = |key: &str| -> String {
        row.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    let road_address = field("ORG_RDNMA");
    let address = if road_address.is_empty() {
        field("ORG_RDNDA")
    } else {
        road_address
    };
    let school_code = field("SD_SCHUL_CODE");
    let office_code = field("ATPT_OFCDC_SC_CODE");

    SchoolInfo {
        name: field("SCHUL_NM"),
        address,
        coed_type: normalize_coed(&field("COEDU_SC_NM")),
        found_type: field("FOND_SC_NM"),
        sido: sido_name.to_string(),
        neis_code: format!("{office_code}{school_code}"),
        school_code,
    }
}

/// Normalize the NEIS coeducation label to the display vocabulary.
fn normalize_coed(raw: &str) -> String {
    match raw {
        "남" => "남학교".to_string(),
        "여" => "여학교".to_string(),
        "남여공학" => "공학".to_string(),
        "" => "미분류".to_string(),
        other => other.to_string(),
    }
}
