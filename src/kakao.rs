//! Kakao Local keyword-search client.
//!
//! Sweeps region × keyword query combinations, keeps only records the
//! category's filter accepts, and deduplicates by Kakao place id. Pagination
//! stops at the API's hard cap (3 pages of 15 per query), so dense
//! categories rely on the finer-grained region list instead.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};

use crate::category::Category;
use crate::model::RawPlace;

const SEARCH_URL: &str = "https://dapi.kakao.com/v2/local/search/keyword.json";
const PAGE_SIZE: u32 = 15;
const MAX_PAGES: u32 = 3;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const REQUEST_DELAY_MS: u64 = 100;
const REGION_DELAY_MS: u64 = 200;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default = "default_true")]
    is_end: bool,
}

impl Default for Meta {
    fn default() -> Self {
        Meta { is_end: true }
    }
}

fn default_true() -> bool {
    true
}

/// One Kakao search document. Coordinates arrive as strings: `x` is
/// longitude, `y` is latitude.
#[derive(Debug, Default, Deserialize)]
struct Document {
    #[serde(default)]
    id: String,
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    category_name: String,
    #[serde(default)]
    address_name: String,
    #[serde(default)]
    road_address_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    place_url: String,
    #[serde(default)]
    x: String,
    #[serde(default)]
    y: String,
}

fn doc_to_place(doc: &Document) -> Option<RawPlace> {
    let longitude: f64 = doc.x.parse().ok()?;
    let latitude: f64 = doc.y.parse().ok()?;
    Some(RawPlace {
        id: doc.id.clone(),
        name: doc.place_name.clone(),
        address: doc.address_name.clone(),
        road_address: doc.road_address_name.clone(),
        latitude,
        longitude,
        phone: doc.phone.clone(),
        url: doc.place_url.clone(),
    })
}

/// Sweep every region for the category and return the deduplicated,
/// filtered places.
pub async fn fetch_category(api_key: &str, category: Category) -> Result<Vec<RawPlace>> {
    let client = reqwest::Client::new();
    let regions = category.search_regions();

    let pb = ProgressBar::new(regions.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut seen: HashSet<String> = HashSet::new();
    let mut places: Vec<RawPlace> = Vec::new();

    for &region in regions {
        pb.set_message(region.to_string());
        for query in category.queries(region) {
            for page in 1..=MAX_PAGES {
                let resp = search_with_retry(&client, api_key, &query, page).await?;
                if resp.documents.is_empty() {
                    break;
                }

                for doc in &resp.documents {
                    let Some(place) = doc_to_place(doc) else {
                        warn!("Skipping record with bad coordinates: {}", doc.place_name);
                        continue;
                    };
                    if !category.accepts(&place, &doc.category_name) {
                        continue;
                    }
                    // Dedup by Kakao place id; records without one are dropped.
                    if !place.id.is_empty() && seen.insert(place.id.clone()) {
                        places.push(place);
                    }
                }

                if resp.meta.is_end {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;
            }
            tokio::time::sleep(Duration::from_millis(REQUEST_DELAY_MS)).await;
        }
        tokio::time::sleep(Duration::from_millis(REGION_DELAY_MS)).await;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Collected {} unique {} places across {} regions",
        places.len(),
        category.label(),
        regions.len()
    );
    Ok(places)
}

async fn search_with_retry(
    client: &reqwest::Client,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<SearchResponse> {
    for attempt in 0..=MAX_RETRIES {
        match search_page(client, api_key, query, page).await {
            Ok(resp) => return Ok(resp),
            Err(e) if should_retry(attempt, &e) => {
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "Retryable failure on '{}' page {} (attempt {}/{}), backing off {:.1}s: {}",
                    query,
                    page,
                    attempt + 1,
                    MAX_RETRIES,
                    backoff.as_secs_f64(),
                    e
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("the final attempt either returns the response or the error")
}

/// A failed attempt is retried while the budget lasts; the attempt at
/// MAX_RETRIES is the last one and its error propagates.
fn should_retry(attempt: u32, e: &anyhow::Error) -> bool {
    attempt < MAX_RETRIES && is_retryable(e)
}

fn is_retryable(e: &anyhow::Error) -> bool {
    let msg = e.to_string();
    msg.contains("429") || msg.contains("500") || msg.contains("502") || msg.contains("503")
}

async fn search_page(
    client: &reqwest::Client,
    api_key: &str,
    query: &str,
    page: u32,
) -> Result<SearchResponse> {
    let page = page.to_string();
    let size = PAGE_SIZE.to_string();
    let resp = client
        .get(SEARCH_URL)
        .header("Authorization", format!("KakaoAK {api_key}"))
        .query(&[
            ("query", query),
            ("page", page.as_str()),
            ("size", size.as_str()),
        ])
        .send()
        .await
        .with_context(|| format!("Kakao request failed for '{query}'"))?;

    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("Kakao search returned {} for '{}'", status.as_u16(), query);
    }

    resp.json::<SearchResponse>()
        .await
        .with_context(|| format!("Malformed Kakao response for '{query}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_response() {
        let json = r#"{
            "documents": [{
                "id": "26338954",
                "place_name": "맥도날드 서울시청점",
                "category_name": "음식점 > 패스트푸드 > 맥도날드",
                "address_name": "서울 중구 태평로1가 61-1",
                "road_address_name": "서울 중구 세종대로 14",
                "phone": "02-756-0259",
                "place_url": "http://place.map.kakao.com/26338954",
                "x": "126.9778222",
                "y": "37.5663174"
            }],
            "meta": {"is_end": false, "total_count": 1}
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.documents.len(), 1);
        assert!(!resp.meta.is_end);

        let place = doc_to_place(&resp.documents[0]).unwrap();
        assert_eq!(place.name, "맥도날드 서울시청점");
        assert!((place.latitude - 37.5663174).abs() < 1e-9);
        assert!((place.longitude - 126.9778222).abs() < 1e-9);
        assert_eq!(place.best_address(), "서울 중구 세종대로 14");
    }

    #[test]
    fn bad_coordinates_are_dropped() {
        let doc = Document {
            place_name: "좌표없음".into(),
            ..Default::default()
        };
        assert!(doc_to_place(&doc).is_none());
    }

    #[test]
    fn missing_meta_means_end() {
        let resp: SearchResponse = serde_json::from_str(r#"{"documents": []}"#).unwrap();
        assert!(resp.meta.is_end);
    }

    #[test]
    fn retryable_errors_recognized() {
        assert!(is_retryable(&anyhow::anyhow!("Kakao search returned 429 for 'x'")));
        assert!(is_retryable(&anyhow::anyhow!("Kakao search returned 503 for 'x'")));
        assert!(!is_retryable(&anyhow::anyhow!("Kakao search returned 401 for 'x'")));
    }

    #[test]
    fn retries_stop_at_the_cap() {
        let rate_limited = anyhow::anyhow!("Kakao search returned 429 for 'x'");
        assert!(should_retry(0, &rate_limited));
        assert!(should_retry(MAX_RETRIES - 1, &rate_limited));
        // The attempt at the cap is the final one; its error propagates.
        assert!(!should_retry(MAX_RETRIES, &rate_limited));
        assert!(!should_retry(0, &anyhow::anyhow!("Kakao search returned 401 for 'x'")));
    }
}
