//! Reconciliation: joining pins against reference records.
//!
//! Two joins, both in-memory and in-place:
//! - region reconciliation against a raw search snapshot, keyed by
//!   `name|address`, with address-text extraction as the fallback so every
//!   pin ends up with a region;
//! - school enrichment against NEIS records, keyed by whitespace-stripped
//!   name, with no fallback.

use std::collections::HashMap;

use crate::model::{Pin, RawPlace, SchoolInfo};
use crate::region::extract_region;

fn raw_key(name: &str, address: &str) -> String {
    format!("{name}|{address}")
}

fn name_key(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Set `region` on every pin, and `url` where the pin lacks one, from the
/// raw snapshot. Pins absent from the snapshot get their region extracted
/// from their own description text instead. Returns the number of pins
/// matched via the snapshot (fallback derivations are not counted).
pub fn apply_regions(pins: &mut [Pin], places: &[RawPlace]) -> usize {
    // Last write wins on duplicate keys; the upstream dataset is expected
    // to be unique on name+address.
    let mut by_key: HashMap<String, (&'static str, &str)> = HashMap::new();
    for place in places {
        let address = place.best_address();
        by_key.insert(
            raw_key(&place.name, address),
            (extract_region(address), place.url.as_str()),
        );
    }

    let mut matched = 0;
    for pin in pins.iter_mut() {
        match by_key.get(&raw_key(&pin.title, &pin.description)) {
            Some((region, url)) => {
                pin.region = Some(region.to_string());
                if pin.url.as_deref().unwrap_or("").is_empty() && !url.is_empty() {
                    pin.url = Some(url.to_string());
                }
                matched += 1;
            }
            None => {
                pin.region = Some(extract_region(&pin.description).to_string());
            }
        }
    }
    matched
}

/// Copy NEIS attributes onto school pins whose whitespace-stripped title
/// matches a record's name. Unmatched pins are left untouched. Returns the
/// number of matched pins.
pub fn apply_school_info(pins: &mut [Pin], schools: &[SchoolInfo]) -> usize {
    let mut by_name: HashMap<String, &SchoolInfo> = HashMap::new();
    for info in schools {
        by_name.insert(name_key(&info.name), info);
    }

    let mut matched = 0;
    for pin in pins.iter_mut() {
        if let Some(info) = by_name.get(&name_key(&pin.title)) {
            pin.coed_type = Some(info.coed_type.clone());
            pin.found_type = Some(info.found_type.clone());
            pin.neis_code = Some(info.neis_code.clone());
            matched += 1;
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::UNKNOWN_REGION;

    fn pin(title: &str, description: &str) -> Pin {
        Pin {
            latitude: 0.0,
            longitude: 0.0,
            title: title.into(),
            description: description.into(),
            region: None,
            url: None,
            coed_type: None,
            found_type: None,
            neis_code: None,
        }
    }

    fn place(name: &str, address: &str) -> RawPlace {
        RawPlace {
            name: name.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    #[test]
    fn matched_pin_gets_region_from_snapshot() {
        let places = vec![place("서울도서관", "서울특별시 중구 세종대로 110")];
        let mut pins = vec![pin("서울도서관", "서울특별시 중구 세종대로 110")];
        let matched = apply_regions(&mut pins, &places);
        assert_eq!(matched, 1);
        assert_eq!(pins[0].region.as_deref(), Some("서울특별시"));
    }

    #[test]
    fn unmatched_pin_falls_back_to_own_address() {
        let mut pins = vec![pin("이름없음", "부산광역시 해운대구 우동 1408-5")];
        let matched = apply_regions(&mut pins, &[]);
        assert_eq!(matched, 0);
        assert_eq!(pins[0].region.as_deref(), Some("부산광역시"));
    }

    #[test]
    fn unrecognized_address_gets_sentinel() {
        let mut pins = vec![pin("미확인", "알수없는주소")];
        let matched = apply_regions(&mut pins, &[]);
        assert_eq!(matched, 0);
        assert_eq!(pins[0].region.as_deref(), Some(UNKNOWN_REGION));
    }

    #[test]
    fn every_pin_has_region_after_pass() {
        let places = vec![place("A", "서울 중구")];
        let mut pins = vec![
            pin("A", "서울 중구"),
            pin("B", "경기 수원시"),
            pin("C", ""),
        ];
        apply_regions(&mut pins, &places);
        assert!(pins.iter().all(|p| !p.region.as_deref().unwrap().is_empty()));
    }

    #[test]
    fn road_address_preferred_for_key() {
        let mut reference = place("A", "서울 중구 태평로1가 31");
        reference.road_address = "서울 중구 세종대로 110".into();
        let mut pins = vec![pin("A", "서울 중구 세종대로 110")];
        assert_eq!(apply_regions(&mut pins, &[reference]), 1);
    }

    #[test]
    fn key_collision_last_write_wins() {
        let mut first = place("A", "B");
        first.url = "http://first".into();
        let second = place("A", "B");
        // Both normalize to key "A|B"; the second record's (tokenless)
        // address drives the region.
        let mut pins = vec![pin("A", "B")];
        let matched = apply_regions(&mut pins, &[first, second]);
        assert_eq!(matched, 1);
        assert_eq!(pins[0].region.as_deref(), Some(UNKNOWN_REGION));
        assert!(pins[0].url.is_none());
    }

    #[test]
    fn url_copied_only_when_pin_lacks_one() {
        let mut with_url = place("A", "서울 중구");
        with_url.url = "http://place.map/1".into();
        let mut pins = vec![pin("A", "서울 중구")];
        apply_regions(&mut pins, &[with_url.clone()]);
        assert_eq!(pins[0].url.as_deref(), Some("http://place.map/1"));

        // A matching record with an empty url must not clobber it.
        with_url.url.clear();
        apply_regions(&mut pins, &[with_url]);
        assert_eq!(pins[0].url.as_deref(), Some("http://place.map/1"));
    }

    #[test]
    fn reapplication_is_stable() {
        let mut places = vec![place("서울도서관", "서울특별시 중구 세종대로 110")];
        places[0].url = "http://place.map/2".into();
        let mut pins = vec![
            pin("서울도서관", "서울특별시 중구 세종대로 110"),
            pin("이름없음", "부산광역시 해운대구"),
        ];
        apply_regions(&mut pins, &places);
        let snapshot = pins.clone();
        apply_regions(&mut pins, &places);
        assert_eq!(
            serde_json::to_string(&pins).unwrap(),
            serde_json::to_string(&snapshot).unwrap()
        );
    }

    #[test]
    fn school_join_strips_whitespace() {
        let schools = vec![SchoolInfo {
            name: "서울 대진고등학교".into(),
            coed_type: "남학교".into(),
            found_type: "사립".into(),
            neis_code: "B107010123".into(),
            ..Default::default()
        }];
        let mut pins = vec![pin("서울대진고등학교", "서울 노원구")];
        let matched = apply_school_info(&mut pins, &schools);
        assert_eq!(matched, 1);
        assert_eq!(pins[0].coed_type.as_deref(), Some("남학교"));
        assert_eq!(pins[0].found_type.as_deref(), Some("사립"));
        assert_eq!(pins[0].neis_code.as_deref(), Some("B107010123"));
    }

    #[test]
    fn school_miss_leaves_pin_untouched() {
        let schools = vec![SchoolInfo {
            name: "다른학교".into(),
            ..Default::default()
        }];
        let mut pins = vec![pin("서울대진고등학교", "서울 노원구")];
        assert_eq!(apply_school_info(&mut pins, &schools), 0);
        assert!(pins[0].coed_type.is_none());
        assert!(pins[0].neis_code.is_none());
    }
}
