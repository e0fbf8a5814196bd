//! Region extraction from free-text Korean addresses.
//!
//! Maps an address string to one of the 17 top-level administrative
//! divisions. Pure lookup against a fixed vocabulary, no I/O.

/// Sentinel returned when no region token is recognized.
pub const UNKNOWN_REGION: &str = "기타";

/// Address token → canonical region label, in priority order.
///
/// Longer tokens come before the shorter tokens they contain
/// (강원특별자치도 before 강원도 before 강원), and legacy names map to the
/// current official label (전라북도 → 전북특별자치도).
static REGION_TOKENS: &[(&str, &str)] = &[
    ("서울특별시", "서울특별시"),
    ("서울", "서울특별시"),
    ("부산광역시", "부산광역시"),
    ("부산", "부산광역시"),
    ("대구광역시", "대구광역시"),
    ("대구", "대구광역시"),
    ("인천광역시", "인천광역시"),
    ("인천", "인천광역시"),
    ("광주광역시", "광주광역시"),
    ("광주", "광주광역시"),
    ("대전광역시", "대전광역시"),
    ("대전", "대전광역시"),
    ("울산광역시", "울산광역시"),
    ("울산", "울산광역시"),
    ("세종특별자치시", "세종특별자치시"),
    ("세종", "세종특별자치시"),
    ("경기도", "경기도"),
    ("경기", "경기도"),
    ("강원특별자치도", "강원특별자치도"),
    ("강원도", "강원특별자치도"),
    ("강원", "강원특별자치도"),
    ("충청북도", "충청북도"),
    ("충북", "충청북도"),
    ("충청남도", "충청남도"),
    ("충남", "충청남도"),
    ("전북특별자치도", "전북특별자치도"),
    ("전라북도", "전북특별자치도"),
    ("전북", "전북특별자치도"),
    ("전라남도", "전라남도"),
    ("전남", "전라남도"),
    ("경상북도", "경상북도"),
    ("경북", "경상북도"),
    ("경상남도", "경상남도"),
    ("경남", "경상남도"),
    ("제주특별자치도", "제주특별자치도"),
    ("제주도", "제주특별자치도"),
    ("제주", "제주특별자치도"),
];

/// Extract the canonical top-level region label from an address.
///
/// Prefix matches win over substring matches so that e.g. "경기 광주시 …"
/// resolves to 경기도, not 광주광역시. Returns [`UNKNOWN_REGION`] when the
/// address contains no known token.
pub fn extract_region(address: &str) -> &'static str {
    let address = address.trim();
    if address.is_empty() {
        return UNKNOWN_REGION;
    }

    for (token, canonical) in REGION_TOKENS {
        if address.starts_with(token) {
            return canonical;
        }
    }
    // Substring pass only over long-form names: short forms like 세종 or
    // 광주 also occur inside street and district names (세종대로, 광주시).
    for (token, canonical) in REGION_TOKENS {
        if token.chars().count() >= 3 && address.contains(token) {
            return canonical;
        }
    }
    UNKNOWN_REGION
}
