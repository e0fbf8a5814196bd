//! Data categories: list ids, search plans, and per-category record filters.

use clap::ValueEnum;

use crate::model::RawPlace;

/// Top-level regions used for broad keyword sweeps. The trailing entry
/// catches highway rest-stop branches that carry no province in their name.
static BROAD_REGIONS: &[&str] = &[
    "서울특별시",
    "부산광역시",
    "대구광역시",
    "인천광역시",
    "광주광역시",
    "대전광역시",
    "울산광역시",
    "세종특별자치시",
    "경기도",
    "강원특별자치도",
    "충청북도",
    "충청남도",
    "전북특별자치도",
    "전라남도",
    "경상북도",
    "경상남도",
    "제주특별자치도",
    "고속도로 휴게소",
];

/// Finer-grained sweep for dense categories: provinces plus their major
/// cities, since a single province query caps out at 45 results.
static DETAILED_REGIONS: &[&str] = &[
    "서울특별시",
    "부산광역시",
    "대구광역시",
    "인천광역시",
    "광주광역시",
    "대전광역시",
    "울산광역시",
    "세종특별자치시",
    "경기도 수원시",
    "경기도 성남시",
    "경기도 용인시",
    "경기도 고양시",
    "경기도 부천시",
    "경기도 안산시",
    "경기도 안양시",
    "경기도 화성시",
    "경기도 평택시",
    "경기도 의정부시",
    "경기도 파주시",
    "경기도 김포시",
    "경기도",
    "강원특별자치도 춘천시",
    "강원특별자치도 원주시",
    "강원특별자치도 강릉시",
    "강원특별자치도",
    "충청북도 청주시",
    "충청북도 충주시",
    "충청북도",
    "충청남도 천안시",
    "충청남도 아산시",
    "충청남도",
    "전북특별자치도 전주시",
    "전북특별자치도 군산시",
    "전북특별자치도 익산시",
    "전북특별자치도",
    "전라남도 여수시",
    "전라남도 순천시",
    "전라남도 목포시",
    "전라남도",
    "경상북도 포항시",
    "경상북도 구미시",
    "경상북도 경주시",
    "경상북도",
    "경상남도 창원시",
    "경상남도 김해시",
    "경상남도 진주시",
    "경상남도 양산시",
    "경상남도",
    "제주특별자치도 제주시",
    "제주특별자치도 서귀포시",
];

/// Regions big enough to warrant extra query variants.
static LARGE_REGIONS: &[&str] = &[
    "경기도",
    "서울특별시",
    "경상북도",
    "경상남도",
    "전라남도",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    MiddleSchool,
    Mcdonalds,
    Subway,
    Library,
    Pool,
    HighSchool,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::MiddleSchool,
        Category::Mcdonalds,
        Category::Subway,
        Category::Library,
        Category::Pool,
        Category::HighSchool,
    ];

    /// Numeric id of the pin file this category writes (`data/<id>.json`).
    pub fn list_id(&self) -> u32 {
        match self {
            Category::MiddleSchool => 1,
            Category::Mcdonalds => 2,
            Category::Subway => 3,
            Category::Library => 4,
            Category::Pool => 5,
            Category::HighSchool => 9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::MiddleSchool => "중학교",
            Category::Mcdonalds => "맥도날드",
            Category::Subway => "써브웨이",
            Category::Library => "공공도서관",
            Category::Pool => "공공수영장",
            Category::HighSchool => "고등학교",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::MiddleSchool => &["중학교"],
            Category::HighSchool => &["고등학교"],
            Category::Mcdonalds => &["맥도날드"],
            // Kakao spells the sandwich chain 써브웨이.
            Category::Subway => &["써브웨이"],
            Category::Library => &[
                "도서관",
                "공공도서관",
                "시립도서관",
                "구립도서관",
                "군립도서관",
                "도립도서관",
                "국립도서관",
            ],
            Category::Pool => &[
                "수영장",
                "공공수영장",
                "시립수영장",
                "구민수영장",
                "국민체육센터 수영장",
            ],
        }
    }

    /// Regions to sweep. Store chains get the broad list (plus the highway
    /// rest-stop query); everything else needs city-level granularity.
    pub fn search_regions(&self) -> &'static [&'static str] {
        match self {
            Category::Mcdonalds => BROAD_REGIONS,
            _ => DETAILED_REGIONS,
        }
    }

    /// All keyword-search queries to run for one region.
    pub fn queries(&self, region: &str) -> Vec<String> {
        let mut queries = Vec::new();
        for keyword in self.keywords() {
            queries.push(format!("{region} {keyword}"));
            queries.push(format!("{keyword} {region}"));
        }
        if *self == Category::Mcdonalds && LARGE_REGIONS.contains(&region) {
            queries.push(format!("{region} 맥도날드 드라이브스루"));
            queries.push(format!("{region} 맥도날드 24시"));
        }
        queries
    }

    /// Category-specific relevance filter over raw search results.
    pub fn accepts(&self, place: &RawPlace, category_name: &str) -> bool {
        let name = &place.name;
        match self {
            Category::MiddleSchool => {
                name.contains("중학교")
                    && (category_name.contains("교육") || category_name.contains("학교"))
                    && (name.ends_with("학교") || name.contains("예정"))
            }
            Category::HighSchool => {
                name.contains("고등학교")
                    && (category_name.contains("교육") || category_name.contains("학교"))
                    && (name.ends_with("학교") || name.contains("예정"))
            }
            Category::Mcdonalds => name.contains("맥도날드") || name.contains("McDonald"),
            Category::Subway => {
                (name.contains("써브웨이")
                    || name.contains("서브웨이")
                    || name.to_uppercase().contains("SUBWAY"))
                    && !category_name.contains("지하철")
            }
            Category::Library => {
                name.contains("도서관")
                    && category_name.contains("도서관")
                    && !["학교도서관", "대학도서관", "어린이집", "유치원", "사립"]
                        .iter()
                        .any(|ex| name.contains(ex))
            }
            Category::Pool => {
                name.contains("수영장")
                    && category_name.contains("수영")
                    && !["호텔", "리조트", "키즈카페"]
                        .iter()
                        .any(|ex| name.contains(ex))
            }
        }
    }
}

/// School level for NEIS enrichment.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SchoolLevel {
    Middle,
    High,
}

impl SchoolLevel {
    /// NEIS SCHUL_KND_SC_NM parameter value.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchoolLevel::Middle => "중학교",
            SchoolLevel::High => "고등학교",
        }
    }

    /// The pin category this level's enrichment targets.
    pub fn category(&self) -> Category {
        match self {
            SchoolLevel::Middle => Category::MiddleSchool,
            SchoolLevel::High => Category::HighSchool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> RawPlace {
        RawPlace {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn library_filter_excludes_school_libraries() {
        let cat = Category::Library;
        assert!(cat.accepts(&named("구립은평뉴타운도서관"), "문화,예술 > 도서관"));
        assert!(!cat.accepts(&named("한국대학도서관"), "문화,예술 > 도서관"));
        assert!(!cat.accepts(&named("성심유치원도서관"), "문화,예술 > 도서관"));
        assert!(!cat.accepts(&named("북카페도서관"), "음식점 > 카페"));
    }

    #[test]
    fn subway_filter_rejects_metro_stations() {
        let cat = Category::Subway;
        assert!(cat.accepts(&named("써브웨이 강남점"), "음식점 > 샌드위치"));
        assert!(cat.accepts(&named("SUBWAY 홍대입구점"), "음식점 > 샌드위치"));
        assert!(!cat.accepts(&named("서브웨이입구"), "교통,수송 > 지하철,전철"));
    }

    #[test]
    fn school_filter_requires_school_suffix_or_planned() {
        let cat = Category::HighSchool;
        assert!(cat.accepts(&named("경기고등학교"), "교육,학문 > 학교 > 고등학교"));
        assert!(cat.accepts(&named("가칭 운정고등학교(개교예정)"), "교육,학문"));
        assert!(!cat.accepts(&named("고등학교 앞 문구점"), "쇼핑,유통 > 문구"));
        assert!(!cat.accepts(&named("경기고등학교"), "여행 > 관광명소"));
    }

    #[test]
    fn mcdonalds_filter_matches_either_spelling() {
        let cat = Category::Mcdonalds;
        assert!(cat.accepts(&named("맥도날드 서울시청점"), "음식점 > 패스트푸드"));
        assert!(cat.accepts(&named("McDonald's DT"), "음식점"));
        assert!(!cat.accepts(&named("버거킹 시청점"), "음식점 > 패스트푸드"));
    }

    #[test]
    fn every_category_has_a_distinct_list_id() {
        let mut ids: Vec<u32> = Category::ALL.iter().map(|c| c.list_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Category::ALL.len());
    }
}
