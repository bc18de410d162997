//! Solar resource by province (Vietnam).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::SolarFinanceError;
use crate::SolarFinanceResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceSolarProfile {
    pub name: &'static str,
    /// Specific yield, kWh per kWp per year
    pub annual_yield_per_kwp: Decimal,
    pub sun_hours_per_day: Decimal,
}

const fn province(
    name: &'static str,
    annual_yield_per_kwp: Decimal,
    sun_hours_per_day: Decimal,
) -> ProvinceSolarProfile {
    ProvinceSolarProfile {
        name,
        annual_yield_per_kwp,
        sun_hours_per_day,
    }
}

pub static PROVINCES: [ProvinceSolarProfile; 63] = [
    province("An Giang", dec!(1408), dec!(3.86)),
    province("Bà Rịa - Vũng Tàu", dec!(1458), dec!(3.99)),
    province("Bạc Liêu", dec!(1342), dec!(3.68)),
    province("Bắc Giang", dec!(1048), dec!(2.87)),
    province("Bắc Kạn", dec!(998), dec!(2.73)),
    province("Bắc Ninh", dec!(1053), dec!(2.88)),
    province("Bến Tre", dec!(1386), dec!(3.80)),
    province("Bình Định", dec!(1385), dec!(3.79)),
    province("Bình Dương", dec!(1406), dec!(3.85)),
    province("Bình Phước", dec!(1431), dec!(3.92)),
    province("Bình Thuận", dec!(1530), dec!(4.19)),
    province("Cà Mau", dec!(1323), dec!(3.62)),
    province("Cao Bằng", dec!(1035), dec!(2.84)),
    province("Cần Thơ", dec!(1354), dec!(3.71)),
    province("Đà Nẵng", dec!(1347), dec!(3.69)),
    province("Đắk Lắk", dec!(1380), dec!(3.78)),
    province("Đắk Nông", dec!(1275), dec!(3.49)),
    province("Điện Biên", dec!(1204), dec!(3.30)),
    province("Đồng Nai", dec!(1403), dec!(3.84)),
    province("Đồng Tháp", dec!(1427), dec!(3.91)),
    province("Gia Lai", dec!(1420), dec!(3.89)),
    province("Hà Giang", dec!(967), dec!(2.65)),
    province("Hà Nam", dec!(1060), dec!(2.90)),
    province("Hà Nội", dec!(1031), dec!(2.82)),
    province("Hà Tĩnh", dec!(1093), dec!(2.99)),
    province("Hải Dương", dec!(1046), dec!(2.87)),
    province("Hải Phòng", dec!(1063), dec!(2.91)),
    province("Hậu Giang", dec!(1335), dec!(3.66)),
    province("Hòa Bình", dec!(1030), dec!(2.82)),
    province("Hưng Yên", dec!(1051), dec!(2.88)),
    province("Khánh Hòa", dec!(1409), dec!(3.86)),
    province("Kiên Giang", dec!(1358), dec!(3.72)),
    province("Kon Tum", dec!(1445), dec!(3.96)),
    province("Lai Châu", dec!(1135), dec!(3.11)),
    province("Lâm Đồng", dec!(1451), dec!(3.98)),
    province("Lạng Sơn", dec!(964), dec!(2.64)),
    province("Lào Cai", dec!(1019), dec!(2.79)),
    province("Long An", dec!(1423), dec!(3.90)),
    province("Nam Định", dec!(1079), dec!(2.96)),
    province("Nghệ An", dec!(1080), dec!(2.96)),
    province("Ninh Bình", dec!(1071), dec!(2.93)),
    province("Ninh Thuận", dec!(1536), dec!(4.21)),
    province("Phú Thọ", dec!(1028), dec!(2.82)),
    province("Phú Yên", dec!(1330), dec!(3.64)),
    province("Quảng Bình", dec!(1080), dec!(2.96)),
    province("Quảng Nam", dec!(1262), dec!(3.46)),
    province("Quảng Ngãi", dec!(1256), dec!(3.44)),
    province("Quảng Ninh", dec!(973), dec!(2.67)),
    province("Quảng Trị", dec!(1118), dec!(3.06)),
    province("Sóc Trăng", dec!(1340), dec!(3.67)),
    province("Sơn La", dec!(1229), dec!(3.37)),
    province("Tây Ninh", dec!(1459), dec!(4.00)),
    province("Thái Bình", dec!(1065), dec!(2.92)),
    province("Thái Nguyên", dec!(1014), dec!(2.78)),
    province("Thanh Hóa", dec!(1104), dec!(3.02)),
    province("Thừa Thiên Huế", dec!(1226), dec!(3.36)),
    province("Tiền Giang", dec!(1374), dec!(3.76)),
    province("TP Hồ Chí Minh", dec!(1388), dec!(3.80)),
    province("Trà Vinh", dec!(1385), dec!(3.79)),
    province("Tuyên Quang", dec!(981), dec!(2.69)),
    province("Vĩnh Long", dec!(1371), dec!(3.76)),
    province("Vĩnh Phúc", dec!(1034), dec!(2.83)),
    province("Yên Bái", dec!(960), dec!(2.63)),
];

/// Lowercased name with spaces replaced by dashes, as used in page URLs.
/// Lowercase Vietnamese letter with its tone and vowel marks removed.
fn fold_vietnamese(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

/// URL slug of a display name: `"Bà Rịa - Vũng Tàu"` becomes `"ba-ria-vung-tau"`.
pub fn slug(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(fold_vietnamese)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Look up a province by display name, case-insensitively, or by URL slug.
/// Diacritics are optional: `"ha-noi"`, `"ha noi"` and `"Hà Nội"` all match.
pub fn find_province(key: &str) -> SolarFinanceResult<&'static ProvinceSolarProfile> {
    let wanted = key.trim().to_lowercase();
    let wanted_slug = slug(key);
    PROVINCES
        .iter()
        .find(|p| {
            p.name.to_lowercase() == wanted || (!wanted_slug.is_empty() && slug(p.name) == wanted_slug)
        })
        .ok_or_else(|| SolarFinanceError::NotFound {
            kind: "province".into(),
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete_and_unique() {
        assert_eq!(PROVINCES.len(), 63);
        let mut names: Vec<&str> = PROVINCES.iter().map(|p| p.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 63);
        assert!(PROVINCES
            .iter()
            .all(|p| p.annual_yield_per_kwp > Decimal::ZERO && p.sun_hours_per_day > Decimal::ZERO));
    }

    #[test]
    fn test_find_ha_noi() {
        let p = find_province("Hà Nội").unwrap();
        assert_eq!(p.annual_yield_per_kwp, dec!(1031));
        assert_eq!(p.sun_hours_per_day, dec!(2.82));
    }

    #[test]
    fn test_find_is_case_insensitive_and_accepts_slug() {
        assert_eq!(find_province("tp hồ chí minh").unwrap().name, "TP Hồ Chí Minh");
        assert_eq!(find_province("thừa-thiên-huế").unwrap().name, "Thừa Thiên Huế");
    }

    #[test]
    fn test_find_accepts_ascii_slug() {
        assert_eq!(find_province("ha-noi").unwrap().name, "Hà Nội");
        assert_eq!(find_province("tp-ho-chi-minh").unwrap().name, "TP Hồ Chí Minh");
        assert_eq!(find_province("ba-ria-vung-tau").unwrap().name, "Bà Rịa - Vũng Tàu");
        assert_eq!(find_province("dak-lak").unwrap().name, "Đắk Lắk");
        assert!(find_province("  ").is_err());
    }

    #[test]
    fn test_slugs_are_ascii_and_unique() {
        let mut slugs: Vec<String> = PROVINCES.iter().map(|p| slug(p.name)).collect();
        assert!(slugs.iter().all(|s| s.is_ascii() && !s.is_empty()));
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), PROVINCES.len());
    }

    #[test]
    fn test_unknown_province() {
        let err = find_province("Atlantis").unwrap_err();
        assert!(matches!(err, SolarFinanceError::NotFound { .. }));
    }
}
