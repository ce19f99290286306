//! Weather condition codes reported by the TMD forecast API
//!
//! Descriptions are stored bilingually (Thai first, English in parentheses),
//! the same text the read API hands back to the dashboard.

/// Description stored for codes the catalog does not know
pub const UNKNOWN_CONDITION: &str = "ไม่ทราบ (Unknown)";

const CONDITIONS: [(i64, &str); 12] = [
    (1, "ท้องฟ้าแจ่มใส (Clear)"),
    (2, "มีเมฆบางส่วน (Partly cloudy)"),
    (3, "เมฆเป็นส่วนมาก (Cloudy)"),
    (4, "มีเมฆมาก (Overcast)"),
    (5, "ฝนตกเล็กน้อย (Light rain)"),
    (6, "ฝนปานกลาง (Moderate rain)"),
    (7, "ฝนตกหนัก (Heavy rain)"),
    (8, "ฝนฟ้าคะนอง (Thunderstorm)"),
    (9, "อากาศหนาวจัด (Very cold)"),
    (10, "อากาศหนาว (Cold)"),
    (11, "อากาศเย็น (Cool)"),
    (12, "อากาศร้อนจัด (Very hot)"),
];

/// Immutable code -> description table
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionCatalog;

impl ConditionCatalog {
    /// Resolve a code. Unknown codes map to [`UNKNOWN_CONDITION`].
    pub fn describe(&self, code: i64) -> &'static str {
        CONDITIONS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, description)| *description)
            .unwrap_or(UNKNOWN_CONDITION)
    }

    /// Resolve an optional code; a payload without `cond` is unknown too
    pub fn resolve(&self, code: Option<i64>) -> &'static str {
        code.map(|c| self.describe(c)).unwrap_or(UNKNOWN_CONDITION)
    }

    pub fn codes(&self) -> impl Iterator<Item = i64> {
        CONDITIONS.iter().map(|(c, _)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes() {
        let catalog = ConditionCatalog;
        assert_eq!(catalog.describe(1), "ท้องฟ้าแจ่มใส (Clear)");
        assert_eq!(catalog.describe(8), "ฝนฟ้าคะนอง (Thunderstorm)");
        assert_eq!(catalog.describe(12), "อากาศร้อนจัด (Very hot)");
        assert_eq!(catalog.codes().count(), 12);
    }

    #[test]
    fn test_missing_code_is_unknown() {
        assert_eq!(ConditionCatalog.resolve(None), UNKNOWN_CONDITION);
        assert_eq!(ConditionCatalog.resolve(Some(5)), "ฝนตกเล็กน้อย (Light rain)");
    }

    proptest! {
        #[test]
        fn test_codes_outside_catalog_resolve_to_sentinel(
            code in any::<i64>().prop_filter("outside 1..=12", |c| !(1..=12).contains(c))
        ) {
            prop_assert_eq!(ConditionCatalog.describe(code), UNKNOWN_CONDITION);
        }
    }
}
