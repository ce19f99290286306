//! Registry of Thai provinces served by the harvester and the read API
//!
//! The order is fixed: harvest cycles walk it front to back, so logs and
//! reports are stable between runs.

use std::sync::Arc;

/// Capital, used when a read request does not name a location
pub const DEFAULT_LOCATION: &str = "กรุงเทพมหานคร";

/// All 77 provinces, in harvest order
pub const THAI_PROVINCES: [&str; 77] = [
    "กรุงเทพมหานคร", "กระบี่", "กาญจนบุรี", "กาฬสินธุ์", "กำแพงเพชร",
    "ขอนแก่น", "จันทบุรี", "ฉะเชิงเทรา", "ชลบุรี", "ชัยนาท",
    "ชัยภูมิ", "ชุมพร", "เชียงราย", "เชียงใหม่", "ตรัง",
    "ตราด", "ตาก", "นครนายก", "นครปฐม", "นครพนม",
    "นครราชสีมา", "นครศรีธรรมราช", "นครสวรรค์", "นนทบุรี", "นราธิวาส",
    "น่าน", "บึงกาฬ", "บุรีรัมย์", "ปทุมธานี", "ประจวบคีรีขันธ์",
    "ปราจีนบุรี", "ปัตตานี", "พระนครศรีอยุธยา", "พะเยา", "พังงา",
    "พัทลุง", "พิจิตร", "พิษณุโลก", "เพชรบุรี", "เพชรบูรณ์",
    "แพร่", "ภูเก็ต", "มหาสารคาม", "มุกดาหาร", "แม่ฮ่องสอน",
    "ยโสธร", "ยะลา", "ร้อยเอ็ด", "ระนอง", "ระยอง",
    "ราชบุรี", "ลพบุรี", "ลำปาง", "ลำพูน", "เลย",
    "ศรีสะเกษ", "สกลนคร", "สงขลา", "สตูล", "สมุทรปราการ",
    "สมุทรสงคราม", "สมุทรสาคร", "สระแก้ว", "สระบุรี", "สิงห์บุรี",
    "สุโขทัย", "สุพรรณบุรี", "สุราษฎร์ธานี", "สุรินทร์", "หนองคาย",
    "หนองบัวลำภู", "อ่างทอง", "อำนาจเจริญ", "อุดรธานี", "อุตรดิตถ์",
    "อุทัยธานี", "อุบลราชธานี",
];

/// Check whether a name is one of the known provinces
pub fn is_known_province(name: &str) -> bool {
    THAI_PROVINCES.contains(&name)
}

/// Ordered, read-only set of locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRegistry {
    names: Arc<[String]>,
}

impl LocationRegistry {
    /// Registry covering every Thai province
    pub fn thailand() -> Self {
        Self::from_names(THAI_PROVINCES)
    }

    /// Build a registry from an explicit list, keeping its order.
    /// Empty names and repeated names are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let trimmed = name.trim();
            if trimmed.is_empty() || unique.iter().any(|n| n == trimmed) {
                continue;
            }
            unique.push(trimmed.to_string());
        }
        Self {
            names: unique.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::thailand()
    }
}
