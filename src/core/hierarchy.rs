// File: src/core/hierarchy.rs
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One province record of the reference hierarchy dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvinceRecord {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "District", default)]
    pub districts: Vec<DistrictRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistrictRecord {
    #[serde(rename = "FullName")]
    pub full_name: String,
    #[serde(rename = "Ward", default)]
    pub wards: Vec<WardRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WardRecord {
    #[serde(rename = "FullName")]
    pub full_name: String,
}

/// Read-only oracle over the province → district → ward relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextualHierarchy {
    provinces: BTreeSet<String>,
    province_to_districts: BTreeMap<String, BTreeSet<String>>,
    district_to_wards: BTreeMap<String, BTreeSet<String>>,
    /// Skip-level relation, used when no district was resolved.
    province_to_wards: BTreeMap<String, BTreeSet<String>>,
    district_to_provinces: BTreeMap<String, BTreeSet<String>>,
    ward_to_parents: BTreeMap<String, BTreeSet<(String, String)>>,
}

impl ContextualHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[ProvinceRecord]) -> Self {
        let mut hierarchy = Self::new();
        for province in records {
            let province_name = province.full_name.trim();
            hierarchy.provinces.insert(province_name.to_string());
            for district in &province.districts {
                let district_name = district.full_name.trim();
                hierarchy.add_district(province_name, district_name);
                for ward in &district.wards {
                    hierarchy.add_ward(province_name, district_name, ward.full_name.trim());
                }
            }
        }
        hierarchy
    }

    pub fn add_district(&mut self, province: &str, district: &str) {
        self.provinces.insert(province.to_string());
        self.province_to_districts
            .entry(province.to_string())
            .or_default()
            .insert(district.to_string());
        self.district_to_provinces
            .entry(district.to_string())
            .or_default()
            .insert(province.to_string());
    }

    pub fn add_ward(&mut self, province: &str, district: &str, ward: &str) {
        self.add_district(province, district);
        self.district_to_wards
            .entry(district.to_string())
            .or_default()
            .insert(ward.to_string());
        self.province_to_wards
            .entry(province.to_string())
            .or_default()
            .insert(ward.to_string());
        self.ward_to_parents
            .entry(ward.to_string())
            .or_default()
            .insert((district.to_string(), province.to_string()));
    }

    pub fn is_district_in_province(&self, district: &str, province: &str) -> bool {
        contains(&self.province_to_districts, province, district)
    }

    pub fn is_ward_in_district(&self, ward: &str, district: &str) -> bool {
        contains(&self.district_to_wards, district, ward)
    }

    pub fn is_ward_in_province(&self, ward: &str, province: &str) -> bool {
        contains(&self.province_to_wards, province, ward)
    }

    /// True when every non-empty adjacent pair is a known parent/child pair.
    /// With the district missing, the ward is checked against the province
    /// directly. Empty arguments only relax their own constraints.
    ///
    /// A hierarchy with no data at all accepts every triple.
    pub fn is_valid(&self, ward: &str, district: &str, province: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        if !district.is_empty() && !province.is_empty() && !self.is_district_in_province(district, province) {
            return false;
        }
        if !ward.is_empty() && !district.is_empty() && !self.is_ward_in_district(ward, district) {
            return false;
        }
        if district.is_empty() && !ward.is_empty() && !province.is_empty() {
            return self.is_ward_in_province(ward, province);
        }
        true
    }

    pub fn districts_of(&self, province: &str) -> Vec<&str> {
        members(&self.province_to_districts, province)
    }

    pub fn wards_of(&self, district: &str) -> Vec<&str> {
        members(&self.district_to_wards, district)
    }

    /// Provinces containing a district of this name (several share names).
    pub fn provinces_of_district(&self, district: &str) -> Vec<&str> {
        members(&self.district_to_provinces, district)
    }

    /// Every (district, province) pair a ward of this name belongs to.
    pub fn parents_of_ward(&self, ward: &str) -> Vec<(&str, &str)> {
        self.ward_to_parents
            .get(ward)
            .map(|set| set.iter().map(|(d, p)| (d.as_str(), p.as_str())).collect())
            .unwrap_or_default()
    }

    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    pub fn district_count(&self) -> usize {
        self.district_to_provinces.len()
    }

    pub fn ward_count(&self) -> usize {
        self.ward_to_parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}

fn contains(map: &BTreeMap<String, BTreeSet<String>>, parent: &str, child: &str) -> bool {
    map.get(parent).is_some_and(|children| children.contains(child))
}

fn members<'a>(map: &'a BTreeMap<String, BTreeSet<String>>, key: &str) -> Vec<&'a str> {
    map.get(key)
        .map(|set| set.iter().map(String::as_str).collect())
        .unwrap_or_default()
}
