//! Static region tables.
//!
//! This is the single source of truth for the region hierarchy; other modules
//! build their groups from these tables rather than hardcoding codes.

use crate::domain::Group;

/// Departments making up a metropolitan region.
pub struct RegionDepartments {
    /// Short region name used as the group key.
    pub region: &'static str,
    /// Two-letter department codes.
    pub departments: &'static [&'static str],
}

/// Region name and the maille code of its region-level rows.
pub struct RegionCode {
    pub region: &'static str,
    pub code: &'static str,
}

/// Metropolitan regions and their departments.
///
/// `ara` lists `69` twice, as the table was originally published. Roll-ups
/// de-duplicate constituents, so the second entry has no effect.
pub static REGION_DEPARTMENTS: &[RegionDepartments] = &[
    RegionDepartments {
        region: "ara",
        departments: &["01", "03", "07", "15", "26", "38", "42", "43", "63", "69", "69", "73", "74"],
    },
    RegionDepartments {
        region: "bfc",
        departments: &["21", "25", "39", "58", "70", "71", "89", "90"],
    },
    RegionDepartments {
        region: "bretagne",
        departments: &["22", "29", "35", "56"],
    },
    RegionDepartments {
        region: "cvl",
        departments: &["18", "28", "36", "37", "41", "45"],
    },
    RegionDepartments {
        region: "corse",
        departments: &["2A", "2B"],
    },
    RegionDepartments {
        region: "hdf",
        departments: &["02", "59", "60", "62", "80"],
    },
    RegionDepartments {
        region: "grand-est",
        departments: &["08", "10", "51", "52", "54", "55", "57", "67", "68", "88"],
    },
    RegionDepartments {
        region: "ile-de-france",
        departments: &["75", "77", "78", "91", "92", "93", "94", "95"],
    },
    RegionDepartments {
        region: "normandie",
        departments: &["14", "27", "50", "61", "76"],
    },
    RegionDepartments {
        region: "na",
        departments: &["16", "17", "19", "23", "24", "33", "40", "47", "64", "79", "86", "87"],
    },
    RegionDepartments {
        region: "occitanie",
        departments: &["09", "11", "12", "30", "31", "32", "34", "46", "48", "65", "66", "81", "82"],
    },
    RegionDepartments {
        region: "pdl",
        departments: &["44", "49", "53", "72", "85"],
    },
    RegionDepartments {
        region: "paca",
        departments: &["04", "05", "06", "13", "83", "84"],
    },
];

/// Regions (metropolitan and overseas) and their region-level maille codes.
pub static REGION_CODES: &[RegionCode] = &[
    RegionCode { region: "Auvergne-Rhone-Alpes", code: "REG-84" },
    RegionCode { region: "Bourgogne-Franche-Comte", code: "REG-27" },
    RegionCode { region: "Bretagne", code: "REG-53" },
    RegionCode { region: "Centre-Val de Loire", code: "REG-24" },
    RegionCode { region: "Corse", code: "REG-94" },
    RegionCode { region: "Grand Est", code: "REG-44" },
    RegionCode { region: "Hauts-de-France", code: "REG-32" },
    RegionCode { region: "Normandie", code: "REG-28" },
    RegionCode { region: "Nouvelle-Aquitaine", code: "REG-75" },
    RegionCode { region: "Occitanie", code: "REG-76" },
    RegionCode { region: "Pays de la Loire", code: "REG-52" },
    RegionCode { region: "Provence-Alpes-Cote d'Azur", code: "REG-93" },
    RegionCode { region: "Ile-de-France", code: "REG-11" },
    RegionCode { region: "Guadeloupe", code: "REG-01" },
    RegionCode { region: "Guyane", code: "REG-03" },
    RegionCode { region: "La Reunion", code: "REG-04" },
    RegionCode { region: "Martinique", code: "REG-02" },
    RegionCode { region: "Mayotte", code: "REG-06" },
];

/// Name of the national group.
pub const NATIONAL: &str = "France";

/// Region groups summed from their departments.
pub fn department_regions() -> Vec<Group> {
    REGION_DEPARTMENTS
        .iter()
        .map(|r| Group::new(r.region, r.departments.iter().copied()))
        .collect()
}

/// Region groups read directly from each region's own rows.
pub fn code_regions() -> Vec<Group> {
    REGION_CODES
        .iter()
        .map(|r| Group::new(r.region, [r.code]))
        .collect()
}

/// Look up a department's region in [`REGION_DEPARTMENTS`].
pub fn region_of_department(code: &str) -> Option<&'static str> {
    REGION_DEPARTMENTS
        .iter()
        .find(|r| r.departments.contains(&code))
        .map(|r| r.region)
}
