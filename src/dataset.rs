use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::naming::NamingPattern;
use crate::error::Error;

// ---------------------------------------------------------------------------
// Static per-dataset configuration
// ---------------------------------------------------------------------------

const LASPI_URL: &str = concat!(
    "http://ressources.ens2m.fr/openscience/DATA-PHM/IndustrialData/LASPI",
    "-Detection_and_Diagnostics_of_Bearing_Gear_and_Combined_Faults_of_Gearbox/LASPI",
    "-Detection_and_diagnostics_of_bearing_gear_and_combined_faults_of_gearbox.zip",
);

const AMPERE_URL: &str = concat!(
    "http://ressources.ens2m.fr/openscience/DATA-PHM/IndustrialData/AMPERE",
    "-Detection_and_Diagnostics_of_Rotor_And_Stator_Faults_In_Rotating_Machines/AMPERE",
    "-Detection_and_Diagnostics_of_Rotor_And_Stator_Faults_In_Rotating_Machines.zip",
);

const METALLICADOUR_URL: &str = concat!(
    "http://ressources.ens2m.fr/openscience/DATA-PHM/IndustrialData/METALLICADOUR",
    "-Detection_and_Diagnostics_of_Multi-axis_Robot_Faults/METALLICADOUR",
    "-Detection_and_Diagnostics_of_Multi-axis_Robot_Faults.zip",
);

/// Sub-path holding a drift subcase's tool measurements (`**/*.csv`).
pub const METALLICADOUR_TOOL_PATH: &str = "Robot_tool_data-5mm_648mm_mn_9000rpm";
/// Sub-path holding a drift subcase's axis positions (`**/*.xlsx`).
pub const METALLICADOUR_POSITION_PATH: &str = "Robot_axes_data";

const STANDARD_CONDITIONS: &[&str] = &["Speed_Frequency", "Load_Percent", "Speed"];
const TOOLWEAR_CONDITIONS: &[&str] = &["Cutting_Depth", "Feed_Rate", "Speed"];
const DRIFTS_CONDITIONS: &[&str] = &["Type"];

/// Everything that varies between datasets, kept in one record so the
/// URL, folder names, schema and naming pattern cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetConfig {
    /// String tag, also used to name the downloaded archive.
    pub id: &'static str,
    pub url: &'static str,
    /// Folder under the data directory the archive is extracted into.
    pub extract_folder: &'static str,
    /// Dataset root inside the extraction folder (may contain `/`).
    pub base_folder: &'static str,
    pub pattern: NamingPattern,
    /// Metadata columns parsed from folder names, between `Case` and `Filepath`.
    pub condition_columns: &'static [&'static str],
    /// Expected column count of every measurement file.
    pub num_columns: usize,
    /// Extension of the files recorded by the scanner.
    pub extension: &'static str,
}

// ---------------------------------------------------------------------------
// DatasetKind
// ---------------------------------------------------------------------------

/// The closed set of supported datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// LASPI: bearing, gear and combined gearbox faults.
    Laspi,
    /// AMPERE: rotor faults.
    AmpereRotor,
    /// AMPERE: stator faults.
    AmpereStator,
    /// METALLICADOUR: machining robot tool wear.
    MetallicadourToolwear,
    /// METALLICADOUR: robot positioning drifts.
    MetallicadourDrifts,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Laspi,
        DatasetKind::AmpereRotor,
        DatasetKind::AmpereStator,
        DatasetKind::MetallicadourToolwear,
        DatasetKind::MetallicadourDrifts,
    ];

    pub fn config(self) -> DatasetConfig {
        match self {
            DatasetKind::Laspi => DatasetConfig {
                id: "laspi",
                url: LASPI_URL,
                extract_folder: "laspi_extracted_data",
                base_folder: "LASPI-Detection_and_diagnostics_of_bearing_gear_and_combined_faults_of_gearbox",
                pattern: NamingPattern::Standard,
                condition_columns: STANDARD_CONDITIONS,
                num_columns: 7,
                extension: "csv",
            },
            DatasetKind::AmpereRotor => DatasetConfig {
                id: "ampere_rotor",
                url: AMPERE_URL,
                extract_folder: "ampere_extracted_data",
                base_folder: "Detection_and_diagnostics_of_rotor_faults",
                pattern: NamingPattern::Standard,
                condition_columns: STANDARD_CONDITIONS,
                num_columns: 11,
                extension: "csv",
            },
            DatasetKind::AmpereStator => DatasetConfig {
                id: "ampere_stator",
                url: AMPERE_URL,
                extract_folder: "ampere_extracted_data",
                base_folder: "Detection_and_diagnostics_of_stator_faults",
                pattern: NamingPattern::Standard,
                condition_columns: STANDARD_CONDITIONS,
                num_columns: 11,
                extension: "csv",
            },
            DatasetKind::MetallicadourToolwear => DatasetConfig {
                id: "metallicadour_toolwear",
                url: METALLICADOUR_URL,
                extract_folder: "metallicadour_extracted_data",
                base_folder: concat!(
                    "METALLICADOUR-Detection_and_Diagnostics_of_Multi-axis_Robot_Faults",
                    "/METALLICADOUR-Detection_and_diagnostics_of_multi-axis_machining_robot_tool_wear",
                ),
                pattern: NamingPattern::ToolWear,
                condition_columns: TOOLWEAR_CONDITIONS,
                num_columns: 12,
                extension: "csv",
            },
            DatasetKind::MetallicadourDrifts => DatasetConfig {
                id: "metallicadour_drifts",
                url: METALLICADOUR_URL,
                extract_folder: "metallicadour_extracted_data",
                base_folder: concat!(
                    "METALLICADOUR-Detection_and_Diagnostics_of_Multi-axis_Robot_Faults",
                    "/METALLICADOUR-Detection_and_diagnostics_of_multi-axis_robot_positioning_drifts",
                ),
                pattern: NamingPattern::Drifts,
                condition_columns: DRIFTS_CONDITIONS,
                num_columns: 12,
                extension: "csv",
            },
        }
    }

    pub fn id(self) -> &'static str {
        self.config().id
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DatasetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| {
                let accepted: Vec<&str> = DatasetKind::ALL.iter().map(|k| k.id()).collect();
                Error::UnsupportedDataset(s.to_string(), accepted.join(", "))
            })
    }
}
