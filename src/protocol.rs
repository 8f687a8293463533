//! Named protocol tables and where to find them on disk.

use crate::program::{ProgramTable, TableError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory searched for protocol tables when none is configured.
pub const DEFAULT_TABLE_DIR: &str = "tables";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Gmlan,
    Class2,
    Others,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Gmlan, Protocol::Class2, Protocol::Others];

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Gmlan => "gmlan",
            Protocol::Class2 => "class2",
            Protocol::Others => "others",
        }
    }

    /// Candidate files for this protocol in `dir`, in lookup order.
    pub fn candidates(self, dir: &Path) -> [PathBuf; 2] {
        [
            dir.join(format!("{}.bin", self.name())),
            dir.join(format!("{}.hex", self.name())),
        ]
    }

    /// First existing table file for this protocol in `dir`.
    pub fn table_path(self, dir: &Path) -> Option<PathBuf> {
        self.candidates(dir).into_iter().find(|path| path.is_file())
    }

    pub fn load_table(self, dir: &Path) -> Result<ProgramTable, TableError> {
        let path = self.table_path(dir).ok_or_else(|| TableError::NotFound {
            protocol: self.name().to_string(),
            dir: dir.to_path_buf(),
        })?;
        ProgramTable::load(path)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| "Protocol should be one of: gmlan, class2, others.".to_string())
    }
}
