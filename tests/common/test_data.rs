//! Test archive generation utilities.
//!
//! Builds a temporary directory holding a small archive of empty output
//! files and a cases directory whose `meta.yaml` points at that archive.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Host name used by every fixture `meta.yaml`
pub const HOST: &str = "testhost";

/// Name of the case written by [`demo_fixture`]
pub const CASE: &str = "demo";

/// A temporary archive plus cases directory
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(dir.path().join("archive")).unwrap();
        fs::create_dir_all(dir.path().join("cases")).unwrap();
        Self { dir }
    }

    pub fn archive(&self) -> PathBuf {
        self.dir.path().join("archive")
    }

    pub fn cases(&self) -> PathBuf {
        self.dir.path().join("cases")
    }

    /// Path of an archive file as a string
    pub fn archive_path(&self, relative: &str) -> String {
        self.archive().join(relative).to_string_lossy().into_owned()
    }

    /// Create an empty file below the archive
    pub fn touch(&self, relative: &str) -> PathBuf {
        let path = self.archive().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"").unwrap();
        path
    }

    /// Write a case's `meta.yaml`; `{archive}` is replaced by the archive path
    pub fn write_meta(&self, case: &str, yaml: &str) {
        let dir = self.cases().join(case);
        fs::create_dir_all(&dir).unwrap();
        let yaml = yaml.replace("{archive}", &self.archive().to_string_lossy());
        fs::write(dir.join("meta.yaml"), yaml).unwrap();
    }

    pub fn data_json(&self, case: &str) -> PathBuf {
        self.cases().join(case).join("data.json")
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.archive().join(relative)).unwrap();
    }
}

const DEMO_META: &str = r#"
harmonie:
  file_templates: ["ICMSHHARM+%LLLL", "GRIBPF+%LLLL%LM.grib2"]
  domain:
    name: DEMO_500x500
  testhost:
    path_template: "{archive}/harmonie/%Y/%m/%d/%H/"
ens:
  file_templates: ["ICMSH+%LLL"]
  testhost:
    path_template: ["{archive}/ens/%Y%m%d%H/*/"]
missing:
  file_templates: ["ICMSHHARM+%LLLL"]
  testhost:
    path_template: "{archive}/nowhere/%Y/%m/%d/%H/"
elsewhere:
  file_templates: ["ICMSHHARM+%LLLL"]
  otherhost:
    path_template: "/other/%Y/"
"#;

/// Files of the demo archive, relative to the archive root
pub const DEMO_FILES: &[&str] = &[
    "harmonie/2024/03/01/00/ICMSHHARM+0000",
    "harmonie/2024/03/01/00/ICMSHHARM+0001",
    "harmonie/2024/03/01/00/ICMSHHARM+0002",
    "harmonie/2024/03/01/00/GRIBPF+000000.grib2",
    "harmonie/2024/03/01/00/GRIBPF+000030.grib2",
    "harmonie/2024/03/01/00/GRIBPF+000100.grib2",
    "harmonie/2024/03/01/12/ICMSHHARM+0000",
    "harmonie/2024/03/01/12/GRIBPF+000000.grib2",
    "harmonie/2024/03/01/12/README",
    "ens/2024030100/mbr000/ICMSH+000",
    "ens/2024030100/mbr001/ICMSH+000",
    "ens/2024030100/mbr001/ICMSH+003",
];

/// One case with a deterministic run, an ensemble, an experiment without
/// data and an experiment for another host
pub fn demo_fixture() -> Fixture {
    let fixture = Fixture::new();
    for file in DEMO_FILES {
        fixture.touch(file);
    }
    fixture.write_meta(CASE, DEMO_META);
    fixture
}
