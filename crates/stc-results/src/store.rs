//! Run storage.
//!
//! Each run lives in `<root>/<run_id>/`: `manifest.json` plus
//! `timeseries.jsonl`, one sampled state per line in sample order.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::{RunManifest, TimeseriesRecord};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const TIMESERIES_FILE: &str = "timeseries.jsonl";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store next to a scenario file, under `.stc/runs`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        match project_path.parent() {
            Some(dir) => Self::new(dir.join(".stc").join("runs")),
            None => Err(ResultsError::InvalidPath {
                message: format!("{} has no parent directory", project_path.display()),
            }),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Run ids name a single directory below the root.
    fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let plain = !run_id.is_empty()
            && run_id != "."
            && run_id != ".."
            && !run_id.contains(['/', '\\']);
        if !plain {
            return Err(ResultsError::InvalidPath {
                message: format!("run id {run_id:?} is not a plain directory name"),
            });
        }
        Ok(self.root_dir.join(run_id))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id)
            .map(|dir| dir.join(MANIFEST_FILE).is_file())
            .unwrap_or(false)
    }

    /// The manifest is written last; a run with a manifest has its complete
    /// timeseries.
    pub fn save_run(
        &self,
        manifest: &RunManifest,
        records: &[TimeseriesRecord],
    ) -> ResultsResult<()> {
        let dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&dir)?;

        let mut out = BufWriter::new(File::create(dir.join(TIMESERIES_FILE))?);
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec_pretty(manifest)?,
        )?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let text = self.read_run_file(run_id, MANIFEST_FILE)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimeseriesRecord>> {
        let text = self.read_run_file(run_id, TIMESERIES_FILE)?;
        let records = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Manifest and trajectory of a run, checked against each other.
    pub fn load_run(&self, run_id: &str) -> ResultsResult<(RunManifest, Vec<TimeseriesRecord>)> {
        let manifest = self.load_manifest(run_id)?;
        let records = self.load_timeseries(run_id)?;
        if records.len() != manifest.samples {
            return Err(ResultsError::InconsistentRun {
                run_id: run_id.to_string(),
                expected: manifest.samples,
                found: records.len(),
            });
        }
        Ok((manifest, records))
    }

    /// Manifests of every stored run of `scenario_id`, in no particular
    /// order. Directories without a readable manifest are skipped.
    pub fn list_runs(&self, scenario_id: &str) -> ResultsResult<Vec<RunManifest>> {
        let entries = match fs::read_dir(&self.root_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut runs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let Some(run_id) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            match self.load_manifest(&run_id) {
                Ok(manifest) if manifest.scenario_id == scenario_id => runs.push(manifest),
                _ => {}
            }
        }
        Ok(runs)
    }

    /// Remove a run. Absent runs are not an error.
    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        match fs::remove_dir_all(self.run_dir(run_id)?) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn read_run_file(&self, run_id: &str, file: &str) -> ResultsResult<String> {
        match fs::read_to_string(self.run_dir(run_id)?.join(file)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
