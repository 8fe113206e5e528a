//! This module provides a local cache for timetable data

use std::path::PathBuf;
use std::path::Path;
use std::error::Error;
use std::collections::HashMap;
use std::ffi::OsStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::course::{Assessment, CourseId, CourseOccurrence};
use crate::period::{PeriodId, ProgramId, SchedulePeriod};

const CACHE_FILE_EXTENSION: &str = "json";

/// The cached data of a single program
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedTimetable {
    program_id: ProgramId,
    periods: Vec<SchedulePeriod>,
    occurrences: Vec<CourseOccurrence>,
    #[serde(default)]
    assessments: Vec<Assessment>,
    last_refresh: Option<DateTime<Utc>>,
}

impl CachedTimetable {
    fn new(program_id: ProgramId) -> Self {
        Self {
            program_id,
            periods: Vec::new(),
            occurrences: Vec::new(),
            assessments: Vec::new(),
            last_refresh: None,
        }
    }

    pub fn program_id(&self) -> &ProgramId { &self.program_id }
    pub fn periods(&self) -> &[SchedulePeriod] { &self.periods }
    pub fn occurrences(&self) -> &[CourseOccurrence] { &self.occurrences }
    pub fn assessments(&self) -> &[Assessment] { &self.assessments }
    /// The last time this data was successfully fetched from a remote source (if ever)
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> { self.last_refresh }
}


/// A timetable store that keeps its data in a local folder, one file per program
#[derive(Debug, PartialEq)]
pub struct Cache {
    backing_folder: PathBuf,
    data: HashMap<ProgramId, CachedTimetable>,
}

impl Cache {
    /// Initialize a cache from the content of a valid backing folder if it exists.
    /// Returns an error otherwise.
    ///
    /// Files that cannot be read are skipped (and logged)
    pub fn from_folder(folder: &Path) -> Result<Self, Box<dyn Error>> {
        let entries = match std::fs::read_dir(folder) {
            Err(err) => {
                return Err(format!("Unable to open folder {:?}: {}", folder, err).into());
            },
            Ok(entries) => entries,
        };

        let mut data = HashMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension() != Some(OsStr::new(CACHE_FILE_EXTENSION)) {
                continue;
            }

            let file = match std::fs::File::open(&path) {
                Err(err) => {
                    log::warn!("Unable to open file {:?}: {}. Ignoring it", path, err);
                    continue;
                },
                Ok(f) => f,
            };
            let timetable: CachedTimetable = match serde_json::from_reader(file) {
                Err(err) => {
                    log::warn!("Invalid cache file {:?}: {}. Ignoring it", path, err);
                    continue;
                },
                Ok(t) => t,
            };
            log::debug!("Loaded {} timetables and {} courses for program {} from {:?}",
                timetable.periods.len(), timetable.occurrences.len(), timetable.program_id, path);
            data.insert(timetable.program_id.clone(), timetable);
        }

        Ok(Self{
            backing_folder: PathBuf::from(folder),
            data,
        })
    }

    /// Initialize a cache with the default contents
    pub fn new(folder: &Path) -> Self {
        Self{
            backing_folder: PathBuf::from(folder),
            data: HashMap::new(),
        }
    }

    pub fn backing_folder(&self) -> &Path {
        &self.backing_folder
    }

    fn file_for(&self, program_id: &ProgramId) -> PathBuf {
        let file_name = sanitize_filename::sanitize(program_id);
        self.backing_folder.join(format!("{}.{}", file_name, CACHE_FILE_EXTENSION))
    }

    /// Store the current Cache to its backing folder
    pub fn save_to_folder(&self) -> Result<(), Box<dyn Error>> {
        std::fs::create_dir_all(&self.backing_folder)?;

        for (program_id, timetable) in &self.data {
            let path = self.file_for(program_id);
            let file = std::fs::File::create(&path)
                .map_err(|err| format!("Unable to save file {:?}: {}", path, err))?;
            serde_json::to_writer(file, timetable)?;
        }
        Ok(())
    }

    /// The programs this cache has data for
    pub fn programs(&self) -> Vec<&ProgramId> {
        self.data.keys().collect()
    }

    pub fn timetable(&self, program_id: &ProgramId) -> Option<&CachedTimetable> {
        self.data.get(program_id)
    }

    fn timetable_mut(&mut self, program_id: &ProgramId) -> &mut CachedTimetable {
        self.data.entry(program_id.clone())
            .or_insert_with(|| CachedTimetable::new(program_id.clone()))
    }

    /// The cached timetables of a program (possibly none)
    pub fn periods(&self, program_id: &ProgramId) -> &[SchedulePeriod] {
        self.data.get(program_id).map(|t| t.periods()).unwrap_or(&[])
    }

    /// The cached courses of a program (possibly none)
    pub fn occurrences(&self, program_id: &ProgramId) -> &[CourseOccurrence] {
        self.data.get(program_id).map(|t| t.occurrences()).unwrap_or(&[])
    }

    /// The cached assessments of a program (possibly none)
    pub fn assessments(&self, program_id: &ProgramId) -> &[Assessment] {
        self.data.get(program_id).map(|t| t.assessments()).unwrap_or(&[])
    }

    /// Replace the timetables of a program.
    /// Courses and assessments of timetables that are not part of `periods` anymore are dropped
    pub fn set_periods(&mut self, program_id: &ProgramId, periods: Vec<SchedulePeriod>) {
        let timetable = self.timetable_mut(program_id);
        timetable.periods = periods;

        let known: Vec<PeriodId> = timetable.periods.iter().map(|p| p.id().clone()).collect();
        let n_courses = timetable.occurrences.len();
        let n_assessments = timetable.assessments.len();
        timetable.occurrences.retain(|occ| known.contains(occ.period_id()));
        timetable.assessments.retain(|a| known.contains(&a.period_id));

        let n_dropped = (n_courses - timetable.occurrences.len()) + (n_assessments - timetable.assessments.len());
        if n_dropped > 0 {
            log::debug!("Dropped {} cached items of withdrawn timetables of program {}", n_dropped, program_id);
        }
    }

    /// Replace the courses of a single timetable of a program. Courses of other timetables are kept
    pub fn set_occurrences(&mut self, program_id: &ProgramId, period_id: &PeriodId, occurrences: Vec<CourseOccurrence>) {
        let timetable = self.timetable_mut(program_id);
        timetable.occurrences.retain(|occ| occ.period_id() != period_id);
        timetable.occurrences.extend(occurrences);
    }

    /// Replace the assessments of a single timetable of a program. Assessments of other timetables are kept
    pub fn set_assessments(&mut self, program_id: &ProgramId, period_id: &PeriodId, assessments: Vec<Assessment>) {
        let timetable = self.timetable_mut(program_id);
        timetable.assessments.retain(|a| &a.period_id != period_id);
        timetable.assessments.extend(assessments);
    }

    pub fn occurrence(&self, program_id: &ProgramId, id: &CourseId) -> Option<&CourseOccurrence> {
        self.occurrences(program_id).iter().find(|occ| occ.id() == id)
    }

    pub fn occurrence_mut(&mut self, program_id: &ProgramId, id: &CourseId) -> Option<&mut CourseOccurrence> {
        self.data.get_mut(program_id)?
            .occurrences.iter_mut()
            .find(|occ| occ.id() == id)
    }

    /// Returns the last time this program was successfully refreshed from a remote source
    /// (or None in case it has never been refreshed)
    pub fn last_refresh(&self, program_id: &ProgramId) -> Option<DateTime<Utc>> {
        self.data.get(program_id).and_then(|t| t.last_refresh)
    }

    /// Update the last refresh timestamp to now, or to a custom time in case `timepoint` is `Some`
    pub fn update_last_refresh(&mut self, program_id: &ProgramId, timepoint: Option<DateTime<Utc>>) {
        self.timetable_mut(program_id).last_refresh = Some(timepoint.unwrap_or_else(Utc::now));
    }

    /// Compares two Caches to check they have the same current content
    ///
    /// This is not a complete equality test: the backing folders and the refresh dates may differ
    pub fn has_same_contents_than(&self, other: &Self) -> bool {
        if self.data.len() != other.data.len() {
            log::debug!("Count of programs mismatch: {} and {}", self.data.len(), other.data.len());
            return false;
        }

        for (program_id, timetable_l) in &self.data {
            let timetable_r = match other.data.get(program_id) {
                Some(t) => t,
                None => {
                    log::debug!("Program {} is missing", program_id);
                    return false;
                },
            };

            if timetable_l.periods != timetable_r.periods
                || timetable_l.occurrences != timetable_r.occurrences
                || timetable_l.assessments != timetable_r.assessments
            {
                log::debug!("Program {} has different contents", program_id);
                return false;
            }
        }
        true
    }
}
