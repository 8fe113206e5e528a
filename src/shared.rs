//! Reference data served by the backend (programs, rooms, subjects...)
//!
//! These are read-only for this crate.

use serde::{Deserialize, Serialize};

use crate::period::ProgramId;

/// Study level of a program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level { L1, L2, L3, M1, M2 }

/// An academic track ("filière")
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    #[serde(rename = "nomFiliere")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "niveau")]
    pub level: Level,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomAvailability {
    #[serde(rename = "LIBRE")]
    Free,
    #[serde(rename = "OCCUPEE")]
    Occupied,
}

/// A classroom ("salle")
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(rename = "numeroSalle")]
    pub number: String,
    #[serde(rename = "disponibiliteSalle")]
    pub availability: RoomAvailability,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester { S1, S2, S3, S4, S5, S6 }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectStatus {
    #[serde(rename = "NON_DEBUTE")]
    NotStarted,
    #[serde(rename = "EN_COURS")]
    InProgress,
    #[serde(rename = "TERMINE")]
    Finished,
}

/// A taught subject ("matière", or "module")
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(rename = "intitule")]
    pub title: String,
    /// Total number of hours
    #[serde(rename = "volumeHoraire")]
    pub hourly_volume: u32,
    #[serde(rename = "semestre")]
    pub semester: Semester,
    #[serde(rename = "statutMatiere")]
    pub status: SubjectStatus,
    #[serde(rename = "idEnseignant")]
    pub teacher_id: String,
    #[serde(rename = "idFiliere")]
    pub program_id: ProgramId,
}

/// The program a user belongs to
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    #[serde(rename = "filiereId")]
    pub program_id: ProgramId,
    #[serde(rename = "filiereName")]
    pub program_name: String,
    pub role: String,
}
