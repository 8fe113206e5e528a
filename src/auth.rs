//! Registration, login and the in-memory session

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::period::ProgramId;

bitflags! {
    /// The roles a user account has
    pub struct Roles: u8 {
        const STUDENT = 1;
        const TEACHER = 2;
        const PARENT = 4;
        const ADMIN = 8;
    }
}

impl Roles {
    /// Build from the role names used by the backend (`ETUDIANT`, `ENSEIGNANT`, ...). Unknown names are ignored
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut roles = Self::empty();
        for name in names {
            // Spring-style backends sometimes prefix them
            let name = name.as_ref().trim_start_matches("ROLE_");
            match name {
                "ETUDIANT" => roles.insert(Self::STUDENT),
                "ENSEIGNANT" => roles.insert(Self::TEACHER),
                "PARENT" => roles.insert(Self::PARENT),
                "ADMIN" | "ADMINISTRATEUR" => roles.insert(Self::ADMIN),
                other => log::warn!("Unknown role {:?}. Ignoring it", other),
            }
        }
        roles
    }
}

/// The role picked at registration time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ETUDIANT")]
    Student,
    #[serde(rename = "ENSEIGNANT")]
    Teacher,
    #[serde(rename = "PARENT")]
    Parent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "HOMME")]
    Male,
    #[serde(rename = "FEMME")]
    Female,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentType {
    #[serde(rename = "PERE")]
    Father,
    #[serde(rename = "MERE")]
    Mother,
    #[serde(rename = "TUTEUR")]
    Guardian,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentTitle {
    #[serde(rename = "ETUDIANT_SIMPLE")]
    Regular,
    /// Class representative
    #[serde(rename = "ETUDIANT_DELEDUE")]
    Delegate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeacherType {
    #[serde(rename = "PERMANENT")]
    Permanent,
    #[serde(rename = "VACATAIRE")]
    Adjunct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminType {
    #[serde(rename = "COORDONATEUR")]
    Coordinator,
    #[serde(rename = "SCOLARITE")]
    RegistrarOffice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "INACTIF")]
    Inactive,
    #[serde(rename = "BLOQUE")]
    Blocked,
    #[serde(rename = "EN_ATTENTE")]
    Pending,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The registration form. Role-specific fields are optional
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "sexe")]
    pub sex: Sex,
    #[serde(rename = "telephone")]
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: Role,

    // Parent
    #[serde(rename = "typeParent", skip_serializing_if = "Option::is_none", default)]
    pub parent_type: Option<ParentType>,
    #[serde(rename = "lieuResidence", skip_serializing_if = "Option::is_none", default)]
    pub residence: Option<String>,

    // Student
    /// National student identifier
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ine: Option<String>,
    #[serde(rename = "titreEtudiant", skip_serializing_if = "Option::is_none", default)]
    pub student_title: Option<StudentTitle>,
    #[serde(rename = "parentId", skip_serializing_if = "Option::is_none", default)]
    pub parent_id: Option<String>,
    #[serde(rename = "filiereId", skip_serializing_if = "Option::is_none", default)]
    pub program_id: Option<ProgramId>,

    // Teacher
    #[serde(rename = "matricule", skip_serializing_if = "Option::is_none", default)]
    pub staff_number: Option<String>,
    #[serde(rename = "typeEnseignant", skip_serializing_if = "Option::is_none", default)]
    pub teacher_type: Option<TeacherType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub grade: Option<String>,
    #[serde(rename = "specialite", skip_serializing_if = "Option::is_none", default)]
    pub speciality: Option<String>,

    #[serde(rename = "typeAdmin", skip_serializing_if = "Option::is_none", default)]
    pub admin_type: Option<AdminType>,
}

const MIN_PASSWORD_LENGTH: usize = 6;

fn invalid(field: &'static str, reason: &str) -> ValidationError {
    ValidationError::InvalidField{ field, reason: reason.to_string() }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_ref().map(|v| v.trim().is_empty()).unwrap_or(true)
}

impl RegisterRequest {
    /// A form with the common fields only
    pub fn new<S: ToString>(last_name: S, first_name: S, sex: Sex, phone: S, email: S, password: S, role: Role) -> Self {
        Self {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            sex,
            phone: phone.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
            parent_type: None,
            residence: None,
            ine: None,
            student_title: None,
            parent_id: None,
            program_id: None,
            staff_number: None,
            teacher_type: None,
            grade: None,
            speciality: None,
            admin_type: None,
        }
    }

    /// Checks the form before it is sent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.last_name.trim().is_empty() {
            return Err(invalid("nom", "must not be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(invalid("prenom", "must not be empty"));
        }
        let email = self.email.trim();
        match email.split_once('@') {
            Some((user, domain)) if user.is_empty() == false && domain.contains('.') => {},
            _ => return Err(invalid("email", "not a valid e-mail address")),
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(invalid("password", &format!("must contain at least {} characters", MIN_PASSWORD_LENGTH)));
        }

        match self.role {
            Role::Student => {
                if is_blank(&self.program_id) {
                    return Err(invalid("filiereId", "a student must belong to a program"));
                }
            },
            Role::Teacher => {
                if is_blank(&self.staff_number) {
                    return Err(invalid("matricule", "a teacher must have a staff number"));
                }
            },
            Role::Parent => {
                if self.parent_type.is_none() {
                    return Err(invalid("typeParent", "a parent must tell their relationship"));
                }
            },
        }
        Ok(())
    }
}

/// What the backend replies to a successful login
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type", default)]
    pub token_type: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub id: String,
    pub email: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "statutCompte")]
    pub account_status: AccountStatus,
    #[serde(default)]
    pub roles: Vec<String>,
}


/// The authentication state of the application. It only lives in memory.
#[derive(Clone, Debug, Default)]
pub struct Session {
    user_id: Option<String>,
    token: Option<String>,
    refresh_token: Option<String>,
    roles: Option<Roles>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the session from a login reply. Accounts that are not active are refused
    pub fn sign_in(&mut self, response: &AuthResponse) -> Result<(), Box<dyn std::error::Error>> {
        if response.account_status != AccountStatus::Active {
            return Err(format!("Account {} is not active ({:?})", response.email, response.account_status).into());
        }

        self.user_id = Some(response.id.clone());
        self.token = Some(response.token.clone());
        self.refresh_token = Some(response.refresh_token.clone());
        self.roles = Some(Roles::from_names(&response.roles));
        log::info!("Signed in as {} ({:?})", response.email, self.roles());
        Ok(())
    }

    pub fn sign_out(&mut self) {
        *self = Self::default();
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }

    pub fn user_id(&self) -> Option<&str>        { self.user_id.as_deref() }
    pub fn token(&self) -> Option<&str>          { self.token.as_deref() }
    pub fn refresh_token(&self) -> Option<&str>  { self.refresh_token.as_deref() }
    pub fn roles(&self) -> Roles                 { self.roles.unwrap_or_else(Roles::empty) }
}
