//! This module provides a client to connect to the timetable REST API

use std::error::Error;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::course::{Assessment, CourseId, CourseOccurrence};
use crate::period::{PeriodId, ProgramId, SchedulePeriod};
use crate::resource::Resource;
use crate::shared::{Program, Room, Subject, UserData};
use crate::traits::TimetableSource;


/// A timetable source that fetches its data from the backend
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(base_url: S) -> Result<Self, Box<dyn Error>> {
        let url = Url::parse(base_url.as_ref())?;

        Ok(Self{
            resource: Resource::new(url),
            http: reqwest::Client::new(),
        })
    }

    /// Create a client for the URL in [`crate::config::API_BASE_URL`]
    pub fn from_config() -> Result<Self, Box<dyn Error>> {
        Self::new(crate::config::api_base_url())
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Use a token that has been obtained earlier. Following requests will be authenticated
    pub fn set_token(&mut self, token: Option<String>) {
        self.resource.set_token(token);
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, Box<dyn Error>> {
        let url = self.resource.endpoint(path)?;
        log::trace!("{} {}", method, url);
        let mut builder = self.http.request(method, url);
        if let Some(token) = self.resource.token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder, descr: &str) -> Result<Response, Box<dyn Error>> {
        let response = match builder.send().await {
            Ok(r) => r,
            Err(err) => {
                log::error!("Error while {}: {}", descr, err);
                return Err(err.into());
            },
        };

        let status = response.status();
        if status.is_success() == false {
            let body = response.text().await.unwrap_or_default();
            log::error!("Error while {}: HTTP {} {}", descr, status, body);
            return Err(format!("Unexpected HTTP status code {:?} while {}", status, descr).into());
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &[&str], query: &[(&str, &str)], descr: &str) -> Result<T, Box<dyn Error>> {
        let builder = self.request(Method::GET, path)?.query(query);
        let response = self.send(builder, descr).await?;
        let parsed = response.json::<T>().await?;
        Ok(parsed)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &[&str], body: &B, descr: &str) -> Result<Response, Box<dyn Error>> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(builder, descr).await
    }

    /// Log in. On success, the returned token is used by every following request
    pub async fn login<S: ToString, T: ToString>(&mut self, email: S, password: T) -> Result<AuthResponse, Box<dyn Error>> {
        let credentials = LoginRequest{ email: email.to_string(), password: password.to_string() };
        let response = self.post_json(&["auth", "login"], &credentials, "logging in").await?;
        let auth: AuthResponse = response.json().await?;
        log::debug!("Logged in as user {}", auth.id);
        self.resource.set_token(Some(auth.token.clone()));
        Ok(auth)
    }

    /// Create an account. The form is validated before anything is sent
    pub async fn register(&self, form: &RegisterRequest) -> Result<(), Box<dyn Error>> {
        form.validate()?;
        self.post_json(&["auth", "register"], form, "registering").await?;
        log::info!("Registered {} as {:?}", form.email, form.role);
        Ok(())
    }

    /// The profile of the logged-in user, as known by the authentication service.
    /// Its shape depends on the user role
    pub async fn get_current_user(&self) -> Result<serde_json::Value, Box<dyn Error>> {
        self.get_json(&["auth", "me"], &[], "getting the current user").await
    }

    /// The profile of the logged-in user, as known by the users service.
    /// Its shape depends on the user role
    pub async fn get_user_profile(&self) -> Result<serde_json::Value, Box<dyn Error>> {
        self.get_json(&["users", "me"], &[], "getting the user profile").await
    }

    /// The program a user belongs to
    pub async fn get_user_program(&self, user_id: &str) -> Result<UserData, Box<dyn Error>> {
        self.get_json(&["users", "filiere", user_id], &[], "getting the user program").await
    }

    pub async fn get_programs(&self) -> Result<Vec<Program>, Box<dyn Error>> {
        self.get_json(&["filiere"], &[], "getting the programs").await
    }

    pub async fn get_rooms(&self) -> Result<Vec<Room>, Box<dyn Error>> {
        self.get_json(&["salle"], &[], "getting the rooms").await
    }

    pub async fn get_subjects(&self) -> Result<Vec<Subject>, Box<dyn Error>> {
        self.get_json(&["matiere"], &[], "getting the subjects").await
    }
}

#[async_trait]
impl TimetableSource for Client {
    async fn fetch_published_periods(&self, program_id: &ProgramId) -> Result<Vec<SchedulePeriod>, Box<dyn Error>> {
        let periods: Vec<SchedulePeriod> = self.get_json(&["edt"], &[("recherche", program_id.as_str())], "getting the timetables").await?;
        let n_received = periods.len();

        let published: Vec<SchedulePeriod> = periods.into_iter()
            .filter(|p| {
                if p.is_published() == false {
                    log::debug!("Ignoring timetable {} ({:?})", p.id(), p.publication_status());
                }
                p.is_published()
            })
            .collect();
        log::debug!("{} timetables received for program {}, {} are published", n_received, program_id, published.len());
        Ok(published)
    }

    async fn fetch_occurrences(&self, period_id: &PeriodId, program_id: &ProgramId) -> Result<Vec<CourseOccurrence>, Box<dyn Error>> {
        self.get_json(&["cours", period_id.as_str(), program_id.as_str()], &[], "getting the courses").await
    }

    async fn fetch_assessments(&self, period_id: &PeriodId, program_id: &ProgramId) -> Result<Vec<Assessment>, Box<dyn Error>> {
        self.get_json(&["devoirs", period_id.as_str(), program_id.as_str()], &[], "getting the assessments").await
    }

    async fn update_occurrence_status(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>> {
        let builder = self.request(Method::PATCH, &["cours", occurrence_id.as_str(), "statut"])?;
        self.send(builder, "updating a course status").await?;
        Ok(())
    }

    async fn update_teacher_availability(&mut self, occurrence_id: &CourseId) -> Result<(), Box<dyn Error>> {
        let builder = self.request(Method::PATCH, &["cours", occurrence_id.as_str(), "disponibilite"])?;
        self.send(builder, "updating a teacher availability").await?;
        Ok(())
    }
}
