use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::placement::applications::domain::{
    Actor, Application, ApplicationId, ApplicationStatus, CompanyId, CompanyRecord,
    NewApplication, Role, StudentId, StudentRecord,
};
use crate::workflows::placement::applications::store::{
    ApplicationStore, CompanyDirectory, StoreError, StudentDirectory,
};
use crate::workflows::placement::applications::ApplicationService;

pub(super) fn student_actor(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        role: Role::Student,
    }
}

pub(super) fn officer_actor() -> Actor {
    Actor {
        id: "officer-1".to_string(),
        role: Role::PlacementOfficer,
    }
}

pub(super) fn applied_on() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 10, 9, 30, 0)
        .single()
        .expect("valid date")
}

pub(super) fn student(id: &str, name: &str, gpa: f64) -> StudentRecord {
    StudentRecord {
        id: StudentId(id.to_string()),
        name: name.to_string(),
        email: format!("{id}@campus.edu"),
        register_number: Some(format!("RA{id}")),
        department: Some("CSE".to_string()),
        gpa,
        is_placed: false,
    }
}

pub(super) fn company(id: &str, name: &str, min_gpa: Option<f64>) -> CompanyRecord {
    CompanyRecord {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        location: "Bengaluru".to_string(),
        package_lpa: Some(14.5),
        min_gpa,
        deadline: Utc
            .with_ymd_and_hms(2030, 6, 30, 23, 59, 59)
            .single()
            .expect("valid date"),
    }
}

pub(super) fn seeded_students() -> Vec<StudentRecord> {
    vec![
        student("s-arjun", "Arjun Nair", 8.2),
        student("s-meera", "Meera Iyer", 9.1),
        student("s-ravi", "Ravi Kumar", 6.1),
    ]
}

pub(super) fn seeded_companies() -> Vec<CompanyRecord> {
    vec![
        company("c-helix", "Helix Systems", Some(7.0)),
        company("c-zenith", "Zenith Labs", Some(7.5)),
        company("c-orbit", "Orbit Analytics", Some(9.0)),
    ]
}

pub(super) fn new_application(company: &str) -> NewApplication {
    NewApplication {
        company_id: CompanyId(company.to_string()),
        resume_url: None,
        cover_letter: None,
    }
}

pub(super) fn application(
    id: &str,
    student_id: &str,
    company_id: &str,
    status: ApplicationStatus,
) -> Application {
    Application {
        id: ApplicationId(id.to_string()),
        student_id: StudentId(student_id.to_string()),
        company_id: CompanyId(company_id.to_string()),
        status,
        applied_date: applied_on(),
        resume_url: None,
        cover_letter: None,
        remarks: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationStore for MemoryStore {
    fn create(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let duplicate = guard.values().any(|existing| {
            existing.student_id == application.student_id
                && existing.company_id == application.company_id
        });
        if duplicate {
            return Err(StoreError::Duplicate);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_student_company(
        &self,
        student_id: &StudentId,
        company_id: &CompanyId,
    ) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .find(|a| &a.student_id == student_id && &a.company_id == company_id)
            .cloned())
    }

    fn list_all(&self) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn list_by_student(&self, student_id: &StudentId) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|a| &a.student_id == student_id)
            .cloned()
            .collect())
    }

    fn update(&self, application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if !guard.contains_key(&application.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
        remarks: Option<String>,
    ) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        record.status = status;
        if remarks.is_some() {
            record.remarks = remarks;
        }
        Ok(record.clone())
    }

    fn reject_open_siblings(
        &self,
        student_id: &StudentId,
        exclude: &ApplicationId,
    ) -> Result<usize, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let mut rejected = 0;
        for record in guard.values_mut() {
            if &record.student_id == student_id && &record.id != exclude && record.status.is_open()
            {
                record.status = ApplicationStatus::Rejected;
                rejected += 1;
            }
        }
        Ok(rejected)
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[derive(Clone)]
pub(super) struct MemoryStudents {
    records: Arc<Mutex<HashMap<StudentId, StudentRecord>>>,
}

impl MemoryStudents {
    pub(super) fn new(students: Vec<StudentRecord>) -> Self {
        let records = students
            .into_iter()
            .map(|student| (student.id.clone(), student))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub(super) fn is_placed(&self, id: &StudentId) -> bool {
        let guard = self.records.lock().expect("directory mutex poisoned");
        guard.get(id).map(|s| s.is_placed).unwrap_or(false)
    }
}

impl StudentDirectory for MemoryStudents {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn students(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn mark_placed(&self, id: &StudentId) -> Result<bool, StoreError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        let record = guard.get_mut(id).ok_or(StoreError::NotFound)?;
        if record.is_placed {
            return Ok(false);
        }
        record.is_placed = true;
        Ok(true)
    }
}

#[derive(Clone)]
pub(super) struct MemoryCompanies {
    records: Arc<Mutex<HashMap<CompanyId, CompanyRecord>>>,
}

impl MemoryCompanies {
    pub(super) fn new(companies: Vec<CompanyRecord>) -> Self {
        let records = companies
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl CompanyDirectory for MemoryCompanies {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn companies(&self) -> Result<Vec<CompanyRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Student directory that always loses the `mark_placed` race, simulating a
/// concurrent approval landing between the pre-check and the linchpin.
pub(super) struct RacingStudents {
    inner: MemoryStudents,
}

impl RacingStudents {
    pub(super) fn new(students: Vec<StudentRecord>) -> Self {
        Self {
            inner: MemoryStudents::new(students),
        }
    }
}

impl StudentDirectory for RacingStudents {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, StoreError> {
        self.inner.fetch(id)
    }

    fn students(&self) -> Result<Vec<StudentRecord>, StoreError> {
        self.inner.students()
    }

    fn mark_placed(&self, _id: &StudentId) -> Result<bool, StoreError> {
        Ok(false)
    }
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn create(&self, _application: Application) -> Result<Application, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_by_student_company(
        &self,
        _student_id: &StudentId,
        _company_id: &CompanyId,
    ) -> Result<Option<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list_all(&self) -> Result<Vec<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list_by_student(&self, _student_id: &StudentId) -> Result<Vec<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<Application, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _id: &ApplicationId,
        _status: ApplicationStatus,
        _remarks: Option<String>,
    ) -> Result<Application, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn reject_open_siblings(
        &self,
        _student_id: &StudentId,
        _exclude: &ApplicationId,
    ) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &ApplicationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    ApplicationService<MemoryStore, MemoryStudents, MemoryCompanies>,
    Arc<MemoryStore>,
    Arc<MemoryStudents>,
    Arc<MemoryCompanies>,
) {
    let store = Arc::new(MemoryStore::default());
    let students = Arc::new(MemoryStudents::new(seeded_students()));
    let companies = Arc::new(MemoryCompanies::new(seeded_companies()));
    let service = ApplicationService::new(store.clone(), students.clone(), companies.clone());
    (service, store, students, companies)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
