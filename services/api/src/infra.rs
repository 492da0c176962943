use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use placement_core::workflows::placement::applications::{
    Application, ApplicationId, ApplicationService, ApplicationStatus, ApplicationStore,
    CompanyDirectory, CompanyId, CompanyRecord, StoreError, StudentDirectory, StudentId,
    StudentRecord,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory application store backing the service. Holds the uniqueness
/// rule for (student, company) pairs under one mutex so concurrent creates
/// are arbitrated here, exactly as a database unique index would.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationStore for InMemoryApplicationStore {
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentDirectory {
    records: Arc<Mutex<HashMap<StudentId, StudentRecord>>>,
}

impl InMemoryStudentDirectory {
    pub(crate) fn with_students(students: Vec<StudentRecord>) -> Self {
        let records = students
            .into_iter()
            .map(|student| (student.id.clone(), student))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl StudentDirectory for InMemoryStudentDirectory {
    fn fetch(&self, id: &StudentId) -> Result<Option<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn students(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    // Linchpin write: flips is_placed only when currently false. The single
    // mutex makes the read-check-write one atomic step.
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryCompanyDirectory {
    records: Arc<Mutex<HashMap<CompanyId, CompanyRecord>>>,
}

impl InMemoryCompanyDirectory {
    pub(crate) fn with_companies(companies: Vec<CompanyRecord>) -> Self {
        let records = companies
            .into_iter()
            .map(|company| (company.id.clone(), company))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl CompanyDirectory for InMemoryCompanyDirectory {
    fn fetch(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn companies(&self) -> Result<Vec<CompanyRecord>, StoreError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(crate) fn seed_students() -> Vec<StudentRecord> {
    [
        ("s-ananya", "Ananya Sharma", "RA2110301", "CSE", 8.6),
        ("s-rahul", "Rahul Menon", "RA2110547", "ECE", 7.4),
        ("s-divya", "Divya Pillai", "RA2110112", "CSE", 9.2),
        ("s-karthik", "Karthik Reddy", "RA2110893", "MECH", 6.8),
    ]
    .into_iter()
    .map(|(id, name, register_number, department, gpa)| StudentRecord {
        id: StudentId(id.to_string()),
        name: name.to_string(),
        email: format!("{}@campus.edu", id.trim_start_matches("s-")),
        register_number: Some(register_number.to_string()),
        department: Some(department.to_string()),
        gpa,
        is_placed: false,
    })
    .collect()
}

pub(crate) fn seed_companies() -> Vec<CompanyRecord> {
    [
        ("c-trident", "Trident Software", "Chennai", 12.0, Some(7.0)),
        ("c-nimbus", "Nimbus Data", "Bengaluru", 21.5, Some(8.0)),
        ("c-corvus", "Corvus Devices", "Pune", 8.5, None),
    ]
    .into_iter()
    .map(|(id, name, location, package_lpa, min_gpa)| CompanyRecord {
        id: CompanyId(id.to_string()),
        name: name.to_string(),
        location: location.to_string(),
        package_lpa: Some(package_lpa),
        min_gpa,
        deadline: Utc
            .with_ymd_and_hms(2026, 12, 31, 23, 59, 59)
            .single()
            .expect("valid deadline"),
    })
    .collect()
}

pub(crate) type SeededService =
    ApplicationService<InMemoryApplicationStore, InMemoryStudentDirectory, InMemoryCompanyDirectory>;

pub(crate) fn build_seeded_service() -> Arc<SeededService> {
    let store = Arc::new(InMemoryApplicationStore::default());
    let students = Arc::new(InMemoryStudentDirectory::with_students(seed_students()));
    let companies = Arc::new(InMemoryCompanyDirectory::with_companies(seed_companies()));
    Arc::new(ApplicationService::new(store, students, companies))
}
