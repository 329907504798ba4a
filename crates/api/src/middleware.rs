//! Application state shared by every handler.

#![allow(missing_docs)]

use std::sync::Arc;

use school_core::{
    ClassDepartmentService, ClassService, DepartmentService, SectionService, SeedService,
    StudentService,
};
use school_db::repositories::{
    ClassDepartmentRepository, ClassRepository, DepartmentRepository, SectionRepository,
    StudentRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub class_service: ClassService,
    pub department_service: DepartmentService,
    pub class_department_service: ClassDepartmentService,
    pub section_service: SectionService,
    pub student_service: StudentService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let class_repo = ClassRepository::new(Arc::clone(&db));
        let department_repo = DepartmentRepository::new(Arc::clone(&db));
        let class_department_repo = ClassDepartmentRepository::new(Arc::clone(&db));
        let section_repo = SectionRepository::new(Arc::clone(&db));
        let student_repo = StudentRepository::new(db);

        let class_service = ClassService::new(
            class_repo.clone(),
            section_repo.clone(),
            student_repo.clone(),
        );
        let department_service = DepartmentService::new(
            department_repo.clone(),
            class_repo.clone(),
            section_repo.clone(),
            student_repo.clone(),
        );
        let class_department_service = ClassDepartmentService::new(
            class_department_repo,
            class_repo.clone(),
            department_repo.clone(),
            section_repo.clone(),
        );
        let section_service = SectionService::new(
            section_repo.clone(),
            class_repo,
            department_repo,
            student_repo.clone(),
        );
        let student_service = StudentService::new(student_repo, section_repo);

        Self {
            class_service,
            department_service,
            class_department_service,
            section_service,
            student_service,
        }
    }

    /// Seeder driving the same services as the handlers.
    #[must_use]
    pub fn seed_service(&self) -> SeedService {
        SeedService::new(
            self.class_service.clone(),
            self.department_service.clone(),
            self.class_department_service.clone(),
            self.section_service.clone(),
        )
    }
}
