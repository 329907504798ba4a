//! Business logic services.

#![allow(missing_docs)]

pub mod activation;
pub mod class;
pub mod class_department;
pub mod department;
pub mod paging;
pub mod section;
pub mod seed;
pub mod student;

pub use activation::{ActivationInput, BulkUpdateInput, SetupSummary};
pub use class::{
    ClassDetailResponse, ClassResponse, ClassService, ClassSetupInput, CreateClassInput,
    UpdateClassInput,
};
pub use class_department::{
    ClassDepartmentResponse, ClassDepartmentService, ClassDepartmentSetupInput,
    ClassDepartmentStatus, ClassDepartmentsView, DepartmentActivationInput,
};
pub use department::{
    CreateDepartmentInput, DepartmentResponse, DepartmentService, DepartmentSetupInput,
    UpdateDepartmentInput,
};
pub use paging::{Page, PageRequest, Pagination};
pub use section::{
    CreateSectionInput, SectionConfigInput, SectionResponse, SectionService, SectionSetupInput,
    UpdateSectionInput,
};
pub use seed::{SeedReport, SeedService};
pub use student::{CreateStudentInput, StudentQuery, StudentService};
