//! Database entities.

pub mod class;
pub mod class_department;
pub mod department;
pub mod section;
pub mod student;

pub use class::Entity as Class;
pub use class_department::Entity as ClassDepartment;
pub use department::Entity as Department;
pub use section::Entity as Section;
pub use student::Entity as Student;
