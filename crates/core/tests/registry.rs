//! Registry behaviour against an in-memory `SQLite` database.

#![allow(clippy::unwrap_used)]

use school_common::AppError;
use school_core::{
    BulkUpdateInput, ClassDepartmentService, ClassDepartmentSetupInput, ClassService,
    CreateClassInput, CreateDepartmentInput, CreateSectionInput, CreateStudentInput,
    DepartmentActivationInput, DepartmentService, PageRequest, SectionConfigInput,
    SectionService, SectionSetupInput, SeedService, StudentService, UpdateClassInput,
    UpdateDepartmentInput, UpdateSectionInput,
};
use school_db::entities::class::Medium;
use school_db::repositories::{
    ClassDepartmentRepository, ClassRepository, DepartmentRepository, SectionRepository,
    StudentRepository,
};
use school_db::test_utils::TestDatabase;

struct Registry {
    _db: TestDatabase,
    classes: ClassService,
    departments: DepartmentService,
    links: ClassDepartmentService,
    sections: SectionService,
    students: StudentService,
}

async fn registry() -> Registry {
    let db = TestDatabase::in_memory().await.unwrap();
    let conn = db.shared();

    let class_repo = ClassRepository::new(conn.clone());
    let department_repo = DepartmentRepository::new(conn.clone());
    let link_repo = ClassDepartmentRepository::new(conn.clone());
    let section_repo = SectionRepository::new(conn.clone());
    let student_repo = StudentRepository::new(conn);

    Registry {
        classes: ClassService::new(
            class_repo.clone(),
            section_repo.clone(),
            student_repo.clone(),
        ),
        departments: DepartmentService::new(
            department_repo.clone(),
            class_repo.clone(),
            section_repo.clone(),
            student_repo.clone(),
        ),
        links: ClassDepartmentService::new(
            link_repo,
            class_repo.clone(),
            department_repo.clone(),
            section_repo.clone(),
        ),
        sections: SectionService::new(
            section_repo.clone(),
            class_repo,
            department_repo,
            student_repo.clone(),
        ),
        students: StudentService::new(student_repo, section_repo),
        _db: db,
    }
}

async fn create_class(r: &Registry, name: &str) -> String {
    r.classes
        .create(CreateClassInput {
            name: name.to_string(),
            medium: Medium::Bangla,
        })
        .await
        .unwrap()
        .id
}

async fn create_department(r: &Registry, name: &str) -> String {
    r.departments
        .create(CreateDepartmentInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap()
        .id
}

async fn create_section(
    r: &Registry,
    name: &str,
    class_id: &str,
    department_id: Option<&str>,
) -> Result<String, AppError> {
    r.sections
        .create(CreateSectionInput {
            name: name.to_string(),
            class_id: class_id.to_string(),
            department_id: department_id.map(ToString::to_string),
            capacity: None,
        })
        .await
        .map(|s| s.id)
}

async fn enrol(r: &Registry, section_id: &str) {
    r.students
        .create(CreateStudentInput {
            first_name: "Tanvir".to_string(),
            last_name: None,
            roll_number: None,
            section_id: section_id.to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_duplicate_class_name_persists_nothing() {
    let r = registry().await;
    create_class(&r, "Eight").await;

    let result = r
        .classes
        .create(CreateClassInput {
            name: "Eight".to_string(),
            medium: Medium::English,
        })
        .await;

    assert!(matches!(result, Err(AppError::Duplicate(_))));
    let page = r.classes.list(PageRequest::default(), true).await.unwrap();
    assert_eq!(page.pagination.total, 1);
}

#[tokio::test]
async fn test_rename_onto_existing_name_is_duplicate() {
    let r = registry().await;
    create_class(&r, "Seven").await;
    let eight = create_class(&r, "Eight").await;

    let result = r
        .classes
        .update(
            &eight,
            UpdateClassInput {
                name: Some("Seven".to_string()),
                ..UpdateClassInput::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Duplicate(_))));

    // Renaming to its own name is fine.
    let same = r
        .classes
        .update(
            &eight,
            UpdateClassInput {
                name: Some("Eight".to_string()),
                medium: Some(Medium::English),
                ..UpdateClassInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.medium, Medium::English);
}

#[tokio::test]
async fn test_bulk_set_active_touches_only_listed_rows() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    let two = create_class(&r, "Two").await;
    let three = create_class(&r, "Three").await;

    let updated = r
        .classes
        .bulk_set_active(BulkUpdateInput {
            ids: vec![one.clone(), two.clone()],
            is_active: false,
        })
        .await
        .unwrap();

    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|c| !c.is_active));

    let active = r.classes.list_by_medium(None, false).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, three);
}

#[tokio::test]
async fn test_bulk_set_active_with_missing_id_changes_nothing() {
    let r = registry().await;
    let one = create_class(&r, "One").await;

    let result = r
        .classes
        .bulk_set_active(BulkUpdateInput {
            ids: vec![one.clone(), "ghost-a".to_string(), "ghost-b".to_string()],
            is_active: false,
        })
        .await;

    match result {
        Err(AppError::MissingIds { ids, .. }) => {
            assert_eq!(ids, vec!["ghost-a".to_string(), "ghost-b".to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let class = r.classes.get(&one).await.unwrap();
    assert!(class.class.is_active);
}

#[tokio::test]
async fn test_reset_for_class_is_scoped_to_that_class() {
    let r = registry().await;
    let nine = create_class(&r, "Nine").await;
    let ten = create_class(&r, "Ten").await;
    let science = create_department(&r, "Science").await;
    let humanities = create_department(&r, "Humanities").await;

    for class_id in [&nine, &ten] {
        r.links
            .setup_for_class(ClassDepartmentSetupInput {
                class_id: class_id.clone(),
                departments: vec![
                    DepartmentActivationInput {
                        department_id: science.clone(),
                        is_active: true,
                    },
                    DepartmentActivationInput {
                        department_id: humanities.clone(),
                        is_active: true,
                    },
                ],
            })
            .await
            .unwrap();
    }

    let summary = r.links.reset_for_class(&nine).await.unwrap();
    assert_eq!(summary.affected, 2);

    let nine_view = r.links.get_for_class(&nine).await.unwrap();
    assert!(nine_view.departments.iter().all(|d| !d.is_active));

    let ten_view = r.links.get_for_class(&ten).await.unwrap();
    assert!(ten_view.departments.iter().all(|d| d.is_active));
}

#[tokio::test]
async fn test_setup_for_class_round_trip_and_upsert() {
    let r = registry().await;
    let eight = create_class(&r, "Eight").await;
    let science = create_department(&r, "Science").await;
    let business = create_department(&r, "Business Studies").await;

    let rows = r
        .links
        .setup_for_class(ClassDepartmentSetupInput {
            class_id: eight.clone(),
            departments: vec![
                DepartmentActivationInput {
                    department_id: science.clone(),
                    is_active: true,
                },
                DepartmentActivationInput {
                    department_id: business.clone(),
                    is_active: false,
                },
            ],
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    let science_link = rows
        .iter()
        .find(|row| row.department_id == science)
        .unwrap()
        .id
        .clone();

    let view = r.links.get_for_class(&eight).await.unwrap();
    let status = |id: &str| view.departments.iter().find(|d| d.id == id).unwrap().is_active;
    assert!(status(&science));
    assert!(!status(&business));

    // Same pair again with false updates the existing row.
    let rows = r
        .links
        .setup_for_class(ClassDepartmentSetupInput {
            class_id: eight.clone(),
            departments: vec![DepartmentActivationInput {
                department_id: science.clone(),
                is_active: false,
            }],
        })
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    let science_row = rows.iter().find(|row| row.department_id == science).unwrap();
    assert_eq!(science_row.id, science_link);
    assert!(!science_row.is_active);
}

#[tokio::test]
async fn test_find_by_class_lists_offered_departments() {
    let r = registry().await;
    let nine = create_class(&r, "Nine").await;
    let science = create_department(&r, "Science").await;
    create_department(&r, "Humanities").await;

    r.links
        .setup_for_class(ClassDepartmentSetupInput {
            class_id: nine.clone(),
            departments: vec![DepartmentActivationInput {
                department_id: science.clone(),
                is_active: true,
            }],
        })
        .await
        .unwrap();
    create_section(&r, "A", &nine, Some(&science)).await.unwrap();

    let offered = r.departments.find_by_class(&nine).await.unwrap();
    assert_eq!(offered.len(), 1);
    assert_eq!(offered[0].id, science);
    assert_eq!(offered[0].count.sections, 1);
}

#[tokio::test]
async fn test_delete_guards_follow_enrolment() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    let two = create_class(&r, "Two").await;
    let science = create_department(&r, "Science").await;
    let empty_department = create_department(&r, "Humanities").await;

    let occupied = create_section(&r, "A", &one, Some(&science)).await.unwrap();
    let empty = create_section(&r, "B", &one, None).await.unwrap();
    create_section(&r, "A", &two, None).await.unwrap();
    enrol(&r, &occupied).await;

    assert!(matches!(
        r.classes.delete(&one).await,
        Err(AppError::HasDependents(_))
    ));
    assert!(matches!(
        r.departments.delete(&science).await,
        Err(AppError::HasDependents(_))
    ));
    assert!(matches!(
        r.sections.delete(&occupied).await,
        Err(AppError::HasDependents(_))
    ));
    assert!(r.classes.get(&one).await.is_ok());
    assert!(r.sections.get(&occupied).await.is_ok());

    r.sections.delete(&empty).await.unwrap();
    r.classes.delete(&two).await.unwrap();
    r.departments.delete(&empty_department).await.unwrap();

    assert!(matches!(
        r.sections.get(&empty).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        r.classes.get(&two).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_section_identity_includes_department() {
    let r = registry().await;
    let eight = create_class(&r, "Eight").await;
    let science = create_department(&r, "Science").await;

    create_section(&r, "A", &eight, Some(&science)).await.unwrap();

    let again = create_section(&r, "A", &eight, Some(&science)).await;
    assert!(matches!(again, Err(AppError::Duplicate(_))));

    create_section(&r, "A", &eight, None).await.unwrap();

    let unassigned_again = create_section(&r, "A", &eight, None).await;
    assert!(matches!(unassigned_again, Err(AppError::Duplicate(_))));
}

#[tokio::test]
async fn test_section_create_with_unknown_department() {
    let r = registry().await;
    let eight = create_class(&r, "Eight").await;

    let result = create_section(&r, "A", &eight, Some("ghost")).await;

    assert!(matches!(result, Err(AppError::InvalidReference(_))));
}

#[tokio::test]
async fn test_section_setup_toggles_and_creates() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    let a = create_section(&r, "A", &one, None).await.unwrap();

    let sections = r
        .sections
        .setup(SectionSetupInput {
            class_id: one.clone(),
            department_id: None,
            section_configs: vec![
                SectionConfigInput {
                    id: Some(a.clone()),
                    name: "A".to_string(),
                    is_active: false,
                },
                SectionConfigInput {
                    id: None,
                    name: "B".to_string(),
                    is_active: true,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].name, "A");
    assert!(!sections[0].is_active);
    assert_eq!(sections[1].name, "B");
    assert!(sections[1].is_active);
}

#[tokio::test]
async fn test_section_setup_is_all_or_nothing() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    let a = create_section(&r, "A", &one, None).await.unwrap();

    let result = r
        .sections
        .setup(SectionSetupInput {
            class_id: one.clone(),
            department_id: None,
            section_configs: vec![
                SectionConfigInput {
                    id: Some(a.clone()),
                    name: "A".to_string(),
                    is_active: false,
                },
                SectionConfigInput {
                    id: None,
                    name: "C".to_string(),
                    is_active: true,
                },
                SectionConfigInput {
                    id: None,
                    name: "C".to_string(),
                    is_active: true,
                },
            ],
        })
        .await;
    assert!(matches!(result, Err(AppError::Duplicate(_))));

    let scope = r.sections.list_scope(&one, None).await.unwrap();
    assert_eq!(scope.len(), 1);
    assert!(scope[0].is_active);
}

#[tokio::test]
async fn test_reset_sections_narrowed_by_department() {
    let r = registry().await;
    let nine = create_class(&r, "Nine").await;
    let science = create_department(&r, "Science").await;
    create_section(&r, "A", &nine, Some(&science)).await.unwrap();
    create_section(&r, "A", &nine, None).await.unwrap();

    let summary = r.sections.reset(&nine, Some(&science)).await.unwrap();
    assert_eq!(summary.affected, 1);

    let active = r
        .sections
        .list_by_class(&nine, None, PageRequest::default(), false)
        .await
        .unwrap();
    assert_eq!(active.pagination.total, 1);
    assert_eq!(active.data[0].department_id, None);

    let everything = r.sections.reset(&nine, None).await.unwrap();
    assert_eq!(everything.affected, 2);
}

#[tokio::test]
async fn test_class_reset_by_medium() {
    let r = registry().await;
    create_class(&r, "One").await;
    r.classes
        .create(CreateClassInput {
            name: "Standard 1".to_string(),
            medium: Medium::English,
        })
        .await
        .unwrap();

    let summary = r.classes.reset(Some(Medium::English)).await.unwrap();
    assert_eq!(summary.affected, 1);

    let active = r.classes.list_by_medium(None, false).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "One");
}

#[tokio::test]
async fn test_list_paginates() {
    let r = registry().await;
    for name in ["A1", "A2", "A3", "A4", "A5"] {
        create_class(&r, name).await;
    }

    let page = r.classes.list(PageRequest::new(2, 2), true).await.unwrap();

    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].name, "A3");
}

#[tokio::test]
async fn test_seed_is_idempotent() {
    let r = registry().await;
    let seed = SeedService::new(
        r.classes.clone(),
        r.departments.clone(),
        r.links.clone(),
        r.sections.clone(),
    );

    let first = seed.seed_demo_data().await.unwrap();
    assert_eq!(first.classes_created, 13);
    assert_eq!(first.departments_created, 7);
    assert_eq!(first.sections_created, 5);
    assert_eq!(first.class_departments_configured, 14);

    let second = seed.seed_demo_data().await.unwrap();
    assert_eq!(second.classes_created, 0);
    assert_eq!(second.sections_created, 0);
    assert_eq!(second.class_departments_configured, 0);

    let ten = r.classes.find_by_name("Ten").await.unwrap().unwrap();
    let view = r.links.get_for_class(&ten.id).await.unwrap();
    assert_eq!(view.departments.len(), 7);
    assert!(view.departments.iter().all(|d| d.is_active));
}

#[tokio::test]
async fn test_response_serializes_counts() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    create_section(&r, "A", &one, None).await.unwrap();

    let class = r.classes.get(&one).await.unwrap();
    let json = serde_json::to_value(&class).unwrap();

    assert_eq!(json["_count"]["sections"], 1);
    assert_eq!(json["isActive"], true);
    assert_eq!(json["medium"], "BANGLA");
    assert_eq!(json["sections"][0]["_count"]["students"], 0);
}

#[tokio::test]
async fn test_blank_names_are_rejected() {
    let r = registry().await;

    let class = r
        .classes
        .create(CreateClassInput {
            name: "   ".to_string(),
            medium: Medium::Bangla,
        })
        .await;
    assert!(matches!(class, Err(AppError::Validation(_))));

    let department = r
        .departments
        .create(CreateDepartmentInput {
            name: " \t ".to_string(),
            description: None,
        })
        .await;
    assert!(matches!(department, Err(AppError::Validation(_))));

    let one = create_class(&r, "One").await;
    let section = create_section(&r, "  ", &one, None).await;
    assert!(matches!(section, Err(AppError::Validation(_))));

    let page = r.classes.list(PageRequest::default(), true).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert!(r.sections.list_scope(&one, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_rename_keeps_old_name() {
    let r = registry().await;
    let one = create_class(&r, "One").await;
    let science = create_department(&r, "Science").await;
    let section = create_section(&r, "A", &one, None).await.unwrap();

    let class = r
        .classes
        .update(
            &one,
            UpdateClassInput {
                name: Some("  ".to_string()),
                ..UpdateClassInput::default()
            },
        )
        .await;
    assert!(matches!(class, Err(AppError::Validation(_))));

    let department = r
        .departments
        .update(
            &science,
            UpdateDepartmentInput {
                name: Some(" ".to_string()),
                ..UpdateDepartmentInput::default()
            },
        )
        .await;
    assert!(matches!(department, Err(AppError::Validation(_))));

    let renamed = r
        .sections
        .update(
            &section,
            UpdateSectionInput {
                name: Some("   ".to_string()),
                ..UpdateSectionInput::default()
            },
        )
        .await;
    assert!(matches!(renamed, Err(AppError::Validation(_))));

    assert_eq!(r.classes.get(&one).await.unwrap().class.name, "One");
    assert_eq!(r.departments.get(&science).await.unwrap().name, "Science");
    assert_eq!(r.sections.get(&section).await.unwrap().name, "A");
}

#[tokio::test]
async fn test_section_setup_rejects_blank_new_name() {
    let r = registry().await;
    let one = create_class(&r, "One").await;

    let result = r
        .sections
        .setup(SectionSetupInput {
            class_id: one.clone(),
            department_id: None,
            section_configs: vec![
                SectionConfigInput {
                    id: None,
                    name: "B".to_string(),
                    is_active: true,
                },
                SectionConfigInput {
                    id: None,
                    name: "   ".to_string(),
                    is_active: true,
                },
            ],
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(r.sections.list_scope(&one, None).await.unwrap().is_empty());
}
