mod common;

use common::{
    add_member, create_issue, create_project, denial, index, is_forbidden, open, projects,
    register,
};
use issuedesk_core::model::project::{NewProject, ProjectPatch, ProjectType};
use issuedesk_core::{Denial, MembershipIndex, RepoError, ServiceError};

#[test]
fn creator_becomes_the_only_contributor() {
    let conn = open();
    let x = register(&conn, "x");

    let project = create_project(&conn, &x, "issue tracker");

    assert_eq!(project.author_id, x.user_id());
    assert!(index(&conn).is_contributor(x.user_id(), project.id).unwrap());
    let members: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM contributors WHERE project_id = ?1;",
            [project.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(members, 1);
}

#[test]
fn failed_membership_insert_rolls_back_the_project() {
    let conn = open();
    let x = register(&conn, "x");
    conn.execute_batch(
        "CREATE TRIGGER reject_contributors BEFORE INSERT ON contributors
         BEGIN
             SELECT RAISE(ABORT, 'contributors are locked');
         END;",
    )
    .unwrap();

    let result = projects(&conn).create_project(
        &x,
        &NewProject::new(x.user_id(), "doomed", ProjectType::Ios),
    );

    assert!(matches!(result, Err(ServiceError::Repo(RepoError::Db(_)))));
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 0);
}

#[test]
fn creating_for_another_author_is_forbidden() {
    let conn = open();
    let x = register(&conn, "x");
    let y = register(&conn, "y");

    let result = projects(&conn).create_project(
        &x,
        &NewProject::new(y.user_id(), "not mine", ProjectType::Android),
    );

    assert!(is_forbidden(&denial(result)));
}

#[test]
fn blank_description_is_a_validation_error() {
    let conn = open();
    let x = register(&conn, "x");

    let result = projects(&conn).create_project(
        &x,
        &NewProject::new(x.user_id(), "   ", ProjectType::FrontEnd),
    );

    assert!(matches!(
        denial(result),
        Denial::Validation {
            field: "description",
            ..
        }
    ));
}

#[test]
fn outsiders_cannot_tell_a_project_exists() {
    let conn = open();
    let x = register(&conn, "x");
    let outsider = register(&conn, "outsider");
    let project = create_project(&conn, &x, "private");
    let service = projects(&conn);

    let hidden = denial(service.get_project(&outsider, project.id));
    let absent = denial(service.get_project(&outsider, uuid::Uuid::new_v4()));

    assert_eq!(hidden, Denial::NotFound);
    assert_eq!(hidden, absent);
    assert_eq!(
        denial(service.delete_project(&outsider, project.id)),
        Denial::NotFound
    );
    assert!(service.list_projects(&outsider, None).unwrap().is_empty());
}

#[test]
fn only_the_author_updates_and_deletes() {
    let conn = open();
    let x = register(&conn, "x");
    let member = register(&conn, "member");
    let project = create_project(&conn, &x, "shared");
    add_member(&conn, &x, &project, &member);
    let service = projects(&conn);

    let patch = ProjectPatch {
        description: Some("renamed".to_string()),
        ..ProjectPatch::default()
    };
    assert!(is_forbidden(&denial(
        service.update_project(&member, project.id, &patch)
    )));
    assert!(is_forbidden(&denial(
        service.delete_project(&member, project.id)
    )));

    let updated = service.update_project(&x, project.id, &patch).unwrap();
    assert_eq!(updated.description, "renamed");
    assert_eq!(updated.author_id, x.user_id());
    assert_eq!(
        service.get_project(&member, project.id).unwrap().description,
        "renamed"
    );
}

#[test]
fn author_is_write_once_even_for_the_author() {
    let conn = open();
    let x = register(&conn, "x");
    let y = register(&conn, "y");
    let project = create_project(&conn, &x, "mine");
    let service = projects(&conn);

    let reassign = ProjectPatch {
        author_id: Some(y.user_id()),
        ..ProjectPatch::default()
    };
    assert_eq!(
        denial(service.update_project(&x, project.id, &reassign)),
        Denial::validation("author", "update the project author is not allowed")
    );

    let restate = ProjectPatch {
        author_id: Some(x.user_id()),
        kind: Some(ProjectType::Ios),
        ..ProjectPatch::default()
    };
    let updated = service.update_project(&x, project.id, &restate).unwrap();
    assert_eq!(updated.kind, ProjectType::Ios);
}

#[test]
fn deleting_a_project_cascades() {
    let conn = open();
    let x = register(&conn, "x");
    let project = create_project(&conn, &x, "short lived");
    create_issue(&conn, &x, &project, "first");

    projects(&conn).delete_project(&x, project.id).unwrap();

    for table in ["contributors", "issues", "projects"] {
        let rows: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(rows, 0, "{table} should be empty");
    }
}

#[test]
fn list_filters_by_description_within_scope() {
    let conn = open();
    let x = register(&conn, "x");
    let y = register(&conn, "y");
    let first = create_project(&conn, &x, "alpha");
    create_project(&conn, &x, "beta");
    create_project(&conn, &y, "alpha");
    let service = projects(&conn);

    let all = service.list_projects(&x, None).unwrap();
    assert_eq!(
        all.iter().map(|p| p.description.as_str()).collect::<Vec<_>>(),
        vec!["alpha", "beta"]
    );

    let alpha = service.list_projects(&x, Some("alpha")).unwrap();
    assert_eq!(alpha.len(), 1);
    assert_eq!(alpha[0].id, first.id);
}
