mod common;

use common::{add_member, contributors, create_project, denial, index, is_forbidden, open, register};
use issuedesk_core::model::contributor::NewContributor;
use issuedesk_core::{Denial, MembershipIndex};
use uuid::Uuid;

#[test]
fn author_adds_a_contributor() {
    let conn = open();
    let author = register(&conn, "author");
    let member = register(&conn, "member");
    let project = create_project(&conn, &author, "team");

    let added = contributors(&conn)
        .add_contributor(&author, &NewContributor::new(member.user_id(), project.id))
        .unwrap();

    assert_eq!(added.user_id, member.user_id());
    assert_eq!(added.project_id, project.id);
    assert!(index(&conn)
        .is_contributor(member.user_id(), project.id)
        .unwrap());
}

#[test]
fn same_pair_cannot_be_added_twice() {
    let conn = open();
    let author = register(&conn, "author");
    let member = register(&conn, "member");
    let project = create_project(&conn, &author, "team");
    add_member(&conn, &author, &project, &member);

    let again = contributors(&conn)
        .add_contributor(&author, &NewContributor::new(member.user_id(), project.id));
    assert!(matches!(
        denial(again),
        Denial::Validation { field: "user", .. }
    ));

    let author_again = contributors(&conn)
        .add_contributor(&author, &NewContributor::new(author.user_id(), project.id));
    assert!(matches!(
        denial(author_again),
        Denial::Validation { field: "user", .. }
    ));
}

#[test]
fn non_authors_cannot_manage_membership() {
    let conn = open();
    let author = register(&conn, "author");
    let member = register(&conn, "member");
    let newcomer = register(&conn, "newcomer");
    let project = create_project(&conn, &author, "team");
    add_member(&conn, &author, &project, &member);

    let by_member = contributors(&conn)
        .add_contributor(&member, &NewContributor::new(newcomer.user_id(), project.id));
    assert!(is_forbidden(&denial(by_member)));

    let on_missing_project = contributors(&conn)
        .add_contributor(&author, &NewContributor::new(newcomer.user_id(), Uuid::new_v4()));
    assert_eq!(
        denial(on_missing_project),
        Denial::forbidden("project does not exist")
    );
}

#[test]
fn unknown_user_is_a_validation_error() {
    let conn = open();
    let author = register(&conn, "author");
    let project = create_project(&conn, &author, "team");

    let result = contributors(&conn)
        .add_contributor(&author, &NewContributor::new(Uuid::new_v4(), project.id));

    assert_eq!(
        denial(result),
        Denial::validation("user", "user does not exist")
    );
}

#[test]
fn removal_is_reserved_to_the_author() {
    let conn = open();
    let author = register(&conn, "author");
    let member = register(&conn, "member");
    let project = create_project(&conn, &author, "team");
    add_member(&conn, &author, &project, &member);
    let service = contributors(&conn);
    let membership = service
        .list_contributors(&member, Some(project.id))
        .unwrap()
        .into_iter()
        .find(|record| record.user_id == member.user_id())
        .unwrap();

    assert!(is_forbidden(&denial(
        service.remove_contributor(&member, membership.id)
    )));

    service.remove_contributor(&author, membership.id).unwrap();
    assert!(!index(&conn)
        .is_contributor(member.user_id(), project.id)
        .unwrap());
    assert_eq!(
        denial(service.get_contributor(&member, membership.id)),
        Denial::NotFound
    );
}

#[test]
fn author_membership_cannot_be_removed() {
    let conn = open();
    let author = register(&conn, "author");
    let project = create_project(&conn, &author, "team");
    let service = contributors(&conn);
    let own = service.list_contributors(&author, Some(project.id)).unwrap();
    assert_eq!(own.len(), 1);

    let result = service.remove_contributor(&author, own[0].id);

    assert!(matches!(
        denial(result),
        Denial::Validation { field: "user", .. }
    ));
    assert!(index(&conn)
        .is_contributor(author.user_id(), project.id)
        .unwrap());
}

#[test]
fn membership_records_are_not_editable() {
    let conn = open();
    let author = register(&conn, "author");
    let outsider = register(&conn, "outsider");
    let project = create_project(&conn, &author, "team");
    let service = contributors(&conn);
    let record = service.list_contributors(&author, None).unwrap().remove(0);

    assert!(is_forbidden(&denial(
        service.update_contributor(&author, record.id)
    )));
    assert_eq!(
        denial(service.update_contributor(&outsider, record.id)),
        Denial::NotFound
    );
    assert_eq!(record.project_id, project.id);
}

#[test]
fn listing_is_scoped_to_shared_projects() {
    let conn = open();
    let a = register(&conn, "a");
    let b = register(&conn, "b");
    let c = register(&conn, "c");
    let project_a = create_project(&conn, &a, "a's");
    create_project(&conn, &b, "b's");
    add_member(&conn, &a, &project_a, &c);
    let service = contributors(&conn);

    let seen_by_c = service.list_contributors(&c, None).unwrap();
    assert_eq!(seen_by_c.len(), 2);
    assert!(seen_by_c.iter().all(|record| record.project_id == project_a.id));
    assert_eq!(seen_by_c[0].user_id, a.user_id());
    assert_eq!(seen_by_c[1].user_id, c.user_id());
}
