#![allow(dead_code)]

use issuedesk_core::db::open_db_in_memory;
use issuedesk_core::model::contributor::NewContributor;
use issuedesk_core::model::issue::{Issue, IssueTag, NewIssue};
use issuedesk_core::model::project::{NewProject, Project, ProjectType};
use issuedesk_core::model::user::NewUser;
use issuedesk_core::repo::comment_repo::SqliteCommentRepository;
use issuedesk_core::repo::contributor_repo::SqliteContributorRepository;
use issuedesk_core::repo::issue_repo::SqliteIssueRepository;
use issuedesk_core::repo::membership_repo::SqliteMembershipIndex;
use issuedesk_core::repo::project_repo::SqliteProjectRepository;
use issuedesk_core::repo::user_repo::SqliteUserRepository;
use issuedesk_core::service::comment_service::CommentService;
use issuedesk_core::service::contributor_service::ContributorService;
use issuedesk_core::service::issue_service::IssueService;
use issuedesk_core::service::project_service::ProjectService;
use issuedesk_core::service::user_service::UserService;
use issuedesk_core::{Denial, Principal, ServiceError};
use rusqlite::Connection;

pub type Projects<'c> = ProjectService<SqliteProjectRepository<'c>, SqliteMembershipIndex<'c>>;
pub type Contributors<'c> =
    ContributorService<SqliteContributorRepository<'c>, SqliteMembershipIndex<'c>>;
pub type Issues<'c> = IssueService<SqliteIssueRepository<'c>, SqliteMembershipIndex<'c>>;
pub type Comments<'c> = CommentService<SqliteCommentRepository<'c>, SqliteMembershipIndex<'c>>;

pub fn open() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn index(conn: &Connection) -> SqliteMembershipIndex<'_> {
    SqliteMembershipIndex::try_new(conn).unwrap()
}

pub fn users(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
}

pub fn projects(conn: &Connection) -> Projects<'_> {
    ProjectService::new(SqliteProjectRepository::try_new(conn).unwrap(), index(conn))
}

pub fn contributors(conn: &Connection) -> Contributors<'_> {
    ContributorService::new(
        SqliteContributorRepository::try_new(conn).unwrap(),
        index(conn),
    )
}

pub fn issues(conn: &Connection) -> Issues<'_> {
    IssueService::new(SqliteIssueRepository::try_new(conn).unwrap(), index(conn))
}

pub fn comments(conn: &Connection) -> Comments<'_> {
    CommentService::new(SqliteCommentRepository::try_new(conn).unwrap(), index(conn))
}

pub fn register(conn: &Connection, username: &str) -> Principal {
    let user = users(conn)
        .register_user(&NewUser::new(username, 30))
        .unwrap();
    Principal::from(&user)
}

pub fn create_project(conn: &Connection, author: &Principal, description: &str) -> Project {
    projects(conn)
        .create_project(
            author,
            &NewProject::new(author.user_id(), description, ProjectType::BackEnd),
        )
        .unwrap()
}

pub fn add_member(conn: &Connection, author: &Principal, project: &Project, member: &Principal) {
    contributors(conn)
        .add_contributor(author, &NewContributor::new(member.user_id(), project.id))
        .unwrap();
}

pub fn create_issue(conn: &Connection, author: &Principal, project: &Project, title: &str) -> Issue {
    issues(conn)
        .create_issue(
            author,
            &NewIssue::new(project.id, author.user_id(), IssueTag::Bug, title),
        )
        .unwrap()
}

pub fn denial<T: std::fmt::Debug>(result: Result<T, ServiceError>) -> Denial {
    match result {
        Err(ServiceError::Denied(denial)) => denial,
        other => panic!("expected a denial, got {other:?}"),
    }
}

pub fn is_forbidden(denial: &Denial) -> bool {
    matches!(denial, Denial::Forbidden(_))
}
