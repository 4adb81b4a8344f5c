//! Write-once field enforcement for updates.
//!
//! # Invariants
//! - A patch may omit a write-once field or restate its stored value; any
//!   other value is a `Validation` denial naming the field.
//! - The guard is independent of who asks: an authorized author is still
//!   refused.

use super::Denial;
use crate::model::comment::{Comment, CommentPatch};
use crate::model::issue::{Issue, IssuePatch};
use crate::model::project::{Project, ProjectPatch};

/// One write-once field as seen by the guard.
pub struct WriteOnceField {
    pub field: &'static str,
    /// `true` when the patch supplies a value different from the stored one.
    pub changed: bool,
    pub message: &'static str,
}

/// Resources with fields that may only be set at creation.
pub trait WriteOnce {
    type Patch;

    fn write_once_fields(&self, patch: &Self::Patch) -> Vec<WriteOnceField>;
}

/// Rejects `patch` if it changes any write-once field of `existing`.
///
/// Fields are checked in declaration order; the first change wins.
pub fn guard_update<R: WriteOnce>(existing: &R, patch: &R::Patch) -> Result<(), Denial> {
    match existing
        .write_once_fields(patch)
        .into_iter()
        .find(|field| field.changed)
    {
        Some(field) => Err(Denial::validation(field.field, field.message)),
        None => Ok(()),
    }
}

fn differs<T: PartialEq>(incoming: Option<T>, stored: T) -> bool {
    incoming.is_some_and(|value| value != stored)
}

impl WriteOnce for Project {
    type Patch = ProjectPatch;

    fn write_once_fields(&self, patch: &ProjectPatch) -> Vec<WriteOnceField> {
        vec![WriteOnceField {
            field: "author",
            changed: differs(patch.author_id, self.author_id),
            message: "update the project author is not allowed",
        }]
    }
}

impl WriteOnce for Issue {
    type Patch = IssuePatch;

    fn write_once_fields(&self, patch: &IssuePatch) -> Vec<WriteOnceField> {
        vec![
            WriteOnceField {
                field: "project",
                changed: differs(patch.project_id, self.project_id),
                message: "project of an issue cannot be modified",
            },
            WriteOnceField {
                field: "author",
                changed: differs(patch.author_id, self.author_id),
                message: "author of an issue cannot be modified",
            },
        ]
    }
}

impl WriteOnce for Comment {
    type Patch = CommentPatch;

    fn write_once_fields(&self, patch: &CommentPatch) -> Vec<WriteOnceField> {
        vec![
            WriteOnceField {
                field: "issue",
                changed: differs(patch.issue_id, self.issue_id),
                message: "issue of a comment cannot be modified",
            },
            WriteOnceField {
                field: "author",
                changed: differs(patch.author_id, self.author_id),
                message: "author of a comment cannot be modified",
            },
        ]
    }
}
