//! Exhaustive transition matrices
//!
//! For every kind, every reachable status, and every operation not permitted
//! from that status: the operation fails with `InvalidTransition` and the
//! aggregate - fields and journal alike - is byte-for-byte unchanged.

use workdesk_domain::{
    ChangeRequest, ChangeRequestStatus, ChangeType, DepartmentId, DomainResult, Priority, Project,
    ProjectRequest, ProjectRequestStatus, ProjectStatus, Request, RequestStatus, RiskLevel, Task,
    TaskStatus, TenantId, UserId, WorkItem,
};

type Op<A> = (&'static str, fn(&mut A) -> DomainResult<()>);

/// Probe every operation against the aggregate in its current status.
///
/// Operations in `allowed` must succeed on a fresh copy; everything else
/// must fail with `InvalidTransition` while leaving the original unchanged.
fn probe_matrix<A>(make: impl Fn() -> A, ops: &[Op<A>], allowed: &[&str])
where
    A: WorkItem + Clone + std::fmt::Debug,
{
    for (name, op) in ops {
        let mut aggregate = make();
        let status = aggregate.status_name();
        let journal_before = aggregate.journal().len();
        let debug_before = format!("{aggregate:?}");

        let result = op(&mut aggregate);
        if allowed.contains(name) {
            assert!(
                result.is_ok(),
                "{name} should be allowed from {status}, got {result:?}"
            );
        } else {
            let err = result.expect_err(&format!("{name} should be rejected from {status}"));
            assert!(
                err.is_invalid_transition(),
                "{name} from {status} failed with the wrong error: {err}"
            );
            assert_eq!(
                format!("{aggregate:?}"),
                debug_before,
                "{name} from {status} mutated the aggregate on failure"
            );
            assert_eq!(aggregate.journal().len(), journal_before);
        }
    }
}

mod creation_validation {
    use super::*;

    #[test]
    fn every_kind_enforces_the_title_minimum() {
        let tenant = TenantId::new();
        let actor = UserId::new();

        assert!(Request::create(tenant, "ab", "", Priority::Low, actor)
            .unwrap_err()
            .is_validation());
        assert!(ProjectRequest::create(tenant, "ab", "", Priority::Low, actor)
            .unwrap_err()
            .is_validation());
        assert!(Project::create(tenant, "ab", "", Priority::Low, actor)
            .unwrap_err()
            .is_validation());
        assert!(ChangeRequest::create(
            tenant,
            "ab",
            "",
            Priority::Low,
            RiskLevel::Low,
            ChangeType::Standard,
            "",
            "",
            vec![],
            actor,
        )
        .unwrap_err()
        .is_validation());
        assert!(Task::create(tenant, "ab", "", Priority::Low, None, actor)
            .unwrap_err()
            .is_validation());
    }
}

mod request_matrix {
    use super::*;

    const OPS: &[Op<Request>] = &[
        ("Submit", |r| r.submit()),
        ("StartReview", |r| r.start_review(UserId::new(), None)),
        ("Approve", |r| r.approve(UserId::new(), None)),
        ("Deny", |r| r.deny(UserId::new(), "no")),
        ("Assign", |r| r.assign(UserId::new())),
        ("Complete", |r| r.complete()),
        ("Cancel", |r| r.cancel(None)),
        ("UpdateDetails", |r| {
            r.update_details(None, None, Some(Priority::High))
        }),
    ];

    fn at(status: RequestStatus) -> Request {
        let mut request = Request::create(
            TenantId::new(),
            "Matrix probe",
            "",
            Priority::Medium,
            UserId::new(),
        )
        .unwrap();
        match status {
            RequestStatus::Draft => {}
            RequestStatus::Pending => request.submit().unwrap(),
            RequestStatus::InReview => {
                request.submit().unwrap();
                request.start_review(UserId::new(), None).unwrap();
            }
            RequestStatus::Approved => {
                request.submit().unwrap();
                request.approve(UserId::new(), None).unwrap();
            }
            RequestStatus::Denied => {
                request.submit().unwrap();
                request.deny(UserId::new(), "no").unwrap();
            }
            RequestStatus::InProgress => {
                request.submit().unwrap();
                request.approve(UserId::new(), None).unwrap();
                request.assign(UserId::new()).unwrap();
            }
            RequestStatus::Completed => {
                request.submit().unwrap();
                request.approve(UserId::new(), None).unwrap();
                request.assign(UserId::new()).unwrap();
                request.complete().unwrap();
            }
            RequestStatus::Cancelled => request.cancel(None).unwrap(),
        }
        assert_eq!(request.status(), status);
        request
    }

    #[test]
    fn draft() {
        probe_matrix(
            || at(RequestStatus::Draft),
            OPS,
            &["Submit", "Cancel", "UpdateDetails"],
        );
    }

    #[test]
    fn pending() {
        probe_matrix(
            || at(RequestStatus::Pending),
            OPS,
            &["StartReview", "Approve", "Deny", "Cancel"],
        );
    }

    #[test]
    fn in_review() {
        // StartReview is exact-Pending gated, so it is not repeatable here
        probe_matrix(
            || at(RequestStatus::InReview),
            OPS,
            &["Approve", "Deny", "Cancel"],
        );
    }

    #[test]
    fn approved() {
        probe_matrix(|| at(RequestStatus::Approved), OPS, &["Assign", "Cancel"]);
    }

    #[test]
    fn in_progress() {
        probe_matrix(
            || at(RequestStatus::InProgress),
            OPS,
            &["Assign", "Complete", "Cancel"],
        );
    }

    #[test]
    fn terminals() {
        probe_matrix(|| at(RequestStatus::Denied), OPS, &[]);
        probe_matrix(|| at(RequestStatus::Completed), OPS, &[]);
        probe_matrix(|| at(RequestStatus::Cancelled), OPS, &[]);
    }
}

mod project_request_matrix {
    use super::*;
    use workdesk_domain::ProjectId;

    const OPS: &[Op<ProjectRequest>] = &[
        ("Submit", |r| r.submit()),
        ("StartReview", |r| r.start_review(UserId::new(), None)),
        ("Approve", |r| r.approve(UserId::new(), None)),
        ("Deny", |r| r.deny(UserId::new(), "no")),
        ("MarkAsConverted", |r| r.mark_as_converted(ProjectId::new())),
        ("Cancel", |r| r.cancel(None)),
        ("UpdateDetails", |r| r.update_details(None, None, None)),
    ];

    fn at(status: ProjectRequestStatus) -> ProjectRequest {
        let mut request = ProjectRequest::create(
            TenantId::new(),
            "Matrix probe",
            "",
            Priority::Medium,
            UserId::new(),
        )
        .unwrap();
        match status {
            ProjectRequestStatus::Draft => {}
            ProjectRequestStatus::Pending => request.submit().unwrap(),
            ProjectRequestStatus::InReview => {
                request.submit().unwrap();
                request.start_review(UserId::new(), None).unwrap();
            }
            ProjectRequestStatus::Approved => {
                request.submit().unwrap();
                request.approve(UserId::new(), None).unwrap();
            }
            ProjectRequestStatus::Denied => {
                request.submit().unwrap();
                request.deny(UserId::new(), "no").unwrap();
            }
            ProjectRequestStatus::Converted => {
                request.submit().unwrap();
                request.approve(UserId::new(), None).unwrap();
                request.mark_as_converted(ProjectId::new()).unwrap();
            }
            ProjectRequestStatus::Cancelled => request.cancel(None).unwrap(),
        }
        assert_eq!(request.status(), status);
        request
    }

    #[test]
    fn draft() {
        probe_matrix(
            || at(ProjectRequestStatus::Draft),
            OPS,
            &["Submit", "Cancel", "UpdateDetails"],
        );
    }

    #[test]
    fn pending_and_in_review() {
        probe_matrix(
            || at(ProjectRequestStatus::Pending),
            OPS,
            &["StartReview", "Approve", "Deny", "Cancel"],
        );
        probe_matrix(
            || at(ProjectRequestStatus::InReview),
            OPS,
            &["Approve", "Deny", "Cancel"],
        );
    }

    #[test]
    fn approved_can_only_convert_or_cancel() {
        probe_matrix(
            || at(ProjectRequestStatus::Approved),
            OPS,
            &["MarkAsConverted", "Cancel"],
        );
    }

    #[test]
    fn terminals() {
        probe_matrix(|| at(ProjectRequestStatus::Denied), OPS, &[]);
        probe_matrix(|| at(ProjectRequestStatus::Converted), OPS, &[]);
        probe_matrix(|| at(ProjectRequestStatus::Cancelled), OPS, &[]);
    }
}

mod project_matrix {
    use super::*;

    const OPS: &[Op<Project>] = &[
        ("AssignManager", |p| p.assign_manager(UserId::new())),
        ("Start", |p| p.start()),
        ("PutOnHold", |p| p.put_on_hold("paused")),
        ("Resume", |p| p.resume()),
        ("Complete", |p| p.complete()),
        ("Cancel", |p| p.cancel(None)),
        ("UpdateDetails", |p| p.update_details(None, None, None)),
    ];

    fn at(status: ProjectStatus) -> Project {
        let mut project = Project::create(
            TenantId::new(),
            "Matrix probe",
            "",
            Priority::Medium,
            UserId::new(),
        )
        .unwrap();
        match status {
            ProjectStatus::Planning => {}
            ProjectStatus::Active => project.start().unwrap(),
            ProjectStatus::OnHold => {
                project.start().unwrap();
                project.put_on_hold("paused").unwrap();
            }
            ProjectStatus::Completed => {
                project.start().unwrap();
                project.complete().unwrap();
            }
            ProjectStatus::Cancelled => project.cancel(None).unwrap(),
        }
        assert_eq!(project.status(), status);
        project
    }

    #[test]
    fn planning() {
        probe_matrix(
            || at(ProjectStatus::Planning),
            OPS,
            &["AssignManager", "Start", "Cancel", "UpdateDetails"],
        );
    }

    #[test]
    fn active() {
        probe_matrix(
            || at(ProjectStatus::Active),
            OPS,
            &["AssignManager", "PutOnHold", "Complete", "Cancel"],
        );
    }

    #[test]
    fn on_hold() {
        probe_matrix(|| at(ProjectStatus::OnHold), OPS, &["Resume", "Cancel"]);
    }

    #[test]
    fn terminals() {
        probe_matrix(|| at(ProjectStatus::Completed), OPS, &[]);
        probe_matrix(|| at(ProjectStatus::Cancelled), OPS, &[]);
    }
}

mod change_request_matrix {
    use super::*;
    use chrono::{Duration, Utc};

    const OPS: &[Op<ChangeRequest>] = &[
        ("Submit", |c| c.submit()),
        ("StartReview", |c| c.start_review(UserId::new(), None)),
        ("Approve", |c| c.approve(UserId::new(), None)),
        ("Deny", |c| c.deny(UserId::new(), "no")),
        ("Schedule", |c| {
            c.schedule(Utc::now(), Utc::now() + Duration::hours(1))
        }),
        ("StartExecution", |c| c.start_execution()),
        ("Complete", |c| c.complete()),
        ("MarkAsFailed", |c| c.mark_as_failed("boom")),
        ("Rollback", |c| c.rollback("regression")),
        ("Cancel", |c| c.cancel(None)),
        ("UpdateDetails", |c| {
            c.update_details(None, None, None, None, None, None, None)
        }),
    ];

    fn at(status: ChangeRequestStatus) -> ChangeRequest {
        let mut change = ChangeRequest::create(
            TenantId::new(),
            "Matrix probe",
            "",
            Priority::Medium,
            RiskLevel::Low,
            ChangeType::Normal,
            "",
            "",
            vec![],
            UserId::new(),
        )
        .unwrap();
        let window = |c: &mut ChangeRequest| {
            c.schedule(Utc::now(), Utc::now() + Duration::hours(1)).unwrap();
        };
        match status {
            ChangeRequestStatus::Draft => {}
            ChangeRequestStatus::Pending => change.submit().unwrap(),
            ChangeRequestStatus::InReview => {
                change.submit().unwrap();
                change.start_review(UserId::new(), None).unwrap();
            }
            ChangeRequestStatus::Approved => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
            }
            ChangeRequestStatus::Scheduled => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
                window(&mut change);
            }
            ChangeRequestStatus::InProgress => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
                window(&mut change);
                change.start_execution().unwrap();
            }
            ChangeRequestStatus::Denied => {
                change.submit().unwrap();
                change.deny(UserId::new(), "no").unwrap();
            }
            ChangeRequestStatus::Completed => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
                window(&mut change);
                change.start_execution().unwrap();
                change.complete().unwrap();
            }
            ChangeRequestStatus::Failed => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
                window(&mut change);
                change.start_execution().unwrap();
                change.mark_as_failed("boom").unwrap();
            }
            ChangeRequestStatus::RolledBack => {
                change.submit().unwrap();
                change.approve(UserId::new(), None).unwrap();
                window(&mut change);
                change.start_execution().unwrap();
                change.rollback("regression").unwrap();
            }
            ChangeRequestStatus::Cancelled => change.cancel(None).unwrap(),
        }
        assert_eq!(change.status(), status);
        change
    }

    #[test]
    fn pre_approval_statuses() {
        probe_matrix(
            || at(ChangeRequestStatus::Draft),
            OPS,
            &["Submit", "Cancel", "UpdateDetails"],
        );
        probe_matrix(
            || at(ChangeRequestStatus::Pending),
            OPS,
            &["StartReview", "Approve", "Deny", "Cancel"],
        );
        probe_matrix(
            || at(ChangeRequestStatus::InReview),
            OPS,
            &["Approve", "Deny", "Cancel"],
        );
    }

    #[test]
    fn scheduling_and_execution() {
        probe_matrix(
            || at(ChangeRequestStatus::Approved),
            OPS,
            &["Schedule", "Cancel"],
        );
        probe_matrix(
            || at(ChangeRequestStatus::Scheduled),
            OPS,
            &["StartExecution", "Cancel"],
        );
        // Mid-execution a change runs to one of its three terminals
        probe_matrix(
            || at(ChangeRequestStatus::InProgress),
            OPS,
            &["Complete", "MarkAsFailed", "Rollback"],
        );
    }

    #[test]
    fn terminals() {
        probe_matrix(|| at(ChangeRequestStatus::Denied), OPS, &[]);
        probe_matrix(|| at(ChangeRequestStatus::Completed), OPS, &[]);
        probe_matrix(|| at(ChangeRequestStatus::Failed), OPS, &[]);
        probe_matrix(|| at(ChangeRequestStatus::RolledBack), OPS, &[]);
        probe_matrix(|| at(ChangeRequestStatus::Cancelled), OPS, &[]);
    }
}

mod task_matrix {
    use super::*;

    const OPS: &[Op<Task>] = &[
        ("AssignToUser", |t| t.assign_to_user(UserId::new())),
        ("AssignToDepartment", |t| {
            t.assign_to_department(DepartmentId::new())
        }),
        ("ClaimTask", |t| t.claim(UserId::new())),
        ("Start", |t| t.start()),
        ("LogTime", |t| t.log_time(1.0, UserId::new())),
        ("AddChecklistItem", |t| {
            t.add_checklist_item("step").map(|_| ())
        }),
        ("Complete", |t| t.complete()),
        ("Cancel", |t| t.cancel(None)),
        ("UpdateDetails", |t| t.update_details(None, None, None, None)),
    ];

    /// Department-assigned and unblocked, so claim probes are meaningful
    fn at(status: TaskStatus) -> Task {
        let mut task = Task::create(
            TenantId::new(),
            "Matrix probe",
            "",
            Priority::Medium,
            None,
            UserId::new(),
        )
        .unwrap();
        task.assign_to_department(DepartmentId::new()).unwrap();
        match status {
            TaskStatus::ToDo => {}
            TaskStatus::InProgress => task.start().unwrap(),
            TaskStatus::Completed => {
                task.start().unwrap();
                task.complete().unwrap();
            }
            TaskStatus::Cancelled => task.cancel(None).unwrap(),
        }
        assert_eq!(task.status(), status);
        task
    }

    #[test]
    fn todo() {
        probe_matrix(
            || at(TaskStatus::ToDo),
            OPS,
            &[
                "AssignToUser",
                "AssignToDepartment",
                "ClaimTask",
                "Start",
                "LogTime",
                "AddChecklistItem",
                "Cancel",
                "UpdateDetails",
            ],
        );
    }

    #[test]
    fn in_progress() {
        probe_matrix(
            || at(TaskStatus::InProgress),
            OPS,
            &[
                "AssignToUser",
                "AssignToDepartment",
                "ClaimTask",
                "LogTime",
                "AddChecklistItem",
                "Complete",
                "Cancel",
            ],
        );
    }

    #[test]
    fn terminals() {
        probe_matrix(|| at(TaskStatus::Completed), OPS, &[]);
        probe_matrix(|| at(TaskStatus::Cancelled), OPS, &[]);
    }
}
