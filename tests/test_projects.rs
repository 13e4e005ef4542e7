//! Integration tests for the project collection and detail views.
//!
//! Tests cover:
//! - Create, edit, delete and status changes followed by a refetch
//! - Delete confirmation
//! - Filtered fetches and the query they send
//! - Role restrictions enforced by the backend
//! - Detail loading and in-place status updates

mod common;

use minitrack::core::{
    dashboard::{Editor, Phase},
    detail::DetailState,
    form::FieldChange,
    notice::NoticeKind,
};
use warp::http::Method;

use common::*;

fn fill_form(form: &mut ProjectForm, title: &str, assigned_to: u64) {
    form.apply(FieldChange::Title(title.to_string()));
    form.apply(FieldChange::Description("Build the thing".to_string()));
    form.apply(FieldChange::AssignedTo(Some(assigned_to)));
    form.apply(FieldChange::DueDate("2099-12-31".to_string()));
}

#[tokio::test]
async fn test_created_project_appears_after_refetch() -> anyhow::Result<()> {
    let backend = Backend::start();
    let session = signed_in(&backend, TRAINER).await;
    let api = session.api();
    let mut view = ProjectCollection::new(Role::Trainer);
    view.fetch_projects(api).await;
    assert_eq!(view.phase(), &Phase::Ready);
    assert!(view.projects().is_empty());

    let mut form = ProjectForm::create();
    fill_form(&mut form, "A", backend.user_id(TRAINEE.0));
    view.open_create();
    view.submit(api, form.submit()?).await;

    let titles: Vec<&str> = view.projects().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["A"]);
    let project = &view.projects()[0];
    assert_eq!(project.status, ProjectStatus::Assigned);
    assert_eq!(project.priority, Priority::Medium);
    assert_eq!(project.assigned_to_name.as_deref(), Some(TRAINEE.0));
    assert_eq!(view.stats().total, 1);
    assert_eq!(view.stats().pending, 1);
    assert_eq!(view.editor(), Editor::Closed);
    let notice = view.notice().expect("success notice");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Project created successfully!");
    // one list before the create, one after
    assert_eq!(backend.count(Method::GET, "mini-projects/"), 2);
    Ok(())
}

#[tokio::test]
async fn test_edit_replaces_fields() -> anyhow::Result<()> {
    let backend = Backend::start();
    let id = backend.seed_project("Draft", TRAINEE.0, ProjectStatus::InProgress);
    let session = signed_in(&backend, TRAINER).await;
    let api = session.api();

    let current = api.get_project(id).await?;
    let mut form = ProjectForm::edit(&current);
    form.apply(FieldChange::Title("Final".to_string()));
    form.apply(FieldChange::AssignedTo(Some(backend.user_id(OTHER_TRAINEE.0))));

    let mut view = ProjectCollection::new(Role::Trainer);
    view.open_edit(id);
    view.submit(api, form.submit()?).await;

    assert_eq!(view.notice().map(|n| n.message.as_str()), Some("Project updated successfully!"));
    let updated = view.project(id).expect("project still listed");
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.assigned_to_name.as_deref(), Some(OTHER_TRAINEE.0));
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(backend.count(Method::PUT, &format!("mini-projects/{id}/")), 1);
    Ok(())
}

#[tokio::test]
async fn test_delete_requires_confirmation() -> anyhow::Result<()> {
    let backend = Backend::start();
    let id = backend.seed_project("Keep me", TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINER).await;
    let mut view = ProjectCollection::new(Role::Trainer);
    view.fetch_projects(session.api()).await;

    view.request_delete(id);
    assert_eq!(view.pending_delete(), Some(id));
    view.cancel_delete();
    assert_eq!(view.confirm_delete(), None);

    assert_eq!(backend.count(Method::DELETE, "mini-projects/"), 0);
    assert_eq!(view.projects().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_confirmed_delete_removes_project() -> anyhow::Result<()> {
    let backend = Backend::start();
    let doomed = backend.seed_project("Doomed", TRAINEE.0, ProjectStatus::Assigned);
    backend.seed_project("Survivor", TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINER).await;
    let api = session.api();
    let mut view = ProjectCollection::new(Role::Trainer);
    view.fetch_projects(api).await;
    assert_eq!(view.projects().len(), 2);

    view.request_delete(doomed);
    let mutation = view.confirm_delete().expect("delete pending");
    assert!(matches!(&mutation, Mutation::Delete(target) if target.id() == doomed));
    view.submit(api, mutation).await;

    assert!(view.project(doomed).is_none());
    assert_eq!(view.projects().len(), 1);
    assert_eq!(view.stats().total, 1);
    assert_eq!(
        view.notice().map(|n| n.message.as_str()),
        Some("Project deleted successfully!")
    );
    Ok(())
}

#[tokio::test]
async fn test_status_filter_returns_only_matching() -> anyhow::Result<()> {
    let backend = Backend::start();
    backend.seed_project("one", TRAINEE.0, ProjectStatus::Completed);
    backend.seed_project("two", TRAINEE.0, ProjectStatus::InProgress);
    backend.seed_project("three", OTHER_TRAINEE.0, ProjectStatus::Completed);
    let session = signed_in(&backend, TRAINER).await;
    let mut view = ProjectCollection::new(Role::Trainer);

    view.update_filters(
        session.api(),
        FilterChange {
            status: Some(Some(ProjectStatus::Completed)),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(view.projects().len(), 2);
    assert!(view.projects().iter().all(|p| p.status == ProjectStatus::Completed));
    assert_eq!(view.stats().completed, 2);
    let last = backend.requests().pop().expect("list request");
    assert_eq!(last.query.get("status").map(String::as_str), Some("completed"));
    assert!(!last.query.contains_key("priority"));
    Ok(())
}

#[tokio::test]
async fn test_assignee_filter_uses_camel_case_key() -> anyhow::Result<()> {
    let backend = Backend::start();
    let carol = backend.user_id(OTHER_TRAINEE.0);
    backend.seed_project("bob's", TRAINEE.0, ProjectStatus::Assigned);
    backend.seed_project("carol's", OTHER_TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINER).await;
    let mut view = ProjectCollection::new(Role::Trainer);

    view.update_filters(
        session.api(),
        FilterChange {
            assigned_to: Some(Some(carol)),
            ..Default::default()
        },
    )
    .await;

    assert_eq!(view.projects().len(), 1);
    assert_eq!(view.projects()[0].title, "carol's");
    let last = backend.requests().pop().expect("list request");
    assert_eq!(last.query.get("assignedTo"), Some(&carol.to_string()));

    // clearing the filters refetches everything
    let ticket = view.clear_filters().expect("filters were active");
    view.run_fetch(session.api(), ticket).await;
    assert_eq!(view.projects().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_same_filters_do_not_refetch() -> anyhow::Result<()> {
    let backend = Backend::start();
    let session = signed_in(&backend, TRAINER).await;
    let mut view = ProjectCollection::new(Role::Trainer);
    view.fetch_projects(session.api()).await;
    let before = backend.count(Method::GET, "mini-projects/");

    view.update_filters(session.api(), FilterChange::default()).await;

    assert_eq!(backend.count(Method::GET, "mini-projects/"), before);
    Ok(())
}

#[tokio::test]
async fn test_trainee_sees_own_projects_and_cannot_create() -> anyhow::Result<()> {
    let backend = Backend::start();
    let mine = backend.seed_project("mine", TRAINEE.0, ProjectStatus::Assigned);
    backend.seed_project("theirs", OTHER_TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINEE).await;
    let api = session.api();
    let mut view = ProjectCollection::new(Role::Trainee);
    view.fetch_projects(api).await;

    assert_eq!(view.heading(), "My Projects");
    assert_eq!(view.projects().len(), 1);
    assert_eq!(view.projects()[0].id, mine);

    view.submit(api, Mutation::Create(make_payload("sneaky", 2))).await;
    let notice = view.notice().expect("failure notice");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(
        notice.message,
        "Failed to create project. Please check the details and try again."
    );
    // a failed mutation leaves the list alone
    assert_eq!(view.projects().len(), 1);

    view.submit(api, Mutation::SetStatus(mine, ProjectStatus::InProgress))
        .await;
    assert_eq!(view.projects()[0].status, ProjectStatus::InProgress);
    assert_eq!(view.stats().in_progress, 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_reports_error() -> anyhow::Result<()> {
    let backend = Backend::start();
    let session = signed_in(&backend, TRAINER).await;
    backend.revoke_tokens();
    let mut view = ProjectCollection::new(Role::Trainer);

    view.fetch_projects(session.api()).await;

    assert_eq!(
        view.phase(),
        &Phase::Failed("Failed to load projects. Please try again.".to_string())
    );
    assert!(view.projects().is_empty());
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn test_detail_updates_status_in_place() -> anyhow::Result<()> {
    let backend = Backend::start();
    let id = backend.seed_project("Detail", TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINEE).await;
    let mut detail = ProjectDetail::new(id);

    detail.load(session.api()).await;
    assert_eq!(
        detail.offered_transitions(),
        &[ProjectStatus::InProgress, ProjectStatus::Completed]
    );
    let gets_before = backend.count(Method::GET, "mini-projects/");

    detail.set_status(session.api(), ProjectStatus::Completed).await;

    let project = detail.project().expect("loaded");
    assert_eq!(project.status, ProjectStatus::Completed);
    assert!(detail.offered_transitions().is_empty());
    assert_eq!(
        detail.notice().map(|n| n.message.as_str()),
        Some("Project status updated to: completed")
    );
    // server copy replaces the local one without another fetch
    assert_eq!(backend.count(Method::GET, "mini-projects/"), gets_before);
    Ok(())
}

#[tokio::test]
async fn test_detail_for_missing_project_is_not_found() -> anyhow::Result<()> {
    let backend = Backend::start();
    let hidden = backend.seed_project("hidden", OTHER_TRAINEE.0, ProjectStatus::Assigned);
    let session = signed_in(&backend, TRAINEE).await;

    let mut missing = ProjectDetail::new(999);
    missing.load(session.api()).await;
    assert_eq!(missing.state(), &DetailState::NotFound);

    let mut not_mine = ProjectDetail::new(hidden);
    not_mine.load(session.api()).await;
    assert_eq!(not_mine.state(), &DetailState::NotFound);
    assert!(not_mine.offered_transitions().is_empty());
    Ok(())
}
