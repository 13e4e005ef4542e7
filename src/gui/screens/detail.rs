use iced::{
    Element, Length, Task,
    widget::{Column, Row, button, column, container, row, text},
};
use iced_widget::container::bordered_box;
use time::OffsetDateTime;

use crate::{
    core::{
        ProjectDetail, ProjectRepository,
        api::ApiError,
        capability::{self, Action},
        detail::DetailState,
        display,
        form::format_date,
        model::{Project, ProjectId, ProjectStatus},
    },
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::notice_banner,
    },
};

#[derive(Debug, Clone)]
pub struct DetailScreen {
    detail: ProjectDetail,
}

#[derive(Debug, Clone)]
pub enum DetailMessage {
    Loaded(Result<Project, ApiError>),
    SetStatus(ProjectStatus),
    StatusUpdated(ProjectStatus, Result<Project, ApiError>),
    DismissNotice,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    Back,
}

fn msg(message: DetailMessage) -> ScreenMessage<DetailScreen> {
    ScreenMessage::ScreenMessage(message)
}

impl DetailScreen {
    pub fn new(id: ProjectId, state: &AppState) -> (Self, Task<ScreenMessage<Self>>) {
        let api = state.api().clone();
        let task = Task::perform(async move { api.get_project(id).await }, |result| {
            msg(DetailMessage::Loaded(result))
        });
        (
            Self {
                detail: ProjectDetail::new(id),
            },
            task,
        )
    }

    fn project_view<'a>(&'a self, project: &'a Project) -> Column<'a, ScreenMessage<Self>> {
        let now = OffsetDateTime::now_utc();
        let mut due = row![text(format!(
            "Due Date: {} ({})",
            format_date(project.due_date),
            display::relative_due(project, now)
        ))]
        .spacing(8);
        if project.is_overdue(now) {
            due = due.push(text("Overdue").style(text::danger));
        }

        let mut info = column![
            text(project.title.clone()).size(28),
            text(project.description.clone()),
            text(format!(
                "Assigned To: {}",
                project.assigned_to_name.as_deref().unwrap_or("unassigned")
            )),
            text(format!("Current Status: {}", project.status.as_str())),
            text(format!("Priority: {}", project.priority.as_str())),
            due,
        ]
        .spacing(10);

        let transitions = self.detail.offered_transitions();
        if !transitions.is_empty() {
            let buttons = transitions.iter().fold(Row::new().spacing(10), |row, &status| {
                row.push(
                    button(status.action_label()).on_press(msg(DetailMessage::SetStatus(status))),
                )
            });
            info = info.push(column![text("Update Status").size(18), buttons].spacing(8));
        }
        info
    }
}

impl Screen for DetailScreen {
    type Message = DetailMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let back = button("Back to projects")
            .style(button::secondary)
            .on_press(ScreenMessage::ParentMessage(ParentMessage::Back));

        let mut page = column![back].spacing(16);
        if let Some(notice) = self.detail.notice() {
            page = page.push(notice_banner(notice, msg(DetailMessage::DismissNotice)));
        }
        let body: Element<'_, ScreenMessage<Self>> = match self.detail.state() {
            DetailState::Loading => text("Loading project...").into(),
            DetailState::NotFound => text("Project not found.").size(20).into(),
            DetailState::Loaded(project) => container(self.project_view(project))
                .padding(20)
                .width(Length::Fill)
                .style(bordered_box)
                .into(),
        };
        page.push(body).into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            DetailMessage::Loaded(result) => self.detail.load_finished(result),
            DetailMessage::SetStatus(status) => {
                if !capability::allows(state.role(), Action::UpdateStatus) {
                    return Task::none();
                }
                let api = state.api().clone();
                let id = self.detail.id();
                return Task::perform(
                    async move { api.update_status(id, status).await },
                    move |result| msg(DetailMessage::StatusUpdated(status, result)),
                );
            }
            DetailMessage::StatusUpdated(status, result) => {
                self.detail.status_finished(status, result)
            }
            DetailMessage::DismissNotice => self.detail.dismiss_notice(),
        }
        Task::none()
    }
}
