use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{
        Column, button, column, container, pick_list, row, scrollable, text, text_input,
    },
};
use iced_widget::container::bordered_box;
use time::OffsetDateTime;

use crate::{
    core::{
        ApiClient, Mutation, ProjectCollection, ProjectForm, ProjectRepository,
        api::ApiError,
        capability::{self, Action},
        dashboard::{Editor, FetchTicket, Phase},
        form::{self, FieldChange},
        model::{FilterChange, Priority, Project, ProjectId, ProjectStatus, Role, Trainee},
    },
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{CardActions, Choice, choices, labeled, notice_banner, project_card, stats_row},
    },
};

#[derive(Debug, Clone)]
pub struct DashboardScreen {
    collection: ProjectCollection,
    form: Option<ProjectForm>,
    form_error: Option<String>,
    /// Assignee filter options; trainers only.
    trainees: Vec<Trainee>,
}

#[derive(Debug, Clone)]
pub enum DashboardMessage {
    Fetched(FetchTicket, Result<Vec<Project>, ApiError>),
    Refresh,
    TraineesLoaded(Result<Vec<Trainee>, ApiError>),
    StatusFilter(Choice<ProjectStatus>),
    PriorityFilter(Choice<Priority>),
    AssigneeFilter(Choice<Trainee>),
    ClearFilters,
    OpenCreate,
    OpenEdit(ProjectId),
    CloseForm,
    FormField(FieldChange),
    FormTrainees(Result<Vec<Trainee>, ApiError>),
    SubmitForm,
    RequestDelete(ProjectId),
    CancelDelete,
    ConfirmDelete,
    SetStatus(ProjectId, ProjectStatus),
    MutationDone(Mutation, Result<(), ApiError>),
    DismissNotice,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    OpenProject(ProjectId),
}

type Msg = ScreenMessage<DashboardScreen>;

fn msg(message: DashboardMessage) -> Msg {
    ScreenMessage::ScreenMessage(message)
}

fn fetch(api: ApiClient, ticket: FetchTicket) -> Task<Msg> {
    Task::perform(
        async move {
            let result = api.list_projects(ticket.filters()).await;
            (ticket, result)
        },
        |(ticket, result)| msg(DashboardMessage::Fetched(ticket, result)),
    )
}

fn fetch_trainees(
    api: ApiClient,
    done: fn(Result<Vec<Trainee>, ApiError>) -> DashboardMessage,
) -> Task<Msg> {
    Task::perform(
        async move { form::load_trainees(&api).await },
        move |result| msg(done(result)),
    )
}

fn run_mutation(api: ApiClient, mutation: Mutation) -> Task<Msg> {
    Task::perform(
        async move {
            let result = mutation.apply(&api).await;
            (mutation, result)
        },
        |(mutation, result)| msg(DashboardMessage::MutationDone(mutation, result)),
    )
}

impl DashboardScreen {
    /// Screen plus the initial fetch (and the trainee lookup for trainers).
    pub fn new(role: Role, state: &AppState) -> (Self, Task<Msg>) {
        let mut collection = ProjectCollection::new(role);
        let ticket = collection.begin_fetch();
        let mut tasks = vec![fetch(state.api().clone(), ticket)];
        if capability::allows(Some(role), Action::AssignProject) {
            tasks.push(fetch_trainees(state.api().clone(), DashboardMessage::TraineesLoaded));
        }
        let screen = Self {
            collection,
            form: None,
            form_error: None,
            trainees: Vec::new(),
        };
        (screen, Task::batch(tasks))
    }

    fn can(&self, action: Action) -> bool {
        capability::allows(Some(self.collection.role()), action)
    }

    fn filter_bar(&self) -> Element<'_, Msg> {
        let filters = self.collection.filters();
        let mut bar = row![
            labeled(
                "Status",
                pick_list(
                    choices(&ProjectStatus::ALL),
                    Some(Choice::from_option(filters.status)),
                    |c| msg(DashboardMessage::StatusFilter(c)),
                )
                .width(Length::Fill),
            )
            .width(Length::FillPortion(1)),
            labeled(
                "Priority",
                pick_list(
                    choices(&Priority::ALL),
                    Some(Choice::from_option(filters.priority)),
                    |c| msg(DashboardMessage::PriorityFilter(c)),
                )
                .width(Length::Fill),
            )
            .width(Length::FillPortion(1)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::End);

        if self.can(Action::AssignProject) {
            let selected = match filters.assigned_to {
                None => Some(Choice::All),
                Some(id) => self
                    .trainees
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .map(Choice::Only),
            };
            bar = bar.push(
                labeled(
                    "Assigned To",
                    pick_list(choices(&self.trainees), selected, |c| {
                        msg(DashboardMessage::AssigneeFilter(c))
                    })
                    .width(Length::Fill),
                )
                .width(Length::FillPortion(1)),
            );
        }
        if filters.is_active() {
            bar = bar.push(
                button("Clear Filters")
                    .style(button::secondary)
                    .on_press(msg(DashboardMessage::ClearFilters)),
            );
        }
        bar.into()
    }

    fn form_panel<'a>(&'a self, form: &'a ProjectForm) -> Element<'a, Msg> {
        let draft = form.draft();
        let field = |change: fn(String) -> FieldChange| {
            move |value: String| msg(DashboardMessage::FormField(change(value)))
        };

        let mut panel = column![text(form.heading()).size(22)].spacing(10);
        if let Some(error) = &self.form_error {
            panel = panel.push(text(error.clone()).style(text::danger));
        }
        panel = panel
            .push(labeled(
                "Title",
                text_input("Title", &draft.title).on_input(field(FieldChange::Title)),
            ))
            .push(labeled(
                "Description",
                text_input("Description", &draft.description)
                    .on_input(field(FieldChange::Description)),
            ))
            .push(
                row![
                    labeled(
                        "Assign To",
                        pick_list(form.trainees(), form.selected_trainee().cloned(), |t| {
                            msg(DashboardMessage::FormField(FieldChange::AssignedTo(Some(
                                t.id,
                            ))))
                        })
                        .placeholder("Select a trainee")
                        .width(Length::Fill),
                    )
                    .width(Length::FillPortion(1)),
                    labeled(
                        "Priority",
                        pick_list(Priority::ALL, Some(draft.priority), |p| {
                            msg(DashboardMessage::FormField(FieldChange::Priority(p)))
                        })
                        .width(Length::Fill),
                    )
                    .width(Length::FillPortion(1)),
                    labeled(
                        "Due Date",
                        text_input("YYYY-MM-DD", &draft.due_date)
                            .on_input(field(FieldChange::DueDate))
                            .on_submit(msg(DashboardMessage::SubmitForm)),
                    )
                    .width(Length::FillPortion(1)),
                ]
                .spacing(12),
            )
            .push(
                row![
                    button(form.submit_label()).on_press(msg(DashboardMessage::SubmitForm)),
                    button("Cancel")
                        .style(button::secondary)
                        .on_press(msg(DashboardMessage::CloseForm)),
                ]
                .spacing(10),
            );

        container(panel)
            .padding(16)
            .width(Length::Fill)
            .style(bordered_box)
            .into()
    }

    fn delete_prompt(&self, id: ProjectId) -> Element<'_, Msg> {
        let title = self
            .collection
            .project(id)
            .map_or_else(|| format!("project {id}"), |p| format!("\"{}\"", p.title));
        container(
            row![
                text(format!("Are you sure you want to delete {title}?")).width(Length::Fill),
                button("Delete")
                    .style(button::danger)
                    .on_press(msg(DashboardMessage::ConfirmDelete)),
                button("Cancel")
                    .style(button::secondary)
                    .on_press(msg(DashboardMessage::CancelDelete)),
            ]
            .spacing(10)
            .align_y(Center),
        )
        .padding(12)
        .width(Length::Fill)
        .style(bordered_box)
        .into()
    }

    fn project_list(&self) -> Element<'_, Msg> {
        match self.collection.phase() {
            Phase::Loading => text("Loading projects...").into(),
            Phase::Failed(message) => column![
                text(message.clone()).style(text::danger),
                button("Retry").on_press(msg(DashboardMessage::Refresh)),
            ]
            .spacing(8)
            .into(),
            Phase::Ready if self.collection.projects().is_empty() => column![
                text("No projects found").size(20),
                text(self.collection.empty_hint()),
            ]
            .spacing(6)
            .into(),
            Phase::Ready => {
                let now = OffsetDateTime::now_utc();
                let cards = self.collection.projects().iter().map(|project| {
                    let id = project.id;
                    let status = if self.can(Action::UpdateStatus) {
                        project
                            .status
                            .forward_transitions()
                            .iter()
                            .map(|&s| (s, msg(DashboardMessage::SetStatus(id, s))))
                            .collect()
                    } else {
                        Vec::new()
                    };
                    project_card(
                        project,
                        now,
                        CardActions {
                            open: ScreenMessage::ParentMessage(ParentMessage::OpenProject(id)),
                            edit: self
                                .can(Action::EditProject)
                                .then(|| msg(DashboardMessage::OpenEdit(id))),
                            delete: self
                                .can(Action::DeleteProject)
                                .then(|| msg(DashboardMessage::RequestDelete(id))),
                            status,
                        },
                    )
                });
                scrollable(Column::with_children(cards).spacing(12))
                    .height(Length::Fill)
                    .into()
            }
        }
    }

    fn open_form(&mut self, form: ProjectForm, state: &AppState) -> Task<Msg> {
        self.form = Some(form);
        self.form_error = None;
        fetch_trainees(state.api().clone(), DashboardMessage::FormTrainees)
    }
}

impl Screen for DashboardScreen {
    type Message = DashboardMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let mut header = row![
            column![
                text(self.collection.heading()).size(28),
                text(self.collection.subheading()).size(15),
            ]
            .spacing(4)
            .width(Length::Fill),
        ]
        .align_y(Center);
        if self.can(Action::CreateProject) && self.form.is_none() {
            header = header.push(
                button("Create New Project").on_press(msg(DashboardMessage::OpenCreate)),
            );
        }

        let mut page = column![header].spacing(16);
        if let Some(notice) = self.collection.notice() {
            page = page.push(notice_banner(notice, msg(DashboardMessage::DismissNotice)));
        }
        page = page.push(stats_row(self.collection.stats()));
        if let Some(form) = &self.form {
            page = page.push(self.form_panel(form));
        }
        if let Some(id) = self.collection.pending_delete() {
            page = page.push(self.delete_prompt(id));
        }
        page.push(self.filter_bar()).push(self.project_list()).into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        let api = state.api().clone();
        match message {
            DashboardMessage::Fetched(ticket, result) => {
                self.collection
                    .complete_fetch(ticket, result, OffsetDateTime::now_utc());
            }
            DashboardMessage::Refresh => {
                let ticket = self.collection.begin_fetch();
                return fetch(api, ticket);
            }
            DashboardMessage::TraineesLoaded(result) => match result {
                Ok(trainees) => self.trainees = trainees,
                Err(e) => tracing::error!(error = %e, "failed to fetch trainees"),
            },
            DashboardMessage::StatusFilter(choice) => {
                return self.change_filters(
                    api,
                    FilterChange {
                        status: Some(choice.into_option()),
                        ..Default::default()
                    },
                );
            }
            DashboardMessage::PriorityFilter(choice) => {
                return self.change_filters(
                    api,
                    FilterChange {
                        priority: Some(choice.into_option()),
                        ..Default::default()
                    },
                );
            }
            DashboardMessage::AssigneeFilter(choice) => {
                return self.change_filters(
                    api,
                    FilterChange {
                        assigned_to: Some(choice.into_option().map(|t| t.id)),
                        ..Default::default()
                    },
                );
            }
            DashboardMessage::ClearFilters => {
                if let Some(ticket) = self.collection.clear_filters() {
                    return fetch(api, ticket);
                }
            }
            DashboardMessage::OpenCreate => {
                if self.can(Action::CreateProject) {
                    self.collection.open_create();
                    return self.open_form(ProjectForm::create(), state);
                }
            }
            DashboardMessage::OpenEdit(id) => {
                let form = self.collection.project(id).map(ProjectForm::edit);
                if let Some(form) = form.filter(|_| self.can(Action::EditProject)) {
                    self.collection.open_edit(id);
                    return self.open_form(form, state);
                }
            }
            DashboardMessage::CloseForm => {
                self.collection.close_editor();
                self.form = None;
                self.form_error = None;
            }
            DashboardMessage::FormField(change) => {
                if let Some(form) = &mut self.form {
                    form.apply(change);
                }
            }
            DashboardMessage::FormTrainees(result) => {
                if let Some(form) = &mut self.form {
                    form.set_trainees(result);
                }
            }
            DashboardMessage::SubmitForm => {
                let Some(form) = &self.form else {
                    return Task::none();
                };
                match form.submit() {
                    Ok(mutation) => {
                        self.form_error = None;
                        return run_mutation(api, mutation);
                    }
                    Err(e) => self.form_error = Some(e.to_string()),
                }
            }
            DashboardMessage::RequestDelete(id) => self.collection.request_delete(id),
            DashboardMessage::CancelDelete => self.collection.cancel_delete(),
            DashboardMessage::ConfirmDelete => {
                if let Some(mutation) = self.collection.confirm_delete() {
                    return run_mutation(api, mutation);
                }
            }
            DashboardMessage::SetStatus(id, status) => {
                return run_mutation(api, Mutation::SetStatus(id, status));
            }
            DashboardMessage::MutationDone(mutation, result) => {
                let refetch = self.collection.finish_mutation(&mutation, result);
                if self.collection.editor() == Editor::Closed {
                    self.form = None;
                }
                if let Some(ticket) = refetch {
                    return fetch(api, ticket);
                }
            }
            DashboardMessage::DismissNotice => self.collection.dismiss_notice(),
        }
        Task::none()
    }
}

impl DashboardScreen {
    fn change_filters(&mut self, api: ApiClient, change: FilterChange) -> Task<Msg> {
        match self.collection.change_filters(change) {
            Some(ticket) => fetch(api, ticket),
            None => Task::none(),
        }
    }
}
