pub mod dashboard;
pub mod detail;
pub mod loading_page;
pub mod login;
pub mod register;

use iced::{
    Element, Task,
    widget::{button, row, text},
};

use crate::{
    core::{model::ProjectId, notice::Notice},
    gui::{AppState, Message, widgets::layout},
};

#[derive(Debug, Clone)]
pub enum ScreenMessage<S: Screen> {
    ScreenMessage(S::Message),
    ParentMessage(S::ParentMessage),
}

pub trait Screen: Sized {
    type Message: std::fmt::Debug + Clone;
    type ParentMessage: std::fmt::Debug + Clone;
    fn view(&self) -> Element<'_, ScreenMessage<Self>>;
    fn update(&mut self, message: Self::Message, state: &mut AppState)
    -> Task<ScreenMessage<Self>>;
}

#[derive(Debug, Clone)]
pub enum ScreenData {
    LoadingPage(loading_page::LoadingPageScreen),
    Login(login::LoginScreen),
    Register(register::RegisterScreen),
    Dashboard(dashboard::DashboardScreen),
    Detail(detail::DetailScreen),
}

impl ScreenData {
    /// Screens that only make sense with a signed-in session.
    pub fn requires_session(&self) -> bool {
        matches!(self, ScreenData::Dashboard(_) | ScreenData::Detail(_))
    }

    fn signed_in_home(state: &AppState) -> (ScreenData, Task<Message>) {
        match state.role() {
            Some(role) => {
                let (screen, task) = dashboard::DashboardScreen::new(role, state);
                (
                    ScreenData::Dashboard(screen),
                    task.map(Message::Dashboard),
                )
            }
            None => (ScreenData::Login(login::LoginScreen::default()), Task::none()),
        }
    }

    fn open_detail(id: ProjectId, state: &AppState) -> (ScreenData, Task<Message>) {
        let (screen, task) = detail::DetailScreen::new(id, state);
        (ScreenData::Detail(screen), task.map(Message::Detail))
    }

    /// Send the UI back to the login form after the session was dropped.
    pub fn expire(&mut self) {
        *self = ScreenData::Login(login::LoginScreen::with_notice(Notice::error(
            "Your session has expired. Please log in again.",
        )));
    }

    fn nav(&self, state: &AppState) -> Element<'_, Message> {
        let title = text("Mini Project Tracker").size(22);
        let links = match state.role() {
            Some(role) => row![
                text(format!("Signed in as {role}")),
                button("Home").on_press(Message::Home),
                button("Logout").on_press(Message::Logout),
            ],
            None => row![
                button("Login").on_press(Message::ChangeScreen(ScreenData::Login(
                    login::LoginScreen::default()
                ))),
                button("Register").on_press(Message::ChangeScreen(ScreenData::Register(
                    register::RegisterScreen::default()
                ))),
            ],
        };
        row![
            iced::widget::container(title).width(iced::Length::Fill),
            links.spacing(12).align_y(iced::Alignment::Center),
        ]
        .align_y(iced::Alignment::Center)
        .into()
    }

    fn content(&self) -> Element<'_, Message> {
        match self {
            ScreenData::LoadingPage(screen) => screen.view().map(|m| match m {
                ScreenMessage::ScreenMessage(never) | ScreenMessage::ParentMessage(never) => {
                    match never {}
                }
            }),
            ScreenData::Login(screen) => screen.view().map(Message::Login),
            ScreenData::Register(screen) => screen.view().map(Message::Register),
            ScreenData::Dashboard(screen) => screen.view().map(Message::Dashboard),
            ScreenData::Detail(screen) => screen.view().map(Message::Detail),
        }
    }

    /// Page content under the navigation bar.
    pub fn view_with_nav<'a>(&'a self, state: &'a AppState) -> Element<'a, Message> {
        match self {
            ScreenData::LoadingPage(_) => self.content(),
            _ => layout(self.nav(state), self.content()),
        }
    }

    fn dispatch(&mut self, message: Message, state: &mut AppState) -> (Task<Message>, Option<ScreenData>) {
        match (self, message) {
            (_, Message::ChangeScreen(screen)) => (Task::none(), Some(screen)),
            (_, Message::SessionRestored(_) | Message::Home) => {
                let (screen, task) = ScreenData::signed_in_home(state);
                (task, Some(screen))
            }
            (_, Message::Logout) => {
                state.session.logout();
                (
                    Task::none(),
                    Some(ScreenData::Login(login::LoginScreen::default())),
                )
            }
            (ScreenData::Login(page), Message::Login(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    (page.update(msg, state).map(Message::Login), None)
                }
                ScreenMessage::ParentMessage(login::ParentMessage::LoggedIn(role)) => {
                    tracing::info!(%role, "signed in");
                    let (screen, task) = ScreenData::signed_in_home(state);
                    (task, Some(screen))
                }
                ScreenMessage::ParentMessage(login::ParentMessage::OpenRegister) => (
                    Task::none(),
                    Some(ScreenData::Register(register::RegisterScreen::default())),
                ),
            },
            (ScreenData::Register(page), Message::Register(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    (page.update(msg, state).map(Message::Register), None)
                }
                ScreenMessage::ParentMessage(register::ParentMessage::OpenLogin) => (
                    Task::none(),
                    Some(ScreenData::Login(login::LoginScreen::default())),
                ),
            },
            (ScreenData::Dashboard(page), Message::Dashboard(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    (page.update(msg, state).map(Message::Dashboard), None)
                }
                ScreenMessage::ParentMessage(dashboard::ParentMessage::OpenProject(id)) => {
                    let (screen, task) = ScreenData::open_detail(id, state);
                    (task, Some(screen))
                }
            },
            (ScreenData::Detail(page), Message::Detail(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    (page.update(msg, state).map(Message::Detail), None)
                }
                ScreenMessage::ParentMessage(detail::ParentMessage::Back) => {
                    let (screen, task) = ScreenData::signed_in_home(state);
                    (task, Some(screen))
                }
            },
            // a result for a screen that is no longer shown
            _ => (Task::none(), None),
        }
    }
}

impl Screen for ScreenData {
    type Message = Message;
    type ParentMessage = std::convert::Infallible;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        self.content().map(ScreenMessage::ScreenMessage)
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        let (task, next) = self.dispatch(message, state);
        if let Some(screen) = next {
            *self = screen;
        }
        if self.requires_session() && !state.session.is_authenticated() {
            self.expire();
        }
        task.map(ScreenMessage::ScreenMessage)
    }
}
