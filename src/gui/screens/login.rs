use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, row, text, text_input},
};

use crate::{
    core::{model::Role, notice::Notice, session::LoginError},
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::notice_banner,
    },
};

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    username: String,
    password: String,
    submitting: bool,
    notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub enum LoginMessage {
    UsernameChanged(String),
    PasswordChanged(String),
    Submit,
    Finished(Result<Role, LoginError>),
    DismissNotice,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    LoggedIn(Role),
    OpenRegister,
}

impl LoginScreen {
    pub fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    fn can_submit(&self) -> bool {
        !self.submitting && !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

impl Screen for LoginScreen {
    type Message = LoginMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let msg = ScreenMessage::ScreenMessage;

        let mut form = column![text("Login").size(28)].spacing(14).max_width(380);
        if let Some(notice) = &self.notice {
            form = form.push(notice_banner(notice, msg(LoginMessage::DismissNotice)));
        }

        let submit = button(if self.submitting {
            "Logging in..."
        } else {
            "Login"
        })
        .width(Length::Fill)
        .on_press_maybe(self.can_submit().then(|| msg(LoginMessage::Submit)));

        form = form
            .push(
                column![
                    text("Username"),
                    text_input("Username", &self.username)
                        .on_input(move |s| msg(LoginMessage::UsernameChanged(s)))
                        .on_submit(msg(LoginMessage::Submit)),
                ]
                .spacing(4),
            )
            .push(
                column![
                    text("Password"),
                    text_input("Password", &self.password)
                        .secure(true)
                        .on_input(move |s| msg(LoginMessage::PasswordChanged(s)))
                        .on_submit(msg(LoginMessage::Submit)),
                ]
                .spacing(4),
            )
            .push(submit)
            .push(
                row![
                    text("Don't have an account?"),
                    button("Register")
                        .style(button::text)
                        .on_press(ScreenMessage::ParentMessage(ParentMessage::OpenRegister)),
                ]
                .spacing(6)
                .align_y(Center),
            );

        container(form)
            .center_x(Length::Fill)
            .padding(20)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            LoginMessage::UsernameChanged(username) => {
                self.username = username;
                Task::none()
            }
            LoginMessage::PasswordChanged(password) => {
                self.password = password;
                Task::none()
            }
            LoginMessage::Submit => {
                if !self.can_submit() {
                    return Task::none();
                }
                self.submitting = true;
                self.notice = None;
                let session = state.session.clone();
                let username = self.username.trim().to_string();
                let password = self.password.clone();
                Task::perform(
                    async move { session.login(&username, &password).await },
                    |result| ScreenMessage::ScreenMessage(LoginMessage::Finished(result)),
                )
            }
            LoginMessage::Finished(Ok(role)) => {
                self.submitting = false;
                self.password.clear();
                Task::done(ScreenMessage::ParentMessage(ParentMessage::LoggedIn(role)))
            }
            LoginMessage::Finished(Err(e)) => {
                self.submitting = false;
                tracing::warn!(error = %e, "login failed");
                self.notice = Some(Notice::error(e.to_string()));
                Task::none()
            }
            LoginMessage::DismissNotice => {
                self.notice = None;
                Task::none()
            }
        }
    }
}
