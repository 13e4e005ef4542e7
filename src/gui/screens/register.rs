use std::time::Duration;

use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, pick_list, row, text, text_input},
};

use crate::{
    core::{
        api::ApiError,
        model::{Registration, Role},
        notice::Notice,
        session::{REGISTRATION_SUCCESS, registration_failure_message},
    },
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{labeled, notice_banner},
    },
};

const RETURN_TO_LOGIN_AFTER: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct RegisterScreen {
    username: String,
    email: String,
    password: String,
    role: Role,
    submitting: bool,
    notice: Option<Notice>,
}

impl Default for RegisterScreen {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            role: Role::Trainee,
            submitting: false,
            notice: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum RegisterMessage {
    UsernameChanged(String),
    EmailChanged(String),
    PasswordChanged(String),
    RoleSelected(Role),
    Submit,
    Finished(Result<(), ApiError>),
    DismissNotice,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    OpenLogin,
}

impl RegisterScreen {
    fn can_submit(&self) -> bool {
        !self.submitting && !self.username.trim().is_empty() && !self.password.is_empty()
    }

    fn registration(&self) -> Registration {
        Registration {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
        }
    }
}

impl Screen for RegisterScreen {
    type Message = RegisterMessage;
    type ParentMessage = ParentMessage;

    fn view(&self) -> Element<'_, ScreenMessage<Self>> {
        let msg = ScreenMessage::ScreenMessage;

        let mut form = column![text("Register").size(28)]
            .spacing(14)
            .max_width(380);
        if let Some(notice) = &self.notice {
            form = form.push(notice_banner(notice, msg(RegisterMessage::DismissNotice)));
        }

        form = form
            .push(labeled(
                "Username",
                text_input("Username", &self.username)
                    .on_input(move |s| msg(RegisterMessage::UsernameChanged(s))),
            ))
            .push(labeled(
                "Email (optional)",
                text_input("Email", &self.email)
                    .on_input(move |s| msg(RegisterMessage::EmailChanged(s))),
            ))
            .push(labeled(
                "Password",
                text_input("Password", &self.password)
                    .secure(true)
                    .on_input(move |s| msg(RegisterMessage::PasswordChanged(s)))
                    .on_submit(msg(RegisterMessage::Submit)),
            ))
            .push(
                column![
                    text("Role"),
                    pick_list(Role::ALL, Some(self.role), move |role| {
                        msg(RegisterMessage::RoleSelected(role))
                    })
                    .width(Length::Fill),
                ]
                .spacing(4),
            )
            .push(
                button(if self.submitting {
                    "Registering..."
                } else {
                    "Register"
                })
                .width(Length::Fill)
                .on_press_maybe(self.can_submit().then(|| msg(RegisterMessage::Submit))),
            )
            .push(
                row![
                    text("Already have an account?"),
                    button("Login")
                        .style(button::text)
                        .on_press(ScreenMessage::ParentMessage(ParentMessage::OpenLogin)),
                ]
                .spacing(6)
                .align_y(Center),
            );

        container(form).center_x(Length::Fill).padding(20).into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            RegisterMessage::UsernameChanged(username) => self.username = username,
            RegisterMessage::EmailChanged(email) => self.email = email,
            RegisterMessage::PasswordChanged(password) => self.password = password,
            RegisterMessage::RoleSelected(role) => self.role = role,
            RegisterMessage::DismissNotice => self.notice = None,
            RegisterMessage::Submit => {
                if !self.can_submit() {
                    return Task::none();
                }
                self.submitting = true;
                self.notice = None;
                let session = state.session.clone();
                let registration = self.registration();
                return Task::perform(
                    async move { session.register(&registration).await },
                    |result| ScreenMessage::ScreenMessage(RegisterMessage::Finished(result)),
                );
            }
            RegisterMessage::Finished(Ok(())) => {
                self.submitting = false;
                self.password.clear();
                self.notice = Some(Notice::success(REGISTRATION_SUCCESS));
                return Task::perform(tokio::time::sleep(RETURN_TO_LOGIN_AFTER), |()| {
                    ScreenMessage::ParentMessage(ParentMessage::OpenLogin)
                });
            }
            RegisterMessage::Finished(Err(e)) => {
                self.submitting = false;
                tracing::warn!(error = %e, "registration failed");
                self.notice = Some(Notice::error(registration_failure_message(&e)));
            }
        }
        Task::none()
    }
}
