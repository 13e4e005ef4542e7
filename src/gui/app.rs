use iced::{Element, Task, Theme};

use crate::{
    config::Settings,
    core::SessionStore,
    gui::{
        AppState, Message,
        screens::{Screen, ScreenData, ScreenMessage, loading_page::LoadingPageScreen},
    },
};

pub struct MinitrackApp {
    state: AppState,
    screen: ScreenData,
}

impl MinitrackApp {
    /// Starts on the loading page while the stored token is checked.
    pub fn new(session: SessionStore) -> (Self, Task<Message>) {
        let restore = session.clone();
        (
            Self {
                state: AppState::new(session),
                screen: ScreenData::LoadingPage(LoadingPageScreen),
            },
            Task::perform(
                async move { restore.initialize().await },
                Message::SessionRestored,
            ),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        tracing::trace!(?message, "update");
        self.screen
            .update(message, &mut self.state)
            .map(|msg| match msg {
                ScreenMessage::ScreenMessage(msg) => msg,
                ScreenMessage::ParentMessage(never) => match never {},
            })
    }

    pub fn view(&self) -> Element<'_, Message> {
        self.screen.view_with_nav(&self.state)
    }

    pub fn theme(&self) -> Theme {
        Theme::Light
    }
}

/// Open the dashboard window. Blocks until it is closed.
pub fn run(settings: Settings) -> anyhow::Result<()> {
    let session = settings.connect()?;
    tracing::info!(api = %session.api().base_url(), "starting dashboard");
    iced::application(
        move || MinitrackApp::new(session.clone()),
        MinitrackApp::update,
        MinitrackApp::view,
    )
    .title("Mini Project Tracker")
    .theme(MinitrackApp::theme)
    .centered()
    .run()
    .map_err(|e| anyhow::anyhow!("dashboard window failed: {e}"))
}
