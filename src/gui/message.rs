use crate::{
    core::model::Role,
    gui::screens::{
        ScreenData, ScreenMessage, dashboard::DashboardScreen, detail::DetailScreen,
        login::LoginScreen, register::RegisterScreen,
    },
};

#[derive(Debug, Clone)]
pub enum Message {
    Login(ScreenMessage<LoginScreen>),
    Register(ScreenMessage<RegisterScreen>),
    Dashboard(ScreenMessage<DashboardScreen>),
    Detail(ScreenMessage<DetailScreen>),
    ChangeScreen(ScreenData),
    SessionRestored(Option<Role>),
    Home,
    Logout,
}
