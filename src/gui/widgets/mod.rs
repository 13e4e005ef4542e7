use std::fmt;

use iced::{
    Alignment::Center,
    Element, Length, Theme, border,
    widget::{Column, button, column, container, container::Style, row, text},
};
use iced_widget::container::bordered_box;
use time::OffsetDateTime;

use crate::core::{
    display,
    model::{Project, ProjectStatus},
    notice::{Notice, NoticeKind},
    stats::DerivedStats,
};

/// Selector entry where `All` stands for an empty filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Choice<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Choice::All, Choice::Only)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Only(value) => value.fmt(f),
        }
    }
}

pub fn choices<T: Clone>(items: &[T]) -> Vec<Choice<T>> {
    std::iter::once(Choice::All)
        .chain(items.iter().cloned().map(Choice::Only))
        .collect()
}

fn card_style(status: ProjectStatus) -> impl Fn(&Theme) -> Style {
    move |theme: &Theme| {
        let palette = theme.extended_palette();
        let accent = match status {
            ProjectStatus::Assigned => palette.secondary.base.color,
            ProjectStatus::InProgress => palette.primary.base.color,
            ProjectStatus::Completed => palette.success.base.color,
        };
        bordered_box(theme).border(border::width(2).color(accent).rounded(6))
    }
}

/// Navigation bar above the page content.
pub fn layout<'a, Message>(
    nav: impl Into<Element<'a, Message>>,
    main_content: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    column![
        container(nav.into())
            .padding(12)
            .width(Length::Fill)
            .style(bordered_box),
        container(main_content.into())
            .padding(20)
            .width(Length::Fill)
            .height(Length::Fill),
    ]
    .into()
}

/// Form field with its label above it.
pub fn labeled<'a, Message: 'a>(
    label: &'a str,
    input: impl Into<Element<'a, Message>>,
) -> Column<'a, Message> {
    column![text(label), input.into()].spacing(4)
}

pub fn notice_banner<'a, Message: Clone + 'a>(
    notice: &Notice,
    on_close: Message,
) -> Element<'a, Message> {
    let message = match notice.kind {
        NoticeKind::Success => text(notice.message.clone()).style(text::success),
        NoticeKind::Error => text(notice.message.clone()).style(text::danger),
    };
    container(
        row![
            container(message).width(Length::Fill),
            button("×").on_press(on_close).style(button::text),
        ]
        .align_y(Center)
        .spacing(10),
    )
    .padding(10)
    .width(Length::Fill)
    .style(bordered_box)
    .into()
}

pub fn stats_row<'a, Message: 'a>(stats: DerivedStats) -> Element<'a, Message> {
    let tile = |value: usize, label: &'static str| {
        container(column![text(value.to_string()).size(26), text(label).size(14)].spacing(4))
            .padding(12)
            .width(Length::FillPortion(1))
            .style(bordered_box)
    };
    row![
        tile(stats.total, "Total"),
        tile(stats.completed, "Completed"),
        tile(stats.in_progress, "In Progress"),
        tile(stats.pending, "Pending"),
        tile(stats.overdue, "Overdue"),
    ]
    .spacing(12)
    .into()
}

/// Messages a project card can emit. `None` hides the control.
pub struct CardActions<Message> {
    pub open: Message,
    pub edit: Option<Message>,
    pub delete: Option<Message>,
    pub status: Vec<(ProjectStatus, Message)>,
}

pub fn project_card<'a, Message: Clone + 'a>(
    project: &Project,
    now: OffsetDateTime,
    actions: CardActions<Message>,
) -> Element<'a, Message> {
    let mut due = row![text(display::relative_due(project, now)).size(14)].spacing(8);
    if project.is_overdue(now) {
        due = due.push(text("(Overdue)").size(14).style(text::danger));
    }

    let mut controls = row![button("View Details").on_press(actions.open).style(button::secondary)]
        .spacing(8);
    if let Some(edit) = actions.edit {
        controls = controls.push(button("Edit").on_press(edit).style(button::secondary));
    }
    if let Some(delete) = actions.delete {
        controls = controls.push(button("Delete").on_press(delete).style(button::danger));
    }

    let status_controls = actions
        .status
        .into_iter()
        .fold(Column::new().spacing(6), |col, (status, message)| {
            col.push(
                button(text(status.action_label()).size(13))
                    .on_press(message)
                    .width(Length::Fill),
            )
        });

    container(
        column![
            row![
                text(project.title.clone()).size(20).width(Length::Fill),
                text(project.status.label()).size(13),
            ]
            .align_y(Center),
            text(format!(
                "Assigned to: {}",
                project.assigned_to_name.as_deref().unwrap_or("unassigned")
            ))
            .size(14),
            text(format!("Priority: {}", project.priority)).size(14),
            due,
            text(display::excerpt(&project.description)).size(14),
            controls,
            status_controls,
        ]
        .spacing(8),
    )
    .padding(16)
    .width(Length::Fill)
    .style(card_style(project.status))
    .into()
}
