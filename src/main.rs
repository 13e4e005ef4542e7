use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use time::OffsetDateTime;

use minitrack::{
    config::Settings,
    core::{
        ProjectCollection, ProjectDetail, ProjectForm, ProjectRepository, SessionStore,
        capability::{self, Action},
        dashboard::Phase,
        detail::DetailState,
        display,
        form::FieldChange,
        model::{FilterChange, Priority, Project, ProjectId, ProjectStatus, Registration, Role, UserId},
        session::{REGISTRATION_SUCCESS, registration_failure_message},
    },
    logging,
};

#[derive(Parser)]
#[command(name = "minitrack")]
#[command(about = "Track mini projects assigned to trainees")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the dashboard window (default)
    #[cfg(feature = "gui")]
    Gui,
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the role of the stored session
    Whoami,
    /// Create a new account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, value_parser = parse_role, default_value = "trainee")]
        role: Role,
    },
    /// List trainees that projects can be assigned to
    Trainees,
    /// Work with mini projects
    #[command(subcommand)]
    Projects(ProjectCommand),
}

#[derive(Subcommand)]
enum ProjectCommand {
    /// List projects with summary counts
    List {
        #[arg(long)]
        status: Option<ProjectStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_name = "USER_ID")]
        assigned_to: Option<UserId>,
    },
    /// Show one project
    Show { id: ProjectId },
    /// Create a project
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_name = "USER_ID")]
        assigned_to: UserId,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// YYYY-MM-DD
        #[arg(long)]
        due_date: String,
    },
    /// Replace a project's fields; omitted flags keep their current value
    Edit {
        id: ProjectId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "USER_ID")]
        assigned_to: Option<UserId>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Move a project to a new status
    Status { id: ProjectId, status: ProjectStatus },
    /// Delete a project
    Delete {
        id: ProjectId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    match s.to_ascii_lowercase().as_str() {
        "trainer" => Ok(Role::Trainer),
        "trainee" => Ok(Role::Trainee),
        other => Err(format!("unknown role {other:?} (expected trainer or trainee)")),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init(args.verbose)?;

    let command = match args.command {
        Some(command) => command,
        #[cfg(feature = "gui")]
        None => Command::Gui,
        #[cfg(not(feature = "gui"))]
        None => anyhow::bail!("no command given; built without the gui feature"),
    };

    #[cfg(feature = "gui")]
    if matches!(command, Command::Gui) {
        return minitrack::gui::run(args.settings);
    }

    let session = args.settings.connect()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_command(&session, command))
}

async fn run_command(session: &SessionStore, command: Command) -> anyhow::Result<()> {
    match command {
        #[cfg(feature = "gui")]
        Command::Gui => unreachable!("handled before the runtime starts"),
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };
            let role = session.login(&username, &password).await?;
            println!("Signed in as {role}.");
        }
        Command::Logout => {
            session.logout();
            println!("Signed out.");
        }
        Command::Whoami => match session.initialize().await {
            Some(role) => println!("{role}"),
            None => println!("Not signed in."),
        },
        Command::Register {
            username,
            password,
            email,
            role,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                role,
            };
            match session.register(&registration).await {
                Ok(()) => println!("{REGISTRATION_SUCCESS}"),
                Err(e) => anyhow::bail!(registration_failure_message(&e)),
            }
        }
        Command::Trainees => {
            let role = require_session(session).await?;
            ensure_allowed(role, Action::AssignProject)?;
            for trainee in session.api().list_trainees().await? {
                println!("{:>5}  {}", trainee.id, trainee.username);
            }
        }
        Command::Projects(command) => {
            let role = require_session(session).await?;
            run_project_command(session, role, command).await?;
        }
    }
    Ok(())
}

async fn require_session(session: &SessionStore) -> anyhow::Result<Role> {
    session
        .initialize()
        .await
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run `minitrack login` first."))
}

fn ensure_allowed(role: Role, action: Action) -> anyhow::Result<()> {
    if capability::allows(Some(role), action) {
        return Ok(());
    }
    let what = match action {
        Action::CreateProject => "create projects",
        Action::EditProject => "edit projects",
        Action::DeleteProject => "delete projects",
        Action::AssignProject => "list trainees",
        Action::UpdateStatus => "update project status",
        Action::ViewProjects => "view projects",
    };
    anyhow::bail!("Signed in as {role}; only trainers can {what}.")
}

impl ProjectCommand {
    fn action(&self) -> Action {
        match self {
            ProjectCommand::List { .. } | ProjectCommand::Show { .. } => Action::ViewProjects,
            ProjectCommand::Create { .. } => Action::CreateProject,
            ProjectCommand::Edit { .. } => Action::EditProject,
            ProjectCommand::Status { .. } => Action::UpdateStatus,
            ProjectCommand::Delete { .. } => Action::DeleteProject,
        }
    }
}

async fn run_project_command(
    session: &SessionStore,
    role: Role,
    command: ProjectCommand,
) -> anyhow::Result<()> {
    ensure_allowed(role, command.action())?;
    let api = session.api();
    let mut view = ProjectCollection::new(role);

    match command {
        ProjectCommand::List {
            status,
            priority,
            assigned_to,
        } => {
            view.update_filters(
                api,
                FilterChange {
                    status: Some(status),
                    priority: Some(priority),
                    assigned_to: Some(assigned_to),
                },
            )
            .await;
            if !view.filters().is_active() {
                view.fetch_projects(api).await;
            }
            print_collection(&view);
        }
        ProjectCommand::Show { id } => {
            let mut detail = ProjectDetail::new(id);
            detail.load(api).await;
            match detail.state() {
                DetailState::Loaded(project) => print_project(project),
                _ => anyhow::bail!("Project not found."),
            }
        }
        ProjectCommand::Create {
            title,
            description,
            assigned_to,
            priority,
            due_date,
        } => {
            let mut form = ProjectForm::create();
            form.apply(FieldChange::Title(title));
            form.apply(FieldChange::Description(description));
            form.apply(FieldChange::AssignedTo(Some(assigned_to)));
            form.apply(FieldChange::Priority(priority));
            form.apply(FieldChange::DueDate(due_date));
            view.open_create();
            view.submit(api, form.submit()?).await;
            report(&view)?;
        }
        ProjectCommand::Edit {
            id,
            title,
            description,
            assigned_to,
            priority,
            due_date,
        } => {
            let current = api.get_project(id).await?;
            let mut form = ProjectForm::edit(&current);
            let changes = [
                title.map(FieldChange::Title),
                description.map(FieldChange::Description),
                assigned_to.map(|a| FieldChange::AssignedTo(Some(a))),
                priority.map(FieldChange::Priority),
                due_date.map(FieldChange::DueDate),
            ];
            for change in changes.into_iter().flatten() {
                form.apply(change);
            }
            view.open_edit(id);
            view.submit(api, form.submit()?).await;
            report(&view)?;
        }
        ProjectCommand::Status { id, status } => {
            view.submit(api, minitrack::core::Mutation::SetStatus(id, status))
                .await;
            report(&view)?;
        }
        ProjectCommand::Delete { id, yes } => {
            view.request_delete(id);
            let confirmed =
                yes || confirm(&format!("Are you sure you want to delete project {id}? [y/N] "))?;
            if !confirmed {
                view.cancel_delete();
                println!("Cancelled.");
                return Ok(());
            }
            if let Some(mutation) = view.confirm_delete() {
                view.submit(api, mutation).await;
            }
            report(&view)?;
        }
    }
    Ok(())
}

fn report(view: &ProjectCollection) -> anyhow::Result<()> {
    match view.notice() {
        Some(notice) if notice.is_error() => anyhow::bail!(notice.message.clone()),
        Some(notice) => println!("{}", notice.message),
        None => {}
    }
    Ok(())
}

fn print_collection(view: &ProjectCollection) {
    if let Phase::Failed(message) = view.phase() {
        eprintln!("{message}");
        return;
    }
    let stats = view.stats();
    println!(
        "Total: {}  Completed: {}  In progress: {}  Pending: {}  Overdue: {}",
        stats.total, stats.completed, stats.in_progress, stats.pending, stats.overdue
    );
    if view.projects().is_empty() {
        println!("No projects found. {}", view.empty_hint());
        return;
    }
    let now = OffsetDateTime::now_utc();
    for project in view.projects() {
        let overdue = if project.is_overdue(now) { "  (Overdue)" } else { "" };
        println!(
            "{:>5}  {:<12} {:<7} {}  [{}; {}]{}",
            project.id,
            project.status.label(),
            project.priority.as_str(),
            project.title,
            project.assigned_to_name.as_deref().unwrap_or("unassigned"),
            display::relative_due(project, now),
            overdue,
        );
    }
}

fn print_project(project: &Project) {
    println!("{}", project.title);
    println!("Description: {}", project.description);
    println!(
        "Assigned To: {}",
        project.assigned_to_name.as_deref().unwrap_or("unassigned")
    );
    println!("Current Status: {}", project.status.as_str());
    println!("Priority: {}", project.priority.as_str());
    println!("Due Date: {}", minitrack::core::form::format_date(project.due_date));
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
