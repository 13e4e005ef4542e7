//! In-memory stand-in for the project tracker REST service.

use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use minitrack::core::model::{
    Priority, Project, ProjectId, ProjectPayload, ProjectStatus, Role, StatusChange, UserId,
};
use serde_json::{Value, json};
use time::macros::date;
use warp::{
    Filter, Reply,
    http::{Method, StatusCode},
    hyper::body::Bytes,
    path::FullPath,
    reply::Response,
};

pub const TRAINER: (&str, &str) = ("alice", "trainer-pass");
pub const TRAINEE: (&str, &str) = ("bob", "trainee-pass");
pub const OTHER_TRAINEE: (&str, &str) = ("carol", "trainee-pass");

/// How long the `slow/` endpoint stalls before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct BackendState {
    users: Vec<User>,
    tokens: HashMap<String, UserId>,
    projects: BTreeMap<ProjectId, Project>,
    next_project: ProjectId,
    issued_tokens: u64,
    requests: Vec<RecordedRequest>,
}

pub struct Backend {
    addr: SocketAddr,
    state: Arc<Mutex<BackendState>>,
}

impl Backend {
    /// Serve on an ephemeral port with one trainer and two trainees.
    pub fn start() -> Self {
        let state = Arc::new(Mutex::new(BackendState::seeded()));
        let shared = state.clone();
        let routes = warp::method()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::body::bytes())
            .then(
                move |method: Method,
                      path: FullPath,
                      authorization: Option<String>,
                      query: HashMap<String, String>,
                      body: Bytes| {
                    let state = shared.clone();
                    async move {
                        let path = path.as_str().trim_start_matches("/api/").to_string();
                        let request = RecordedRequest {
                            method,
                            path,
                            authorization,
                            query,
                        };
                        handle(state, request, body).await
                    }
                },
            );
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Requests matching `method` whose path starts with `prefix`.
    pub fn count(&self, method: Method, prefix: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn user_id(&self, username: &str) -> UserId {
        self.state()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .expect("unknown seeded user")
    }

    /// Insert a project directly, bypassing the API.
    pub fn seed_project(&self, title: &str, assignee: &str, status: ProjectStatus) -> ProjectId {
        let assigned_to = self.user_id(assignee);
        let mut state = self.state();
        let payload = ProjectPayload {
            title: title.to_string(),
            description: format!("{title} description"),
            assigned_to,
            priority: Priority::Medium,
            due_date: date!(2099 - 01 - 01),
        };
        let id = state.insert(payload);
        if let Some(project) = state.projects.get_mut(&id) {
            project.status = status;
        }
        id
    }

    /// Forget every issued token; the next authenticated call gets 401.
    pub fn revoke_tokens(&self) {
        self.state().tokens.clear();
    }
}

impl BackendState {
    fn seeded() -> Self {
        let users = [
            (1, TRAINER, Role::Trainer),
            (2, TRAINEE, Role::Trainee),
            (3, OTHER_TRAINEE, Role::Trainee),
        ]
        .into_iter()
        .map(|(id, (username, password), role)| User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            role,
        })
        .collect();
        Self {
            users,
            next_project: 1,
            ..Self::default()
        }
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.values().cloned().collect()
    }

    fn insert(&mut self, payload: ProjectPayload) -> ProjectId {
        let id = self.next_project;
        self.next_project += 1;
        let project = self.materialize(id, payload, ProjectStatus::Assigned);
        self.projects.insert(id, project);
        id
    }

    fn materialize(&self, id: ProjectId, payload: ProjectPayload, status: ProjectStatus) -> Project {
        let assigned_to_name = self
            .users
            .iter()
            .find(|u| u.id == payload.assigned_to)
            .map(|u| u.username.clone());
        Project {
            id,
            title: payload.title,
            description: payload.description,
            assigned_to: Some(payload.assigned_to),
            assigned_to_name,
            priority: payload.priority,
            status,
            due_date: payload.due_date,
        }
    }

    fn authenticate(&self, authorization: Option<&str>) -> Option<User> {
        let token = authorization?.strip_prefix("Token ")?;
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id).cloned()
    }

    fn visible(&self, user: &User, project: &Project) -> bool {
        user.role == Role::Trainer || project.assigned_to == Some(user.id)
    }

    fn respond(&mut self, request: &RecordedRequest, body: &[u8]) -> Response {
        let path = request.path.as_str();
        match (&request.method, path) {
            (&Method::POST, "auth/login/") => return self.login(body),
            (&Method::POST, "auth/register/") => return self.register(body),
            _ => {}
        }

        let Some(user) = self.authenticate(request.authorization.as_deref()) else {
            return reply(
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Invalid token."}),
            );
        };

        let project_id = path
            .strip_prefix("mini-projects/")
            .and_then(|rest| rest.strip_suffix('/'))
            .and_then(|id| id.parse::<ProjectId>().ok());

        match (&request.method, path, project_id) {
            (&Method::GET, "auth/user/", _) => reply(
                StatusCode::OK,
                json!({"id": user.id, "username": user.username, "role": user.role}),
            ),
            (&Method::GET, "auth/trainees/", _) => {
                if user.role != Role::Trainer {
                    return forbidden();
                }
                let trainees: Vec<Value> = self
                    .users
                    .iter()
                    .filter(|u| u.role == Role::Trainee)
                    .map(|u| json!({"id": u.id, "username": u.username}))
                    .collect();
                reply(StatusCode::OK, json!(trainees))
            }
            (&Method::GET, "mini-projects/", _) => {
                let q = &request.query;
                let projects: Vec<&Project> = self
                    .projects
                    .values()
                    .filter(|p| self.visible(&user, p))
                    .filter(|p| q.get("status").is_none_or(|s| p.status.as_str() == s))
                    .filter(|p| q.get("priority").is_none_or(|s| p.priority.as_str() == s))
                    .filter(|p| {
                        q.get("assignedTo")
                            .is_none_or(|s| p.assigned_to.map(|a| a.to_string()).as_ref() == Some(s))
                    })
                    .collect();
                reply(StatusCode::OK, json!(projects))
            }
            (&Method::POST, "mini-projects/", _) => {
                if user.role != Role::Trainer {
                    return forbidden();
                }
                match serde_json::from_slice::<ProjectPayload>(body) {
                    Ok(payload) => {
                        let id = self.insert(payload);
                        reply(StatusCode::CREATED, json!(self.projects[&id]))
                    }
                    Err(_) => reply(
                        StatusCode::BAD_REQUEST,
                        json!({"title": ["This field is required."]}),
                    ),
                }
            }
            (method, _, Some(id)) => {
                let Some(existing) = self.projects.get(&id).cloned() else {
                    return not_found();
                };
                if !self.visible(&user, &existing) {
                    return not_found();
                }
                match *method {
                    Method::GET => reply(StatusCode::OK, json!(existing)),
                    Method::PUT => {
                        if user.role != Role::Trainer {
                            return forbidden();
                        }
                        let Ok(payload) = serde_json::from_slice::<ProjectPayload>(body) else {
                            return reply(
                                StatusCode::BAD_REQUEST,
                                json!({"due_date": ["Date has wrong format."]}),
                            );
                        };
                        let project = self.materialize(id, payload, existing.status);
                        self.projects.insert(id, project.clone());
                        reply(StatusCode::OK, json!(project))
                    }
                    Method::PATCH => {
                        let Ok(change) = serde_json::from_slice::<StatusChange>(body) else {
                            return reply(
                                StatusCode::BAD_REQUEST,
                                json!({"status": ["Not a valid choice."]}),
                            );
                        };
                        let mut project = existing;
                        project.status = change.status;
                        self.projects.insert(id, project.clone());
                        reply(StatusCode::OK, json!(project))
                    }
                    Method::DELETE => {
                        if user.role != Role::Trainer {
                            return forbidden();
                        }
                        self.projects.remove(&id);
                        warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT)
                            .into_response()
                    }
                    _ => reply(
                        StatusCode::METHOD_NOT_ALLOWED,
                        json!({"detail": "Method not allowed."}),
                    ),
                }
            }
            _ => not_found(),
        }
    }

    fn login(&mut self, body: &[u8]) -> Response {
        let credentials: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let username = credentials["username"].as_str().unwrap_or_default();
        let password = credentials["password"].as_str().unwrap_or_default();
        let Some(user) = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
        else {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"non_field_errors": ["Unable to log in with provided credentials."]}),
            );
        };
        let user_id = user.id;
        self.issued_tokens += 1;
        let token = format!("token-{username}-{}", self.issued_tokens);
        self.tokens.insert(token.clone(), user_id);
        reply(StatusCode::OK, json!({"token": token}))
    }

    fn register(&mut self, body: &[u8]) -> Response {
        let form: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let username = form["username"].as_str().unwrap_or_default().to_string();
        let password = form["password"].as_str().unwrap_or_default().to_string();
        let role = match form["role"].as_str() {
            Some("trainer") => Role::Trainer,
            _ => Role::Trainee,
        };
        if username.is_empty() || self.users.iter().any(|u| u.username == username) {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"username": ["A user with that username already exists."]}),
            );
        }
        if password.len() < 8 {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"password": ["This password is too short."]}),
            );
        }
        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        self.users.push(User {
            id,
            username: username.clone(),
            password,
            role,
        });
        reply(StatusCode::CREATED, json!({"id": id, "username": username}))
    }
}

async fn handle(state: Arc<Mutex<BackendState>>, request: RecordedRequest, body: Bytes) -> Response {
    let slow = request.path == "slow/";
    let response = {
        let mut state = state.lock().expect("backend state poisoned");
        state.requests.push(request.clone());
        if slow {
            None
        } else {
            Some(state.respond(&request, &body))
        }
    };
    match response {
        Some(response) => response,
        None => {
            tokio::time::sleep(SLOW_DELAY).await;
            reply(StatusCode::OK, json!({}))
        }
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

fn forbidden() -> Response {
    reply(
        StatusCode::FORBIDDEN,
        json!({"detail": "You do not have permission to perform this action."}),
    )
}

fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
}
