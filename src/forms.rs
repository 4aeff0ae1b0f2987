//! HTML form definitions and validation.
//!
//! Each form describes its fields (for rendering) and cleans submitted
//! URL-encoded data into a typed input or a set of per-field errors.
//! Submitted data reuses [`QueryParams`] since form bodies are encoded the
//! same way as query strings.

use crate::query::QueryParams;
use crate::types::{
    NAME_MAX_LEN, Position, Priority, Status, Task, TaskInput, TaskType,
    USERNAME_MAX_LEN, Worker, WorkerInput,
};
use chrono::{NaiveDate, NaiveDateTime};
use regex_lite::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Submitted form data.
pub type FormData = QueryParams;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_DATETIME: &str = "Enter a valid date/time.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s.]+$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Accepted deadline input formats, tried in order.
const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn max_length_message(max: usize, len: usize) -> String {
    format!("Ensure this value has at most {max} characters (it has {len}).")
}

fn choice_message(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

/// Per-field validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// How a field is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Text,
    TextArea,
    Email,
    Password,
    Select,
    SelectMultiple,
    DateTimeLocal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: impl ToString, label: impl ToString) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Widget metadata for one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: WidgetKind,
    pub required: bool,
    pub max_length: Option<usize>,
    pub choices: Vec<Choice>,
}

impl FieldSpec {
    fn new(name: &'static str, label: &'static str, widget: WidgetKind) -> Self {
        Self {
            name,
            label,
            widget,
            required: false,
            max_length: None,
            choices: Vec::new(),
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }
}

// =============================================================================
// Field cleaners
// =============================================================================

fn clean_text(
    data: &FormData,
    errors: &mut FormErrors,
    field: &str,
    required: bool,
    max: Option<usize>,
) -> String {
    let value = data.get(field).unwrap_or("").trim().to_string();
    if value.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return value;
    }
    if let Some(max) = max {
        let len = value.chars().count();
        if len > max {
            errors.add(field, max_length_message(max, len));
        }
    }
    value
}

fn clean_choice<T: std::str::FromStr>(
    data: &FormData,
    errors: &mut FormErrors,
    field: &str,
) -> Option<T> {
    let Some(raw) = data.get_nonempty(field) else {
        errors.add(field, REQUIRED);
        return None;
    };
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, choice_message(raw));
            None
        }
    }
}

/// Optional foreign key: blank means none, anything else must be a known id.
fn clean_model_choice(
    data: &FormData,
    errors: &mut FormErrors,
    field: &str,
    known: &[i64],
) -> Option<i64> {
    let raw = data.get_nonempty(field)?;
    match raw.parse::<i64>() {
        Ok(id) if known.contains(&id) => Some(id),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

fn clean_model_multiple(
    data: &FormData,
    errors: &mut FormErrors,
    field: &str,
    known: &[i64],
) -> Vec<i64> {
    let mut ids = Vec::new();
    for raw in data.get_all(field) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        match raw.parse::<i64>() {
            Ok(id) if known.contains(&id) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            _ => errors.add(field, choice_message(raw)),
        }
    }
    ids
}

/// Parse a deadline from any accepted input format.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn clean_datetime(data: &FormData, errors: &mut FormErrors, field: &str) -> Option<NaiveDateTime> {
    let raw = data.get_nonempty(field)?;
    let parsed = parse_datetime(raw);
    if parsed.is_none() {
        errors.add(field, INVALID_DATETIME);
    }
    parsed
}

fn clean_email(data: &FormData, errors: &mut FormErrors, field: &str) -> String {
    let value = clean_text(data, errors, field, false, Some(254));
    if !value.is_empty() && !is_valid_email(&value) {
        errors.add(field, INVALID_EMAIL);
    }
    value
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn clean_username(data: &FormData, errors: &mut FormErrors) -> String {
    let username = clean_text(data, errors, "username", true, Some(USERNAME_MAX_LEN));
    if !username.is_empty() && !is_valid_username(&username) {
        errors.add("username", INVALID_USERNAME);
    }
    username
}

// =============================================================================
// Forms
// =============================================================================

/// Cleaned name/description pair shared by the task type and position forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedInput {
    pub name: String,
    pub description: String,
}

/// Form for the two name/description catalogs.
pub struct NamedForm;

impl NamedForm {
    pub fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("name", "Name", WidgetKind::Text)
                .required()
                .max_length(NAME_MAX_LEN),
            FieldSpec::new("description", "Description", WidgetKind::TextArea),
        ]
    }

    pub fn clean(data: &FormData) -> Result<NamedInput, FormErrors> {
        let mut errors = FormErrors::default();
        let name = clean_text(data, &mut errors, "name", true, Some(NAME_MAX_LEN));
        let description = clean_text(data, &mut errors, "description", false, None);
        errors.finish(NamedInput { name, description })
    }

    pub fn initial(name: &str, description: &str) -> FormData {
        QueryParams::from_pairs(vec![
            ("name".into(), name.into()),
            ("description".into(), description.into()),
        ])
    }
}

pub type TaskTypeForm = NamedForm;
pub type PositionForm = NamedForm;

impl From<&TaskType> for FormData {
    fn from(task_type: &TaskType) -> Self {
        NamedForm::initial(&task_type.name, &task_type.description)
    }
}

impl From<&Position> for FormData {
    fn from(position: &Position) -> Self {
        NamedForm::initial(&position.name, &position.description)
    }
}

/// Create/update form for tasks. Holds the current task types and workers
/// so that select widgets and foreign-key checks agree.
pub struct TaskForm {
    task_types: Vec<(i64, String)>,
    workers: Vec<(i64, String)>,
}

impl TaskForm {
    pub fn new(task_types: &[TaskType], workers: &[Worker]) -> Self {
        Self {
            task_types: task_types.iter().map(|t| (t.id, t.name.clone())).collect(),
            workers: workers.iter().map(|w| (w.id, w.username.clone())).collect(),
        }
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        let mut task_type_choices = vec![Choice::new("", "---------")];
        task_type_choices.extend(self.task_types.iter().map(|(id, name)| Choice::new(id, name)));

        vec![
            FieldSpec::new("name", "Name", WidgetKind::Text)
                .required()
                .max_length(NAME_MAX_LEN),
            FieldSpec::new("task_type", "Task type", WidgetKind::Select).choices(task_type_choices),
            FieldSpec::new("priority", "Priority", WidgetKind::Select)
                .required()
                .choices(Priority::ALL.iter().map(|p| Choice::new(p.as_str(), p.label())).collect()),
            FieldSpec::new("deadline", "Deadline", WidgetKind::DateTimeLocal),
            FieldSpec::new("description", "Description", WidgetKind::TextArea).required(),
            FieldSpec::new("assignee", "Assignee", WidgetKind::SelectMultiple).choices(
                self.workers
                    .iter()
                    .map(|(id, username)| Choice::new(id, username))
                    .collect(),
            ),
            FieldSpec::new("status", "Status", WidgetKind::Select)
                .required()
                .choices(Status::ALL.iter().map(|s| Choice::new(s.as_str(), s.label())).collect()),
        ]
    }

    pub fn clean(&self, data: &FormData) -> Result<TaskInput, FormErrors> {
        let mut errors = FormErrors::default();
        let type_ids: Vec<i64> = self.task_types.iter().map(|(id, _)| *id).collect();
        let worker_ids: Vec<i64> = self.workers.iter().map(|(id, _)| *id).collect();

        let name = clean_text(data, &mut errors, "name", true, Some(NAME_MAX_LEN));
        let task_type_id = clean_model_choice(data, &mut errors, "task_type", &type_ids);
        let priority = clean_choice::<Priority>(data, &mut errors, "priority");
        let deadline = clean_datetime(data, &mut errors, "deadline");
        let description = clean_text(data, &mut errors, "description", true, None);
        let assignee_ids = clean_model_multiple(data, &mut errors, "assignee", &worker_ids);
        let status = clean_choice::<Status>(data, &mut errors, "status");

        errors.finish(TaskInput {
            name,
            description,
            deadline,
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
            task_type_id,
            assignee_ids,
        })
    }

    /// Values for a blank create form.
    pub fn blank() -> FormData {
        QueryParams::from_pairs(vec![
            ("priority".into(), Priority::default().as_str().into()),
            ("status".into(), Status::default().as_str().into()),
        ])
    }
}

impl From<&Task> for FormData {
    fn from(task: &Task) -> Self {
        let mut pairs = vec![
            ("name".to_string(), task.name.clone()),
            (
                "task_type".to_string(),
                task.task_type_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("priority".to_string(), task.priority.as_str().to_string()),
            (
                "deadline".to_string(),
                task.deadline
                    .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                    .unwrap_or_default(),
            ),
            ("description".to_string(), task.description.clone()),
            ("status".to_string(), task.status.as_str().to_string()),
        ];
        pairs.extend(
            task.assignees
                .iter()
                .map(|a| ("assignee".to_string(), a.id.to_string())),
        );
        QueryParams::from_pairs(pairs)
    }
}

fn position_choices(positions: &[Position]) -> Vec<Choice> {
    let mut choices = vec![Choice::new("", "---------")];
    choices.extend(positions.iter().map(|p| Choice::new(p.id, &p.name)));
    choices
}

fn profile_fields(positions: &[Position]) -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("first_name", "First name", WidgetKind::Text).max_length(USERNAME_MAX_LEN),
        FieldSpec::new("last_name", "Last name", WidgetKind::Text).max_length(USERNAME_MAX_LEN),
        FieldSpec::new("email", "Email address", WidgetKind::Email),
        FieldSpec::new("position", "Position", WidgetKind::Select).choices(position_choices(positions)),
    ]
}

fn username_field() -> FieldSpec {
    FieldSpec::new("username", "Username", WidgetKind::Text)
        .required()
        .max_length(USERNAME_MAX_LEN)
}

/// Clean the profile half of a worker form. `username_taken` reports whether
/// another account already holds a username.
fn clean_worker_input<E>(
    data: &FormData,
    errors: &mut FormErrors,
    position_ids: &[i64],
    username_taken: impl FnOnce(&str) -> Result<bool, E>,
) -> Result<WorkerInput, E> {
    let username = clean_username(data, errors);
    if !errors.contains("username") && username_taken(&username)? {
        errors.add("username", USERNAME_TAKEN);
    }
    let first_name = clean_text(data, errors, "first_name", false, Some(USERNAME_MAX_LEN));
    let last_name = clean_text(data, errors, "last_name", false, Some(USERNAME_MAX_LEN));
    let email = clean_email(data, errors, "email");
    let position_id = clean_model_choice(data, errors, "position", position_ids);
    Ok(WorkerInput {
        username,
        first_name,
        last_name,
        email,
        position_id,
    })
}

/// Account creation: profile plus a confirmed password.
pub struct WorkerCreationForm {
    positions: Vec<Position>,
}

/// Output of [`WorkerCreationForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorker {
    pub input: WorkerInput,
    pub password: String,
}

impl WorkerCreationForm {
    pub fn new(positions: &[Position]) -> Self {
        Self {
            positions: positions.to_vec(),
        }
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![
            username_field(),
            FieldSpec::new("password1", "Password", WidgetKind::Password).required(),
            FieldSpec::new("password2", "Password confirmation", WidgetKind::Password).required(),
        ];
        fields.extend(profile_fields(&self.positions));
        fields
    }

    pub fn clean<E>(
        &self,
        data: &FormData,
        username_taken: impl FnOnce(&str) -> Result<bool, E>,
    ) -> Result<Result<NewWorker, FormErrors>, E> {
        let mut errors = FormErrors::default();
        let ids: Vec<i64> = self.positions.iter().map(|p| p.id).collect();
        let input = clean_worker_input(data, &mut errors, &ids, username_taken)?;

        // Passwords are taken verbatim.
        let password1 = data.get("password1").unwrap_or("");
        let password2 = data.get("password2").unwrap_or("");
        if password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !password1.is_empty() && password1 != password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        Ok(errors.finish(NewWorker {
            input,
            password: password1.to_string(),
        }))
    }
}

/// Profile editing for an existing worker.
pub struct WorkerForm {
    positions: Vec<Position>,
}

impl WorkerForm {
    pub fn new(positions: &[Position]) -> Self {
        Self {
            positions: positions.to_vec(),
        }
    }

    pub fn fields(&self) -> Vec<FieldSpec> {
        let mut fields = vec![username_field()];
        fields.extend(profile_fields(&self.positions));
        fields
    }

    pub fn clean<E>(
        &self,
        data: &FormData,
        username_taken: impl FnOnce(&str) -> Result<bool, E>,
    ) -> Result<Result<WorkerInput, FormErrors>, E> {
        let mut errors = FormErrors::default();
        let ids: Vec<i64> = self.positions.iter().map(|p| p.id).collect();
        let input = clean_worker_input(data, &mut errors, &ids, username_taken)?;
        Ok(errors.finish(input))
    }
}

impl From<&Worker> for FormData {
    fn from(worker: &Worker) -> Self {
        QueryParams::from_pairs(vec![
            ("username".into(), worker.username.clone()),
            ("first_name".into(), worker.first_name.clone()),
            ("last_name".into(), worker.last_name.clone()),
            ("email".into(), worker.email.clone()),
            (
                "position".into(),
                worker.position_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ])
    }
}

pub struct CommentForm;

impl CommentForm {
    pub fn fields() -> Vec<FieldSpec> {
        vec![FieldSpec::new("content", "Content", WidgetKind::TextArea).required()]
    }

    pub fn clean(data: &FormData) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let content = clean_text(data, &mut errors, "content", true, None);
        errors.finish(content)
    }
}

/// The free-text search box on list pages.
pub struct SearchForm;

impl SearchForm {
    pub fn field(placeholder: &'static str) -> FieldSpec {
        FieldSpec::new("q", placeholder, WidgetKind::Text).max_length(255)
    }

    /// The search term; blank searches are valid and mean "no filter".
    pub fn clean(data: &QueryParams) -> String {
        data.get("q").unwrap_or("").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        QueryParams::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn free(_: &str) -> Result<bool, Infallible> {
        Ok(false)
    }

    fn taken(_: &str) -> Result<bool, Infallible> {
        Ok(true)
    }

    fn task_type(id: i64, name: &str) -> TaskType {
        TaskType {
            id,
            name: name.into(),
            description: String::new(),
        }
    }

    fn worker(id: i64, username: &str) -> Worker {
        Worker {
            id,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position_id: None,
            position_name: None,
            date_joined: 0,
        }
    }

    #[test]
    fn named_form_requires_name() {
        let errors = NamedForm::clean(&data(&[("description", "x")])).unwrap_err();
        assert_eq!(errors.get("name"), [REQUIRED]);
    }

    #[test]
    fn named_form_enforces_max_length() {
        let long = "a".repeat(156);
        let errors = NamedForm::clean(&data(&[("name", long.as_str())])).unwrap_err();
        assert_eq!(
            errors.get("name"),
            ["Ensure this value has at most 155 characters (it has 156)."]
        );
        assert!(NamedForm::clean(&data(&[("name", "a".repeat(155).as_str())])).is_ok());
    }

    #[test]
    fn task_form_accepts_assignees() {
        let form = TaskForm::new(&[task_type(1, "Bug")], &[worker(1, "w1"), worker(2, "w2")]);
        let input = form
            .clean(&data(&[
                ("name", "New Task"),
                ("description", "Desc"),
                ("priority", "high"),
                ("status", "pending"),
                ("task_type", "1"),
                ("assignee", "1"),
                ("assignee", "2"),
            ]))
            .unwrap();
        assert_eq!(input.assignee_ids, vec![1, 2]);
        assert_eq!(input.task_type_id, Some(1));
        assert_eq!(input.priority, Priority::High);
        assert_eq!(input.deadline, None);
    }

    #[test]
    fn task_form_rejects_unknown_choices() {
        let form = TaskForm::new(&[task_type(1, "Bug")], &[worker(1, "w1")]);
        let errors = form
            .clean(&data(&[
                ("name", "T"),
                ("description", "D"),
                ("priority", "urgent"),
                ("status", "done"),
                ("task_type", "9"),
                ("assignee", "7"),
            ]))
            .unwrap_err();
        assert_eq!(
            errors.get("priority"),
            ["Select a valid choice. urgent is not one of the available choices."]
        );
        assert!(errors.contains("status"));
        assert_eq!(errors.get("task_type"), [INVALID_CHOICE]);
        assert!(errors.contains("assignee"));
    }

    #[test]
    fn task_form_requires_description_priority_and_status() {
        let form = TaskForm::new(&[], &[]);
        let errors = form.clean(&data(&[("name", "T")])).unwrap_err();
        assert_eq!(errors.get("description"), [REQUIRED]);
        assert_eq!(errors.get("priority"), [REQUIRED]);
        assert_eq!(errors.get("status"), [REQUIRED]);
        assert!(!errors.contains("task_type"));
        assert!(!errors.contains("assignee"));
    }

    #[test]
    fn deadline_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2026-03-01T09:30"), Some(expected));
        assert_eq!(parse_datetime("2026-03-01 09:30:00"), Some(expected));
        assert_eq!(
            parse_datetime("2026-03-01"),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_datetime("tomorrow"), None);

        let form = TaskForm::new(&[], &[]);
        let errors = form
            .clean(&data(&[
                ("name", "T"),
                ("description", "D"),
                ("priority", "low"),
                ("status", "pending"),
                ("deadline", "31/12/2026"),
            ]))
            .unwrap_err();
        assert_eq!(errors.get("deadline"), [INVALID_DATETIME]);
    }

    #[test]
    fn worker_creation_password_mismatch() {
        let form = WorkerCreationForm::new(&[]);
        let errors = form
            .clean(
                &data(&[
                    ("username", "new_user"),
                    ("password1", "pass123"),
                    ("password2", "different_pass"),
                ]),
                free,
            )
            .unwrap()
            .unwrap_err();
        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH]);
        assert!(!errors.contains("username"));
    }

    #[test]
    fn worker_creation_rejects_taken_username() {
        let form = WorkerCreationForm::new(&[]);
        let errors = form
            .clean(
                &data(&[
                    ("username", "existing_user"),
                    ("password1", "pass123"),
                    ("password2", "pass123"),
                ]),
                taken,
            )
            .unwrap()
            .unwrap_err();
        assert_eq!(errors.get("username"), [USERNAME_TAKEN]);
    }

    #[test]
    fn worker_creation_success() {
        let position = Position {
            id: 4,
            name: "Developer".into(),
            description: String::new(),
        };
        let form = WorkerCreationForm::new(&[position]);
        let worker = form
            .clean(
                &data(&[
                    ("username", "jane.doe"),
                    ("password1", "pw"),
                    ("password2", "pw"),
                    ("email", "jane@example.com"),
                    ("position", "4"),
                ]),
                free,
            )
            .unwrap()
            .unwrap();
        assert_eq!(worker.input.username, "jane.doe");
        assert_eq!(worker.input.position_id, Some(4));
        assert_eq!(worker.password, "pw");
    }

    #[test]
    fn worker_form_validates_username_and_email() {
        let form = WorkerForm::new(&[]);
        let errors = form
            .clean(&data(&[("username", "bad name!"), ("email", "nope")]), free)
            .unwrap()
            .unwrap_err();
        assert_eq!(errors.get("username"), [INVALID_USERNAME]);
        assert_eq!(errors.get("email"), [INVALID_EMAIL]);
    }

    #[test]
    fn email_pattern_compiles_once_and_matches() {
        assert!(EMAIL_RE.is_some());
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("ann.lee+tasks@mail.example.org"));
        assert!(!is_valid_email("ann@example"));
        assert!(!is_valid_email("ann @example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn username_checker_errors_propagate() {
        let form = WorkerForm::new(&[]);
        let result = form.clean(&data(&[("username", "x")]), |_| Err("db down"));
        assert_eq!(result, Err("db down"));
    }

    #[test]
    fn search_form_allows_empty_query() {
        assert_eq!(SearchForm::clean(&data(&[("q", "")])), "");
        assert_eq!(SearchForm::clean(&data(&[("q", "  dev ")])), "dev");
    }

    #[test]
    fn comment_form_requires_content() {
        assert_eq!(CommentForm::clean(&data(&[("content", "  ")])).unwrap_err().get("content"), [REQUIRED]);
        assert_eq!(CommentForm::clean(&data(&[("content", "ok")])).unwrap(), "ok");
    }

    #[test]
    fn task_initial_values_round_into_the_form() {
        let form = TaskForm::new(&[task_type(2, "Bug")], &[worker(3, "w3")]);
        let task = Task {
            id: 1,
            name: "Fix".into(),
            description: "D".into(),
            deadline: parse_datetime("2026-05-01T10:00"),
            status: Status::Paused,
            priority: Priority::Medium,
            task_type_id: Some(2),
            task_type_name: Some("Bug".into()),
            assignees: vec![crate::types::Assignee {
                id: 3,
                username: "w3".into(),
                first_name: String::new(),
                last_name: String::new(),
            }],
            created_at: 0,
            updated_at: 0,
        };
        let input = form.clean(&FormData::from(&task)).unwrap();
        assert_eq!(input.deadline, task.deadline);
        assert_eq!(input.assignee_ids, vec![3]);
        assert_eq!(input.status, Status::Paused);
    }
}
