//! HTML rendering for every view.
//!
//! All user-provided text passes through [`escape`] before it reaches markup.

use crate::identity::login_url;
use chrono::DateTime;
use learning_log_core::{
    BoundForm, Entry, EntryForm, LoginForm, Principal, RegisterForm, SearchForm, Topic, TopicForm,
    TopicView, ValidationErrors, NON_FIELD_ERRORS,
};
use std::fmt::Write;

/// Escapes text for use in element content and quoted attributes.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes text and turns blank-line separated blocks into paragraphs and
/// single newlines into `<br>`.
pub fn linebreaks(value: &str) -> String {
    let normalized = value.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("<p>{}</p>", escape(block).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats epoch milliseconds as e.g. `Oct 19, 2026 14:05` (UTC).
pub fn format_date(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|date| date.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

fn layout(title: &str, user: Option<&Principal>, body: &str) -> String {
    let account_links = match user {
        Some(principal) => format!(
            "<span>Hello, {}.</span>\n<form action=\"/users/logout/\" method=\"post\"><button type=\"submit\">Log out</button></form>",
            escape(&principal.username)
        ),
        None => "<a href=\"/users/register/\">Register</a> - <a href=\"/users/login/\">Log in</a>"
            .to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title} | Learning Log</title>\n</head>\n<body>\n<nav>\n<a href=\"/\">Learning Log</a> - <a href=\"/topics/\">Topics</a> - <a href=\"/search/\">Search</a>\n{account_links}\n</nav>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn field_errors(errors: &ValidationErrors, field: &str) -> String {
    let items = errors
        .for_field(field)
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect::<String>();
    if items.is_empty() {
        String::new()
    } else {
        format!("<ul class=\"errorlist\">{items}</ul>\n")
    }
}

fn text_input(errors: &ValidationErrors, name: &str, label: &str, value: &str) -> String {
    format!(
        "{}<p><label for=\"id_{name}\">{label}:</label> <input type=\"text\" name=\"{name}\" id=\"id_{name}\" value=\"{}\"></p>\n",
        field_errors(errors, name),
        escape(value),
    )
}

fn password_input(errors: &ValidationErrors, name: &str, label: &str) -> String {
    format!(
        "{}<p><label for=\"id_{name}\">{label}:</label> <input type=\"password\" name=\"{name}\" id=\"id_{name}\"></p>\n",
        field_errors(errors, name),
    )
}

fn textarea(errors: &ValidationErrors, name: &str, label: &str, value: &str) -> String {
    format!(
        "{}<p><label for=\"id_{name}\">{label}:</label><br><textarea name=\"{name}\" id=\"id_{name}\" cols=\"80\" rows=\"10\">{}</textarea></p>\n",
        field_errors(errors, name),
        escape(value),
    )
}

fn form(action: &str, fields: &str, errors: &ValidationErrors, submit: &str) -> String {
    format!(
        "<form action=\"{}\" method=\"post\">\n{}{fields}<button type=\"submit\">{submit}</button>\n</form>",
        escape(action),
        field_errors(errors, NON_FIELD_ERRORS),
    )
}

pub fn index(user: Option<&Principal>) -> String {
    layout(
        "Home",
        user,
        "<h1>Learning Log</h1>\n<p>Learning Log helps you keep track of your learning, for any topic you're learning about.</p>",
    )
}

pub fn topics(user: &Principal, topics: &[Topic]) -> String {
    let mut body = String::from("<h1>Topics</h1>\n<ul>\n");
    if topics.is_empty() {
        body.push_str("<li>No topics have been added yet.</li>\n");
    }
    for topic in topics {
        let _ = writeln!(
            body,
            "<li><a href=\"/topics/{}/\">{}</a></li>",
            topic.id,
            escape(&topic.text)
        );
    }
    body.push_str("</ul>\n<a href=\"/new_topic/\">Add a new topic</a>");
    layout("Topics", Some(user), &body)
}

pub fn topic(user: &Principal, view: &TopicView) -> String {
    let mut body = format!(
        "<h1>Topic: {}</h1>\n<p>Entries:</p>\n<p><a href=\"/new_entry/{}/\">Add new entry</a></p>\n<ul>\n",
        escape(&view.topic.text),
        view.topic.id
    );
    if view.entries.is_empty() {
        body.push_str("<li>There are no entries for this topic yet.</li>\n");
    }
    for entry in &view.entries {
        let _ = writeln!(
            body,
            "<li>\n<p>{}</p>\n{}\n<p><a href=\"/edit_entry/{}/\">Edit entry</a></p>\n</li>",
            format_date(entry.date_added),
            linebreaks(&entry.text),
            entry.id
        );
    }
    body.push_str("</ul>");
    layout(&view.topic.text, Some(user), &body)
}

pub fn new_topic(user: &Principal, bound: &BoundForm<TopicForm>) -> String {
    let fields = text_input(&bound.errors, "text", "Text", &bound.data.text);
    let body = format!(
        "<h1>Add a new topic:</h1>\n{}",
        form("/new_topic/", &fields, &bound.errors, "Add topic")
    );
    layout("New topic", Some(user), &body)
}

pub fn new_entry(user: &Principal, topic: &Topic, bound: &BoundForm<EntryForm>) -> String {
    let fields = textarea(&bound.errors, "text", "Entry", &bound.data.text);
    let body = format!(
        "<p><a href=\"/topics/{id}/\">{text}</a></p>\n<h1>Add a new entry:</h1>\n{form}",
        id = topic.id,
        text = escape(&topic.text),
        form = form(
            &format!("/new_entry/{}/", topic.id),
            &fields,
            &bound.errors,
            "Add entry"
        ),
    );
    layout("New entry", Some(user), &body)
}

pub fn edit_entry(
    user: &Principal,
    topic: &Topic,
    entry: &Entry,
    bound: &BoundForm<EntryForm>,
) -> String {
    let fields = textarea(&bound.errors, "text", "Entry", &bound.data.text);
    let body = format!(
        "<p><a href=\"/topics/{id}/\">{text}</a></p>\n<h1>Edit entry: {summary}</h1>\n{form}",
        id = topic.id,
        text = escape(&topic.text),
        summary = escape(&entry.summary()),
        form = form(
            &format!("/edit_entry/{}/", entry.id),
            &fields,
            &bound.errors,
            "Save changes"
        ),
    );
    layout("Edit entry", Some(user), &body)
}

pub fn search(user: Option<&Principal>, bound: &BoundForm<SearchForm>) -> String {
    let fields = text_input(&bound.errors, "query", "Query", &bound.data.query);
    let body = format!(
        "<h1>Search topics</h1>\n{}",
        form("/search/", &fields, &bound.errors, "Search")
    );
    layout("Search", user, &body)
}

/// Lists matches from every owner; only the caller's own topics are linked.
pub fn search_results(user: Option<&Principal>, query: &str, results: &[Topic]) -> String {
    let mut body = format!("<h1>Results for \u{201c}{}\u{201d}</h1>\n<ul>\n", escape(query));
    if results.is_empty() {
        body.push_str("<li>No topics matched your search.</li>\n");
    }
    for topic in results {
        let owned = user.is_some_and(|principal| topic.is_owned_by(principal));
        let label = if owned {
            format!("<a href=\"/topics/{}/\">{}</a>", topic.id, escape(&topic.text))
        } else {
            escape(&topic.text)
        };
        let _ = writeln!(body, "<li>{label} ({})</li>", format_date(topic.date_added));
    }
    body.push_str("</ul>\n<a href=\"/search/\">New search</a>");
    layout("Search results", user, &body)
}

pub fn login(bound: &BoundForm<LoginForm>, next: &str) -> String {
    let fields = format!(
        "{}{}",
        text_input(&bound.errors, "username", "Username", &bound.data.username),
        password_input(&bound.errors, "password", "Password"),
    );
    let body = format!(
        "<h1>Log in</h1>\n{}",
        form(&login_url(next), &fields, &bound.errors, "Log in")
    );
    layout("Log in", None, &body)
}

pub fn register(bound: &BoundForm<RegisterForm>) -> String {
    let fields = format!(
        "{}{}{}",
        text_input(&bound.errors, "username", "Username", &bound.data.username),
        password_input(&bound.errors, "password1", "Password"),
        password_input(&bound.errors, "password2", "Password confirmation"),
    );
    let body = format!(
        "<h1>Register</h1>\n{}",
        form("/users/register/", &fields, &bound.errors, "Register")
    );
    layout("Register", None, &body)
}

pub fn not_found() -> String {
    layout(
        "Not found",
        None,
        "<h1>Not Found</h1>\n<p>The requested page does not exist.</p>",
    )
}

pub fn server_error() -> String {
    layout(
        "Server error",
        None,
        "<h1>Server Error</h1>\n<p>Something went wrong. Please try again later.</p>",
    )
}
