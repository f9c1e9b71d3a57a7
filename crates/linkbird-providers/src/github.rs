//! GitHub users, repositories, issues, pull requests and gists.
//!
//! ```text
//! github.com/<user>                      -> Jay Vana (@jsvana) at Facebook - Bio
//! github.com/<user>/<repo>               -> jsvana/alfred [PHP] (forked from belak/alfred) Last pushed to 2 Jan 2015 - ..., 1 fork
//! github.com/<user>/<repo>/issues/<n>    -> Issue #42 on belak/go-seabird [open] (assigned to jsvana) - ... [created 2 Jan 2015]
//! github.com/<user>/<repo>/pull/<n>      -> Pull request #59 on belak/go-seabird [open] created by jsvana - ..., 1 commit
//! gist.github.com/<user>/<id>            -> Created 3 Jan 2015 by belak - ..., 3 comments
//! ```
//!
//! Every lookup goes through the REST API with the configured token.

use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use linkbird_core::MessageEvent;
use linkbird_framework::{
    BoxFuture, BoxedUrlHandler, Engine, FetchResult, FoundUrl, Outcome, Provider, UrlHandler,
    send_json,
};

use crate::format::{count, pluralize, prettify_suffix, short_date};

const PREFIX: &str = "[Github]";

/// Host for users, repositories, issues and pull requests.
pub const HOST: &str = "github.com";

/// Host for gists.
pub const GIST_HOST: &str = "gist.github.com";

/// Public API base used in production.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("github pattern is a valid regex")
}

static USER_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/([^/]+)$"));
static REPO_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/([^/]+)/([^/]+)$"));
static ISSUE_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/([^/]+)/([^/]+)/issues/(\d+)$"));
static PULL_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/([^/]+)/([^/]+)/pull/(\d+)$"));
static GIST_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/[^/]+/([^/]+)$"));

// =============================================================================
// Path classification
// =============================================================================

/// What a github.com path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link<'a> {
    User(&'a str),
    Repo(&'a str, &'a str),
    Issue(&'a str, &'a str, u64),
    Pull(&'a str, &'a str, u64),
}

fn classify(path: &str) -> Option<Link<'_>> {
    let numbered = |re: &Regex| {
        let c = re.captures(path)?;
        let number = c.get(3)?.as_str().parse::<u64>().ok()?;
        Some((c.get(1)?.as_str(), c.get(2)?.as_str(), number))
    };

    if let Some(c) = USER_PATH.captures(path) {
        Some(Link::User(c.get(1)?.as_str()))
    } else if let Some(c) = REPO_PATH.captures(path) {
        Some(Link::Repo(c.get(1)?.as_str(), c.get(2)?.as_str()))
    } else if let Some((owner, repo, n)) = numbered(&ISSUE_PATH) {
        Some(Link::Issue(owner, repo, n))
    } else {
        numbered(&PULL_PATH).map(|(owner, repo, n)| Link::Pull(owner, repo, n))
    }
}

// =============================================================================
// API payloads
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Account {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    login: String,
    name: Option<String>,
    company: Option<String>,
    bio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Parent {
    full_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Repo {
    full_name: String,
    language: Option<String>,
    fork: bool,
    parent: Option<Parent>,
    pushed_at: Option<String>,
    description: Option<String>,
    forks_count: u64,
    open_issues_count: u64,
    stargazers_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Issue {
    number: u64,
    state: String,
    title: Option<String>,
    assignee: Option<Account>,
    created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Pull {
    number: u64,
    state: String,
    title: Option<String>,
    user: Option<Account>,
    created_at: Option<String>,
    commits: u64,
    comments: u64,
    changed_files: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Gist {
    description: Option<String>,
    owner: Option<Account>,
    created_at: Option<String>,
    comments: u64,
}

/// Treats a missing and an empty field alike.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn login(account: &Option<Account>) -> Option<&str> {
    account
        .as_ref()
        .map(|a| a.login.as_str())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Reply lines
// =============================================================================

fn user_line(user: &User) -> Option<String> {
    let mut line = match (present(&user.name), user.login.as_str()) {
        (Some(name), "") => name.to_string(),
        (Some(name), login) => format!("{name} (@{login})"),
        (None, "") => return None,
        (None, login) => format!("@{login}"),
    };
    if let Some(company) = present(&user.company) {
        line.push_str(&format!(" at {company}"));
    }
    if let Some(bio) = present(&user.bio) {
        line.push_str(&format!(" - {bio}"));
    }
    Some(line)
}

fn repo_line(repo: &Repo) -> Option<String> {
    if repo.full_name.is_empty() {
        return None;
    }

    let mut line = repo.full_name.clone();
    if let Some(language) = present(&repo.language) {
        line.push_str(&format!(" [{language}]"));
    }
    if let Some(parent) = repo.parent.as_ref().filter(|_| repo.fork) {
        line.push_str(&format!(" (forked from {})", parent.full_name));
    }
    if let Some(pushed) = present(&repo.pushed_at).and_then(short_date) {
        line.push_str(&format!(" Last pushed to {pushed}"));
    }
    if let Some(description) = present(&repo.description) {
        line.push_str(&format!(" - {description}"));
    }
    for (n, word) in [
        (repo.forks_count, "fork"),
        (repo.open_issues_count, "open issue"),
        (repo.stargazers_count, "star"),
    ] {
        if n > 0 {
            line.push_str(&format!(", {} {}", prettify_suffix(n), pluralize(n, word)));
        }
    }
    Some(line)
}

fn issue_line(owner: &str, repo: &str, issue: &Issue) -> String {
    let mut line = format!("Issue #{} on {owner}/{repo} [{}]", issue.number, issue.state);
    if let Some(assignee) = login(&issue.assignee) {
        line.push_str(&format!(" (assigned to {assignee})"));
    }
    if let Some(title) = present(&issue.title) {
        line.push_str(&format!(" - {title}"));
    }
    if let Some(created) = present(&issue.created_at).and_then(short_date) {
        line.push_str(&format!(" [created {created}]"));
    }
    line
}

fn pull_line(owner: &str, repo: &str, pull: &Pull) -> String {
    let mut line = format!("Pull request #{} on {owner}/{repo} [{}]", pull.number, pull.state);
    if let Some(author) = login(&pull.user) {
        line.push_str(&format!(" created by {author}"));
    }
    if let Some(title) = present(&pull.title) {
        line.push_str(&format!(" - {title}"));
    }
    if let Some(created) = present(&pull.created_at).and_then(short_date) {
        line.push_str(&format!(" [created {created}]"));
    }
    for (n, word) in [
        (pull.commits, "commit"),
        (pull.comments, "comment"),
        (pull.changed_files, "changed file"),
    ] {
        if n > 0 {
            line.push_str(&format!(", {}", count(n, word)));
        }
    }
    line
}

fn gist_line(id: &str, gist: &Gist) -> String {
    let mut line = match present(&gist.created_at).and_then(short_date) {
        Some(created) => format!("Created {created}"),
        None => format!("Gist {id}"),
    };
    if let Some(owner) = login(&gist.owner) {
        line.push_str(&format!(" by {owner}"));
    }
    if let Some(description) = present(&gist.description) {
        line.push_str(&format!(" - {description}"));
    }
    if gist.comments > 0 {
        line.push_str(&format!(", {}", count(gist.comments, "comment")));
    }
    line
}

// =============================================================================
// API client
// =============================================================================

struct GithubApi {
    base: String,
    token: String,
}

impl GithubApi {
    async fn get<T: DeserializeOwned>(&self, engine: &Engine, endpoint: &str) -> FetchResult<T> {
        let request = engine
            .http()
            .get(format!("{}{endpoint}", self.base))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json");
        send_json(request).await
    }

    /// Fetches `endpoint` and renders it, logging why nothing came back.
    async fn lookup<T, F>(&self, engine: &Engine, endpoint: &str, render: F) -> Option<String>
    where
        T: DeserializeOwned,
        F: FnOnce(T) -> Option<String>,
    {
        match self.get(engine, endpoint).await {
            Ok(payload) => render(payload),
            Err(e) => {
                debug!(endpoint, error = %e, "GitHub lookup failed");
                None
            }
        }
    }

    async fn github_line(&self, engine: &Engine, path: &str) -> Option<String> {
        match classify(path)? {
            Link::User(user) => {
                let endpoint = format!("/users/{user}");
                self.lookup(engine, &endpoint, |user: User| user_line(&user)).await
            }
            Link::Repo(owner, repo) => {
                let endpoint = format!("/repos/{owner}/{repo}");
                self.lookup(engine, &endpoint, |repo: Repo| repo_line(&repo)).await
            }
            Link::Issue(owner, repo, number) => {
                let endpoint = format!("/repos/{owner}/{repo}/issues/{number}");
                self.lookup(engine, &endpoint, |issue: Issue| {
                    Some(issue_line(owner, repo, &issue))
                })
                .await
            }
            Link::Pull(owner, repo, number) => {
                let endpoint = format!("/repos/{owner}/{repo}/pulls/{number}");
                self.lookup(engine, &endpoint, |pull: Pull| {
                    Some(pull_line(owner, repo, &pull))
                })
                .await
            }
        }
    }

    async fn gist_line(&self, engine: &Engine, path: &str) -> Option<String> {
        let id = GIST_PATH.captures(path)?.get(1)?.as_str();
        let endpoint = format!("/gists/{id}");
        self.lookup(engine, &endpoint, |gist: Gist| Some(gist_line(id, &gist)))
            .await
    }

    async fn reply(&self, engine: &Engine, event: &MessageEvent, line: Option<String>) -> Outcome {
        let Some(line) = line else {
            return Outcome::NotClaimed;
        };
        if let Err(e) = engine.reply(&event.source, format!("{PREFIX} {line}")).await {
            warn!(error = %e, "Failed to send GitHub reply");
        }
        Outcome::Claimed
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Provider for `github.com` and `gist.github.com` links.
#[derive(Clone)]
pub struct GithubProvider {
    api: Arc<GithubApi>,
}

impl GithubProvider {
    /// Creates the provider against [`DEFAULT_GITHUB_API`].
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, DEFAULT_GITHUB_API)
    }

    /// Creates the provider against another API base.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        let base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api: Arc::new(GithubApi {
                base,
                token: token.into(),
            }),
        }
    }
}

impl Provider for GithubProvider {
    fn name(&self) -> &str {
        "github"
    }

    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        vec![
            (HOST.to_string(), Arc::new(GithubLinks(Arc::clone(&self.api)))),
            (GIST_HOST.to_string(), Arc::new(GistLinks(Arc::clone(&self.api)))),
        ]
    }
}

struct GithubLinks(Arc<GithubApi>);

impl UrlHandler for GithubLinks {
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        async move {
            let line = self.0.github_line(engine, url.path()).await;
            self.0.reply(engine, event, line).await
        }
        .boxed()
    }
}

struct GistLinks(Arc<GithubApi>);

impl UrlHandler for GistLinks {
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        async move {
            let line = self.0.gist_line(engine, url.path()).await;
            self.0.reply(engine, event, line).await
        }
        .boxed()
    }
}
