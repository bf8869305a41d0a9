//! In-memory store implementing every repository trait, used by service tests.
//!
//! Reads reproduce the row shapes and orderings of the PostgreSQL queries so
//! the same folds run on top of them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::feed_repository::FeedRepository;
use crate::data::post_repository::{NewPost, PostRepository};
use crate::data::reaction_repository::ReactionRepository;
use crate::data::session_repository::SessionRepository;
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::detail::{CommentDetail, DetailRow};
use crate::domain::error::DomainError;
use crate::domain::feed::{CommentPreview, FeedFilter, FeedRow, PostSummary};
use crate::domain::reaction::{
    ReactionChange, ReactionCounts, ReactionTarget, ReactionValue, TargetKind,
};
use crate::domain::session::Session;
use crate::domain::user::User;

type ReactionKey = (i64, TargetKind, i64);

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    author_id: i64,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    category_ids: Vec<i64>,
}

#[derive(Debug)]
struct State {
    next_id: i64,
    now: DateTime<Utc>,
    users: Vec<StoredUser>,
    sessions: HashMap<String, Session>,
    categories: Vec<Category>,
    posts: Vec<StoredPost>,
    comments: Vec<Comment>,
    reactions: HashMap<ReactionKey, ReactionValue>,
    concurrent_insert: Option<(ReactionKey, ReactionValue)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Creation timestamp for a new row; the clock then moves one second on.
    fn stamp(&mut self) -> DateTime<Utc> {
        let stamp = self.now;
        self.now += Duration::seconds(1);
        stamp
    }

    fn user_name(&self, user_id: i64) -> Result<String, DomainError> {
        self.users
            .iter()
            .find(|stored| stored.user.id == user_id)
            .map(|stored| stored.user.username.clone())
            .ok_or_else(|| DomainError::Unexpected(format!("dangling user id: {user_id}")))
    }

    fn target_exists(&self, target: ReactionTarget) -> bool {
        match target.kind {
            TargetKind::Post => self.posts.iter().any(|post| post.id == target.id),
            TargetKind::Comment => self.comments.iter().any(|c| c.id == target.id),
        }
    }

    fn counts(&self, target: ReactionTarget) -> ReactionCounts {
        let mut counts = ReactionCounts::default();
        for ((_, kind, id), value) in &self.reactions {
            if *kind != target.kind || *id != target.id {
                continue;
            }
            match value {
                ReactionValue::Like => counts.likes += 1,
                ReactionValue::Dislike => counts.dislikes += 1,
            }
        }
        counts
    }

    fn summary(&self, post: &StoredPost) -> Result<PostSummary, DomainError> {
        let mut names: Vec<&str> = self
            .categories
            .iter()
            .filter(|category| post.category_ids.contains(&category.id))
            .map(|category| category.name.as_str())
            .collect();
        names.sort_unstable();

        Ok(PostSummary {
            id: post.id,
            author_id: post.author_id,
            author_name: self.user_name(post.author_id)?,
            title: post.title.clone(),
            body: post.body.clone(),
            category_names: names.join(", "),
            created_at: post.created_at,
            reactions: self.counts(ReactionTarget::post(post.id)),
        })
    }

    fn matches(&self, post: &StoredPost, filter: FeedFilter) -> bool {
        match filter {
            FeedFilter::All => true,
            FeedFilter::MineOnly(user_id) => post.author_id == user_id,
            FeedFilter::LikedOnly(user_id) => {
                self.reactions.get(&(user_id, TargetKind::Post, post.id))
                    == Some(&ReactionValue::Like)
            }
            FeedFilter::ByCategory(category_id) => post.category_ids.contains(&category_id),
        }
    }

    fn comments_of(&self, post_id: i64) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|comment| comment.post_id == post_id)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid start time");
        Self {
            state: Arc::new(Mutex::new(State {
                next_id: 0,
                now: start,
                users: Vec::new(),
                sessions: HashMap::new(),
                categories: Vec::new(),
                posts: Vec::new(),
                comments: Vec::new(),
                reactions: HashMap::new(),
                concurrent_insert: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store mutex poisoned")
    }

    pub(crate) fn add_user(&self, username: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        let created_at = state.now;
        let user = User::new(id, username, format!("{username}@example.com"), created_at)
            .expect("test user must be valid");
        state.users.push(StoredUser {
            user,
            password_hash: String::new(),
        });
        id
    }

    pub(crate) fn add_category(&self, name: &str) -> i64 {
        let mut state = self.lock();
        let id = state.next_id();
        state.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    /// Sets the timestamp given to the next created post or comment.
    pub(crate) fn set_now(&self, now: DateTime<Utc>) {
        self.lock().now = now;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    /// Makes the next toggle that would insert for `user_id` on `target`
    /// lose a race against an identical concurrent insert.
    pub(crate) fn race_next_insert(&self, user_id: i64, target: ReactionTarget, value: ReactionValue) {
        self.lock().concurrent_insert = Some(((user_id, target.kind, target.id), value));
    }

    pub(crate) fn reaction_rows(&self, user_id: i64, target: ReactionTarget) -> usize {
        let state = self.lock();
        state
            .reactions
            .keys()
            .filter(|key| **key == (user_id, target.kind, target.id))
            .count()
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }

    pub(crate) fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub(crate) fn has_session(&self, token: &str) -> bool {
        self.lock().sessions.contains_key(token)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state.users.iter().any(|stored| stored.user.email == input.email) {
            return Err(DomainError::Conflict("email already taken".to_string()));
        }
        if state
            .users
            .iter()
            .any(|stored| stored.user.username == input.username)
        {
            return Err(DomainError::Conflict("username already taken".to_string()));
        }

        let id = state.next_id();
        let created_at = state.now;
        let user = User::new(id, input.username, input.email, created_at)?;
        state.users.push(StoredUser {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| stored.user.clone()))
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn replace_for_user(&self, session: &Session) -> Result<(), DomainError> {
        let mut state = self.lock();
        if !state.users.iter().any(|stored| stored.user.id == session.user_id) {
            return Err(DomainError::NotFound(format!("user id: {}", session.user_id)));
        }
        if state.sessions.contains_key(&session.token) {
            return Err(DomainError::Conflict(
                "session token already issued".to_string(),
            ));
        }
        state
            .sessions
            .retain(|_, existing| existing.user_id != session.user_id);
        state
            .sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.lock().sessions.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self.lock().sessions.remove(token).is_some())
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn apply_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
        requested: ReactionValue,
    ) -> Result<ReactionChange, DomainError> {
        let mut state = self.lock();
        if !state.target_exists(target) {
            return Err(DomainError::NotFound(format!("{} id: {}", target.kind, target.id)));
        }

        let key = (user_id, target.kind, target.id);
        let change = ReactionChange::decide(state.reactions.get(&key).copied(), requested);

        if let ReactionChange::Inserted(_) = change
            && let Some((race_key, race_value)) = state.concurrent_insert
            && race_key == key
        {
            state.concurrent_insert = None;
            state.reactions.insert(key, race_value);
            return Err(DomainError::Conflict(format!(
                "reaction of user {user_id} on {} {}",
                target.kind, target.id
            )));
        }

        match change.resulting() {
            Some(value) => state.reactions.insert(key, value),
            None => state.reactions.remove(&key),
        };
        Ok(change)
    }

    async fn find_reaction(
        &self,
        user_id: i64,
        target: ReactionTarget,
    ) -> Result<Option<ReactionValue>, DomainError> {
        Ok(self
            .lock()
            .reactions
            .get(&(user_id, target.kind, target.id))
            .copied())
    }

    async fn reaction_counts(&self, target: ReactionTarget) -> Result<ReactionCounts, DomainError> {
        Ok(self.lock().counts(target))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<i64, DomainError> {
        let mut state = self.lock();
        if input.category_ids.is_empty() {
            return Err(DomainError::Validation {
                field: "category_ids",
                message: "must contain at least one category",
            });
        }
        if !state.users.iter().any(|stored| stored.user.id == input.author_id) {
            return Err(DomainError::NotFound("author".to_string()));
        }
        let all_known = input
            .category_ids
            .iter()
            .all(|id| state.categories.iter().any(|category| category.id == *id));
        if !all_known {
            return Err(DomainError::NotFound("category".to_string()));
        }

        let id = state.next_id();
        let created_at = state.stamp();
        state.posts.push(StoredPost {
            id,
            author_id: input.author_id,
            title: input.title,
            body: input.body,
            created_at,
            category_ids: input.category_ids,
        });
        Ok(id)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.iter().any(|post| post.id == input.post_id) {
            return Err(DomainError::NotFound(format!("post id: {}", input.post_id)));
        }

        let comment = Comment {
            id: state.next_id(),
            post_id: input.post_id,
            author_id: input.author_id,
            body: input.body,
            created_at: state.stamp(),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.lock().categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl FeedRepository for InMemoryStore {
    async fn feed_rows(
        &self,
        filter: FeedFilter,
        comment_limit: u32,
    ) -> Result<Vec<FeedRow>, DomainError> {
        let state = self.lock();
        let mut posts: Vec<&StoredPost> = state
            .posts
            .iter()
            .filter(|post| state.matches(post, filter))
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let mut rows = Vec::new();
        for post in posts {
            let summary = state.summary(post)?;
            let mut comments = state.comments_of(post.id);
            comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            comments.truncate(comment_limit as usize);

            if comments.is_empty() {
                rows.push(FeedRow {
                    post: summary,
                    comment: None,
                });
                continue;
            }
            for comment in comments {
                rows.push(FeedRow {
                    post: summary.clone(),
                    comment: Some(CommentPreview {
                        author_name: state.user_name(comment.author_id)?,
                        body: comment.body.clone(),
                    }),
                });
            }
        }
        Ok(rows)
    }

    async fn detail_rows(&self, post_id: i64) -> Result<Vec<DetailRow>, DomainError> {
        let state = self.lock();
        let Some(post) = state.posts.iter().find(|post| post.id == post_id) else {
            return Ok(Vec::new());
        };
        let summary = state.summary(post)?;

        let mut comments = state.comments_of(post_id);
        comments.sort_by_key(|comment| (comment.created_at, comment.id));
        if comments.is_empty() {
            return Ok(vec![DetailRow {
                post: summary,
                comment: None,
            }]);
        }

        comments
            .into_iter()
            .map(|comment| -> Result<DetailRow, DomainError> {
                Ok(DetailRow {
                    post: summary.clone(),
                    comment: Some(CommentDetail {
                        id: comment.id,
                        author_id: comment.author_id,
                        author_name: state.user_name(comment.author_id)?,
                        body: comment.body.clone(),
                        created_at: comment.created_at,
                        reactions: state.counts(ReactionTarget::comment(comment.id)),
                    }),
                })
            })
            .collect()
    }
}
