//! Shared fixtures for service-level tests, built on the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use kidtrack_core::config::notification::NotificationConfig;
use kidtrack_core::config::sharing::SharingConfig;
use kidtrack_core::types::id::{ActivityId, ChildActivityId, ChildId, UserId};
use kidtrack_database::memory::{MemoryStore, RecordingAuditSink, RecordingNotifier};
use kidtrack_entity::activity::{ActivityStatus, ActivitySummary, ScheduledActivity};
use kidtrack_entity::child::Child;
use kidtrack_entity::user::User;

use crate::calendar::CalendarService;
use crate::context::RequestContext;
use crate::invitation::InvitationService;
use crate::notification::NotificationService;
use crate::sharing::SharingService;

/// Everything a service test needs, wired over one shared [`MemoryStore`].
pub struct TestHarness {
    pub store: MemoryStore,
    pub audit: Arc<RecordingAuditSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub sharing: Arc<SharingService>,
    pub invitations: InvitationService,
    pub calendar: CalendarService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::build(Arc::new(RecordingNotifier::new()), SharingConfig::default())
    }

    pub fn with_failing_notifier() -> Self {
        Self::build(Arc::new(RecordingNotifier::failing()), SharingConfig::default())
    }

    pub fn with_config(config: SharingConfig) -> Self {
        Self::build(Arc::new(RecordingNotifier::new()), config)
    }

    fn build(notifier: Arc<RecordingNotifier>, config: SharingConfig) -> Self {
        let store = MemoryStore::new();
        let audit = Arc::new(RecordingAuditSink::new());
        let notifications = Arc::new(NotificationService::new(
            notifier.clone(),
            NotificationConfig::default(),
        ));
        let backend = Arc::new(store.clone());

        let sharing = Arc::new(SharingService::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            audit.clone(),
            notifications.clone(),
        ));
        let invitations = InvitationService::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            audit.clone(),
            notifications,
            config,
        );
        let calendar = CalendarService::new(backend.clone(), backend, sharing.clone());

        Self {
            store,
            audit,
            notifier,
            sharing,
            invitations,
            calendar,
        }
    }

    /// Seed a user and return it.
    pub fn add_user(&self, email: &str, name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            name: name.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_user(user.clone());
        user
    }

    /// Seed a child and return it.
    pub fn add_child(&self, owner_id: UserId, name: &str) -> Child {
        let now = Utc::now();
        let child = Child {
            id: ChildId::new(),
            owner_id,
            name: name.to_string(),
            date_of_birth: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_child(child.clone());
        child
    }

    /// Seed a scheduled activity and return it.
    pub fn add_activity(
        &self,
        child_id: ChildId,
        status: ActivityStatus,
        notes: Option<&str>,
        rating: Option<i32>,
        date_start: Option<DateTime<Utc>>,
    ) -> ScheduledActivity {
        let activity = ScheduledActivity {
            id: ChildActivityId::new(),
            child_id,
            status,
            notes: notes.map(str::to_string),
            rating,
            registered_at: None,
            completed_at: None,
            activity: ActivitySummary {
                id: ActivityId::new(),
                name: "Rec Program".to_string(),
                category: None,
                date_start,
                location: None,
            },
        };
        self.store.insert_scheduled_activity(activity.clone());
        activity
    }

    /// Request context for a seeded user.
    pub fn ctx(&self, user: &User) -> RequestContext {
        RequestContext::new(user.id, user.email.clone())
    }
}
