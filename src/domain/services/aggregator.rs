use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::domain::models::attendee::Attendee;
use crate::domain::models::change::ChangeEvent;
use crate::domain::models::event::Event;
use crate::domain::models::registration::Registration;
use crate::domain::models::view::{
    ActivityEntry, ActivityKind, DashboardView, Registrant, RegistrantSource,
};
use crate::domain::ports::{AttendeeRepository, EventRepository, RegistrationRepository};
use crate::error::AppError;

/// Repository handles the aggregator needs to (re)build its snapshot.
#[derive(Clone)]
pub struct StoreHandles {
    pub events: Arc<dyn EventRepository>,
    pub attendees: Arc<dyn AttendeeRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
}

/// In-memory per-owner state folded from change events. Pure; all
/// async plumbing lives in the task around it.
pub struct OwnerState {
    owner_id: String,
    events: HashMap<String, Event>,
    attendees: HashMap<String, Attendee>,
    registrations: HashMap<String, Registration>,
    staged: HashMap<String, Attendee>,
}

impl OwnerState {
    pub fn new(owner_id: String) -> Self {
        Self {
            owner_id,
            events: HashMap::new(),
            attendees: HashMap::new(),
            registrations: HashMap::new(),
            staged: HashMap::new(),
        }
    }

    pub fn from_records(
        owner_id: String,
        events: Vec<Event>,
        attendees: Vec<Attendee>,
        registrations: Vec<Registration>,
    ) -> Self {
        let mut state = Self::new(owner_id);
        state.replace_snapshot(events, attendees, registrations);
        state
    }

    /// Replaces the whole confirmed set, keeping staged placeholders.
    pub fn replace_snapshot(
        &mut self,
        events: Vec<Event>,
        attendees: Vec<Attendee>,
        registrations: Vec<Registration>,
    ) {
        self.events = events.into_iter().map(|e| (e.id.clone(), e)).collect();
        self.attendees = attendees.into_iter().map(|a| (a.id.clone(), a)).collect();
        self.registrations = registrations
            .into_iter()
            .map(|r| (r.ticket_id.clone(), r))
            .collect();
    }

    /// Folds one change in. Events for a different owner are dropped;
    /// returns whether the state changed.
    pub fn apply(&mut self, change: &ChangeEvent) -> bool {
        if change.owner_id() != self.owner_id {
            return false;
        }
        match change {
            ChangeEvent::EventCreated(e) | ChangeEvent::EventUpdated(e) => {
                self.events.insert(e.id.clone(), e.clone());
            }
            ChangeEvent::EventDeleted { event_id, .. } => {
                self.events.remove(event_id);
            }
            ChangeEvent::AttendeeCreated(a) => {
                // The bus echo of an optimistic create can land before
                // the Confirm command; retire the matching placeholder
                // here so no view frame ever holds both records.
                self.staged
                    .retain(|_, s| !(s.event_id == a.event_id && s.email == a.email));
                self.attendees.insert(a.id.clone(), a.clone());
            }
            ChangeEvent::AttendeeUpdated(a) => {
                self.attendees.insert(a.id.clone(), a.clone());
            }
            ChangeEvent::AttendeeDeleted { attendee_id, .. } => {
                self.attendees.remove(attendee_id);
            }
            ChangeEvent::RegistrationCreated(r) => {
                self.registrations.insert(r.ticket_id.clone(), r.clone());
            }
        }
        true
    }

    /// Shows a placeholder record ahead of store confirmation.
    pub fn stage(&mut self, placeholder: Attendee) {
        self.staged.insert(placeholder.id.clone(), placeholder);
    }

    /// Swaps a placeholder for the confirmed record. Tolerates the bus
    /// echo having landed first: the confirmed id is upserted either
    /// way, so the view holds exactly one record for the create.
    pub fn confirm(&mut self, staged_id: &str, confirmed: Attendee) {
        self.staged.remove(staged_id);
        self.attendees
            .entry(confirmed.id.clone())
            .or_insert(confirmed);
    }

    pub fn rollback(&mut self, staged_id: &str) {
        self.staged.remove(staged_id);
    }

    fn visible_attendees(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees.values().chain(self.staged.values())
    }

    /// Derives the dashboard view from the current state.
    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let total_events = self.events.len();
        let checked_in_attendees = self.visible_attendees().filter(|a| a.attended).count();
        let upcoming_events = self.events.values().filter(|e| e.is_upcoming(today)).count();

        let mut recent_activity: Vec<ActivityEntry> = self
            .events
            .values()
            .map(|e| ActivityEntry {
                kind: ActivityKind::EventAdded,
                message: format!("Event \"{}\" added", e.name),
                timestamp: e.created_at,
            })
            .chain(self.visible_attendees().map(|a| {
                let event_name = self
                    .events
                    .get(&a.event_id)
                    .map(|e| e.name.as_str())
                    .unwrap_or("unknown event");
                ActivityEntry {
                    kind: ActivityKind::AttendeeAdded,
                    message: format!("Attendee \"{}\" added to \"{}\"", a.name, event_name),
                    timestamp: a.created_at,
                }
            }))
            .collect();
        recent_activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent_activity.truncate(5);

        DashboardView {
            total_events,
            checked_in_attendees,
            upcoming_events,
            recent_activity,
            registrants: self.registrants(),
        }
    }

    /// Merged registrant list, one entry per email. Registration
    /// records take precedence over attendee records; within a source
    /// the earliest record wins.
    pub fn registrants(&self) -> Vec<Registrant> {
        let mut merged: HashMap<String, Registrant> = HashMap::new();

        let mut attendees: Vec<&Attendee> = self.visible_attendees().collect();
        attendees.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        for a in attendees {
            merged.entry(a.email.clone()).or_insert(Registrant {
                event_id: a.event_id.clone(),
                name: a.name.clone(),
                email: a.email.clone(),
                source: RegistrantSource::Attendee,
                ticket_id: None,
                created_at: a.created_at,
            });
        }

        let mut registrations: Vec<&Registration> = self.registrations.values().collect();
        registrations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        for r in registrations {
            let keep_existing = merged
                .get(&r.email)
                .map(|existing| existing.source == RegistrantSource::Registration)
                .unwrap_or(false);
            if !keep_existing {
                merged.insert(
                    r.email.clone(),
                    Registrant {
                        event_id: r.event_id.clone(),
                        name: r.name.clone(),
                        email: r.email.clone(),
                        source: RegistrantSource::Registration,
                        ticket_id: Some(r.ticket_id.clone()),
                        created_at: r.created_at,
                    },
                );
            }
        }

        let mut list: Vec<Registrant> = merged.into_values().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.email.cmp(&b.email)));
        list
    }
}

enum Command {
    Stage(Attendee),
    Confirm { staged_id: String, confirmed: Attendee },
    Rollback { staged_id: String },
}

/// Scoped optimistic insert. Dropping the guard without confirming
/// rolls the placeholder back, so a failed store write never leaves a
/// dangling record in the view.
pub struct OptimisticGuard {
    staged_id: String,
    commands: mpsc::UnboundedSender<Command>,
    confirmed: bool,
}

impl OptimisticGuard {
    pub fn confirm(mut self, confirmed: Attendee) {
        let _ = self.commands.send(Command::Confirm {
            staged_id: self.staged_id.clone(),
            confirmed,
        });
        self.confirmed = true;
    }
}

impl Drop for OptimisticGuard {
    fn drop(&mut self) {
        if !self.confirmed {
            let _ = self.commands.send(Command::Rollback {
                staged_id: self.staged_id.clone(),
            });
        }
    }
}

/// Handle onto a running per-owner aggregator task. The task stops
/// once every handle is dropped.
#[derive(Clone)]
pub struct AggregatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<DashboardView>,
}

impl AggregatorHandle {
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    pub fn current_view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    pub fn stage_attendee(&self, placeholder: Attendee) -> OptimisticGuard {
        let staged_id = placeholder.id.clone();
        let _ = self.commands.send(Command::Stage(placeholder));
        OptimisticGuard {
            staged_id,
            commands: self.commands.clone(),
            confirmed: false,
        }
    }
}

struct RegistryEntry {
    handle: AggregatorHandle,
    subscribers: usize,
}

/// Lazily spawns one aggregator task per owner and tears it down when
/// the owner's context ends. Keeping the lifecycle here makes
/// cancellation explicit: the task stops when the last lease drops or
/// the identity is torn down, so a stale identity can never keep
/// feeding view state.
pub struct LiveRegistry {
    bus: broadcast::Sender<ChangeEvent>,
    stores: StoreHandles,
    inner: Mutex<HashMap<String, RegistryEntry>>,
}

impl LiveRegistry {
    pub fn new(bus: broadcast::Sender<ChangeEvent>, stores: StoreHandles) -> Self {
        Self {
            bus,
            stores,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Lease onto the owner's live view. The first lease spawns the
    /// aggregator; dropping the last one stops it.
    pub async fn subscribe_owner(self: Arc<Self>, owner_id: &str) -> Result<LiveLease, AppError> {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.get_mut(owner_id) {
            entry.subscribers += 1;
            let view = entry.handle.subscribe();
            drop(inner);
            return Ok(LiveLease {
                owner_id: owner_id.to_string(),
                registry: self,
                view,
            });
        }

        // Subscribe before snapshotting so no change slips between the
        // two; re-applied changes are idempotent upserts.
        let changes = self.bus.subscribe();
        let state = load_snapshot(&self.stores, owner_id).await?;
        let handle = spawn_aggregator(state, changes, self.stores.clone());
        let view = handle.subscribe();
        inner.insert(
            owner_id.to_string(),
            RegistryEntry {
                handle,
                subscribers: 1,
            },
        );
        info!("Started live aggregator for owner {}", owner_id);
        drop(inner);
        Ok(LiveLease {
            owner_id: owner_id.to_string(),
            registry: self,
            view,
        })
    }

    /// The owner's running aggregator, if anyone is subscribed. Lets
    /// writers stage optimistic records without spawning a task nobody
    /// is watching.
    pub async fn existing(&self, owner_id: &str) -> Option<AggregatorHandle> {
        self.inner
            .lock()
            .await
            .get(owner_id)
            .map(|entry| entry.handle.clone())
    }

    /// Ends the owner's live context regardless of open leases. Open
    /// watch receivers keep their last value but see no further
    /// updates.
    pub async fn teardown(&self, owner_id: &str) {
        if self.inner.lock().await.remove(owner_id).is_some() {
            info!("Tore down live aggregator for owner {}", owner_id);
        }
    }

    async fn release(&self, owner_id: &str) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.get_mut(owner_id) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                inner.remove(owner_id);
                debug!("Stopped idle live aggregator for owner {}", owner_id);
            }
        }
    }
}

/// Refcounted subscription to an owner's live view. Dropping it
/// releases the registry slot; the aggregator task stops once no
/// leases remain.
pub struct LiveLease {
    owner_id: String,
    registry: Arc<LiveRegistry>,
    view: watch::Receiver<DashboardView>,
}

impl LiveLease {
    pub fn receiver(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    pub fn current_view(&self) -> DashboardView {
        self.view.borrow().clone()
    }
}

impl Drop for LiveLease {
    fn drop(&mut self) {
        let registry = self.registry.clone();
        let owner_id = self.owner_id.clone();
        tokio::spawn(async move {
            registry.release(&owner_id).await;
        });
    }
}

async fn load_snapshot(stores: &StoreHandles, owner_id: &str) -> Result<OwnerState, AppError> {
    let events = stores.events.list(owner_id).await?;
    let attendees = stores.attendees.list(owner_id).await?;
    let registrations = stores.registrations.list(owner_id).await?;
    Ok(OwnerState::from_records(
        owner_id.to_string(),
        events,
        attendees,
        registrations,
    ))
}

fn spawn_aggregator(
    mut state: OwnerState,
    mut changes: broadcast::Receiver<ChangeEvent>,
    stores: StoreHandles,
) -> AggregatorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(state.view(Utc::now().date_naive()));

    let task_owner = state.owner_id.clone();
    tokio::spawn(async move {
        loop {
            let dirty = tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(Command::Stage(placeholder)) => {
                        state.stage(placeholder);
                        true
                    }
                    Some(Command::Confirm { staged_id, confirmed }) => {
                        state.confirm(&staged_id, confirmed);
                        true
                    }
                    Some(Command::Rollback { staged_id }) => {
                        debug!("Rolling back optimistic insert {}", staged_id);
                        state.rollback(&staged_id);
                        true
                    }
                    // All handles dropped: context is gone, stop.
                    None => break,
                },
                change = changes.recv() => match change {
                    Ok(change) => state.apply(&change),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(
                            "Aggregator for {} lagged by {} changes, resyncing snapshot",
                            task_owner, missed
                        );
                        match load_snapshot(&stores, &task_owner).await {
                            Ok(fresh) => {
                                state.replace_snapshot_from(fresh);
                                true
                            }
                            Err(e) => {
                                warn!("Snapshot resync failed for {}: {}", task_owner, e);
                                false
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            if dirty {
                view_tx.send_replace(state.view(Utc::now().date_naive()));
            }
        }
        debug!("Aggregator task for {} stopped", task_owner);
    });

    AggregatorHandle {
        commands: cmd_tx,
        view: view_rx,
    }
}

impl OwnerState {
    fn replace_snapshot_from(&mut self, fresh: OwnerState) {
        self.events = fresh.events;
        self.attendees = fresh.attendees;
        self.registrations = fresh.registrations;
    }
}
