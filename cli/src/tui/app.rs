use std::sync::mpsc::{self, Receiver};

use anyhow::Result;
use crossterm::event::KeyCode;
use timetable_core::{
    timestamp_id, today, AttendanceRecord, Class, ClassGateway, Config, DocumentStore, NewClass,
    Subscription,
};
use tracing::error;

use crate::tui::timetable::{Intent, Timetable};

pub const ADD_FAILED: &str = "Failed to add class";
pub const ATTENDANCE_FAILED: &str = "Failed to update attendance";
pub const DELETE_FAILED: &str = "Failed to delete class";

/// Root controller: owns the live subscription and the latest snapshot, and
/// forwards the view's intents to the gateway.
pub struct App<S: DocumentStore> {
    gateway: ClassGateway<S>,
    pub config: Config,
    pub classes: Vec<Class>,
    pub loading: bool,
    pub timetable: Timetable,
    /// Blocking message; any key dismisses it.
    pub alert: Option<&'static str>,
    pub should_quit: bool,
    snapshots: Receiver<Vec<Class>>,
    subscription: Subscription,
}

impl<S> App<S>
where
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    pub fn new(gateway: ClassGateway<S>, config: Config) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let subscription = gateway.subscribe(move |classes| {
            // The receiver only goes away together with the subscription.
            let _ = tx.send(classes);
        })?;

        Ok(App {
            gateway,
            config,
            classes: Vec::new(),
            loading: true,
            timetable: Timetable::new(),
            alert: None,
            should_quit: false,
            snapshots: rx,
            subscription,
        })
    }

    /// Apply the newest snapshot delivered since the last call, if any.
    pub fn poll_snapshots(&mut self) {
        let mut latest = None;
        while let Ok(classes) = self.snapshots.try_recv() {
            latest = Some(classes);
        }
        if let Some(classes) = latest {
            self.classes = classes;
            self.loading = false;
            self.timetable.sync(&self.classes);
        }
    }

    pub fn on_key(&mut self, code: KeyCode) {
        if self.alert.is_some() {
            self.alert = None;
            return;
        }
        if self.timetable.is_idle() && matches!(code, KeyCode::Char('q')) {
            self.should_quit = true;
            return;
        }
        if self.loading {
            return;
        }
        if let Some(intent) = self.timetable.handle_key(code, &self.classes) {
            self.dispatch(intent);
        }
    }

    /// One gateway call per intent. Failures raise an alert and leave the
    /// class list as it is; the next snapshot reconciles.
    pub fn dispatch(&mut self, intent: Intent) {
        match intent {
            Intent::AddClass { slot, name } => {
                if let Err(e) = self.gateway.add_class(NewClass::new(name, slot)) {
                    error!(
                        day = slot.day(),
                        period = slot.period(),
                        error = %e,
                        "add intent failed"
                    );
                    self.alert = Some(ADD_FAILED);
                }
            }
            Intent::MarkAttendance { class_id, status } => {
                let record = AttendanceRecord::new(timestamp_id(), today(), status);
                if let Err(e) = self.gateway.update_attendance(&class_id, record) {
                    error!(class_id = %class_id, error = %e, "attendance intent failed");
                    self.alert = Some(ATTENDANCE_FAILED);
                }
            }
            Intent::DeleteClass { class_id } => {
                if let Err(e) = self.gateway.delete_class(&class_id) {
                    error!(class_id = %class_id, error = %e, "delete intent failed");
                    self.alert = Some(DELETE_FAILED);
                }
            }
        }
    }

    /// Release the subscription. Dropping the app does the same.
    pub fn close(self) {
        self.subscription.unsubscribe();
    }
}
