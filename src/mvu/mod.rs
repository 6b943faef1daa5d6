// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Root Model-View-Update kernel for one pay document form session.
//!
//! The form goes through `Editing → Building → Built`. Building runs on a
//! worker; any edit while it runs abandons that build.

use std::path::PathBuf;

use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::config::PayConfig;
use crate::logic::builder::{self, DocumentBuilder};
use crate::logic::crypto::{Clock, SystemClock};
use crate::logic::validate::validate_all;
use crate::models::document::PayDocument;
use crate::models::fields::{FieldErrors, NormalizedFields, RawFields};
use crate::ui::components::expiry_picker::{self, ExpiryModel, ExpiryMsg};

/// Where the current form session stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Editing,
    /// A build for `session` is running on a worker.
    Building { session: u64 },
    /// Encoded document waiting to be saved.
    Built(BuiltDocument),
}

/// Output of a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltDocument {
    pub document: PayDocument,
    /// Canonical encoding, written as-is on save.
    pub bytes: Vec<u8>,
    /// Advisory save name.
    pub filename: String,
}

/// Summary of a `.pay` file opened from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InspectedDocument {
    pub document: PayDocument,
    pub path: PathBuf,
    /// SHA-256 of the file bytes.
    pub fingerprint: String,
    /// Whether `exp` had passed when the file was opened.
    pub expired: bool,
}

/// Top-level application state.
pub struct AppModel {
    /// Form defaults and asset/network presets.
    pub config: PayConfig,
    pub amount: String,
    pub asset: String,
    pub network: String,
    /// Optional expiry in local time.
    pub expiry: ExpiryModel,
    pub note: String,
    /// Optional secret; only its hash leaves the form.
    pub pin: Zeroizing<String>,
    /// Current per-field errors, recomputed on every edit.
    pub errors: FieldErrors,
    pub session: SessionState,
    /// Advances on each build request and on edits during a build.
    pub session_id: u64,
    /// Save name waiting for the save dialog.
    pub save_prompt: Option<String>,
    /// Document opened for inspection.
    pub inspected: Option<InspectedDocument>,
    /// Latest status message to display.
    pub status: Option<String>,
    /// Latest error message to display in modal.
    pub error: Option<String>,
    /// Count of queued background commands.
    pub pending_commands: usize,
}

impl Default for AppModel {
    fn default() -> Self {
        Self::with_config(PayConfig::default())
    }
}

impl AppModel {
    /// Fresh form prefilled from `config`.
    pub fn with_config(config: PayConfig) -> Self {
        let mut model = Self {
            amount: String::new(),
            asset: config.default_asset.clone(),
            network: config.default_network.clone(),
            expiry: ExpiryModel::hours_from_now(config.default_expiry_hours),
            note: String::new(),
            pin: Zeroizing::new(String::new()),
            errors: FieldErrors::default(),
            session: SessionState::Editing,
            session_id: 0,
            save_prompt: None,
            inspected: None,
            status: None,
            error: None,
            pending_commands: 0,
            config,
        };
        model.revalidate(SystemClock.now_utc());
        model
    }

    /// Raw field values as currently entered.
    pub fn raw_fields(&self) -> RawFields {
        RawFields {
            amount: self.amount.clone(),
            asset: self.asset.clone(),
            network: self.network.clone(),
            expiry: self.expiry.to_local_input(),
            note: self.note.clone(),
        }
    }

    /// Whether a build is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.session, SessionState::Building { .. })
    }

    /// Whether the create button should accept a click.
    pub fn can_create(&self) -> bool {
        !self.is_busy() && self.errors.is_empty()
    }

    /// Hand the pending save name to the view, once.
    pub fn take_save_prompt(&mut self) -> Option<String> {
        self.save_prompt.take()
    }

    fn revalidate(&mut self, now: OffsetDateTime) -> Option<NormalizedFields> {
        match validate_all(&self.raw_fields(), now) {
            Ok(fields) => {
                self.errors = FieldErrors::default();
                Some(fields)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Any edit invalidates an in-flight or finished build.
    fn edited(&mut self) {
        match self.session {
            SessionState::Building { session } => {
                tracing::debug!(session, "abandoning build after edit");
                self.session_id += 1;
                self.session = SessionState::Editing;
            }
            SessionState::Built(_) => {
                self.session = SessionState::Editing;
                self.save_prompt = None;
            }
            SessionState::Editing => {}
        }
        self.revalidate(SystemClock.now_utc());
    }
}

/// Application messages routed through the update function.
pub enum Msg {
    AmountChanged(String),
    AssetChanged(String),
    NetworkChanged(String),
    Expiry(ExpiryMsg),
    NoteChanged(String),
    PinChanged(Zeroizing<String>),
    CreateRequested,
    BuildCompleted {
        session: u64,
        result: Result<BuiltDocument, String>,
    },
    SaveRequested(PathBuf),
    SaveCancelled,
    SaveCompleted(Result<PathBuf, String>),
    OpenRequested(PathBuf),
    OpenCompleted(Result<InspectedDocument, String>),
    DismissError,
    DismissInspected,
}

/// Commands represent side-effects executed between frames.
pub enum Command {
    BuildDocument(BuildRequest),
    WriteDocument { path: PathBuf, bytes: Vec<u8> },
    OpenDocument(PathBuf),
}

/// Validated input for one build.
pub struct BuildRequest {
    pub session: u64,
    pub fields: NormalizedFields,
    /// Raw note; the builder trims it.
    pub note: String,
    /// Raw secret; wiped once hashed.
    pub secret: Zeroizing<String>,
}

/// Update the application model and enqueue commands.
pub fn update(model: &mut AppModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::AmountChanged(text) => {
            model.amount = text;
            model.edited();
        }
        Msg::AssetChanged(asset) => {
            let offered = model.config.networks_for(&asset);
            if !offered.iter().any(|n| *n == model.network)
                && let Some(first) = offered.first()
            {
                model.network = first.clone();
            }
            model.asset = asset;
            model.edited();
        }
        Msg::NetworkChanged(network) => {
            model.network = network;
            model.edited();
        }
        Msg::Expiry(m) => {
            expiry_picker::update(&mut model.expiry, m);
            model.edited();
        }
        Msg::NoteChanged(text) => {
            model.note = text;
            model.edited();
        }
        Msg::PinChanged(pin) => {
            model.pin = pin;
            model.edited();
        }
        Msg::CreateRequested => request_build(model, cmds),
        Msg::BuildCompleted { session, result } => {
            if model.session != (SessionState::Building { session }) {
                tracing::debug!(session, "discarding stale build result");
                return;
            }
            match result {
                Ok(built) => {
                    tracing::info!(file = %built.filename, "pay document built");
                    model.save_prompt = Some(built.filename.clone());
                    model.session = SessionState::Built(built);
                }
                Err(err) => {
                    model.session = SessionState::Editing;
                    surface_event(model, format!("Failed to create pay document:\n\n{err}"), true);
                }
            }
        }
        Msg::SaveRequested(path) => match &model.session {
            SessionState::Built(built) => cmds.push(Command::WriteDocument {
                path,
                bytes: built.bytes.clone(),
            }),
            _ => surface_event(model, "Create the document before saving.".to_string(), true),
        },
        Msg::SaveCancelled => {
            // The built document stays available for another save attempt.
            surface_event(model, "Save cancelled.".to_string(), false);
        }
        Msg::SaveCompleted(result) => match result {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                tracing::info!(path = %path.display(), "pay document saved");
                model.session = SessionState::Editing;
                surface_event(model, format!("Saved {name}"), false);
            }
            Err(err) => {
                tracing::warn!(error = %err, "saving pay document failed");
                surface_event(model, format!("Failed to save pay document:\n\n{err}"), true);
            }
        },
        Msg::OpenRequested(path) => cmds.push(Command::OpenDocument(path)),
        Msg::OpenCompleted(result) => match result {
            Ok(doc) => {
                let message = format!("Opened {}", doc.path.display());
                model.inspected = Some(doc);
                surface_event(model, message, false);
            }
            Err(err) => surface_event(model, format!("Failed to open pay document:\n\n{err}"), true),
        },
        Msg::DismissError => model.error = None,
        Msg::DismissInspected => model.inspected = None,
    }
}

fn request_build(model: &mut AppModel, cmds: &mut Vec<Command>) {
    if model.is_busy() {
        return;
    }
    let Some(fields) = model.revalidate(SystemClock.now_utc()) else {
        let summary = model.errors.summary();
        surface_event(model, summary, true);
        return;
    };

    model.session_id += 1;
    let session = model.session_id;
    model.session = SessionState::Building { session };
    model.save_prompt = None;
    tracing::debug!(session, "build requested");

    cmds.push(Command::BuildDocument(BuildRequest {
        session,
        fields,
        note: model.note.clone(),
        secret: model.pin.clone(),
    }));
}

/// Execute a command synchronously and return a resulting message.
pub fn run_command(cmd: Command) -> Msg {
    match cmd {
        Command::BuildDocument(request) => {
            let session = request.session;
            let result = build_document(request).map_err(|e| format!("{e:#}"));
            Msg::BuildCompleted { session, result }
        }
        Command::WriteDocument { path, bytes } => {
            let res = builder::write_document(&path, &bytes).map(|_| path);
            Msg::SaveCompleted(res.map_err(|e| format!("{e:#}")))
        }
        Command::OpenDocument(path) => {
            Msg::OpenCompleted(inspect_document(path).map_err(|e| format!("{e:#}")))
        }
    }
}

fn build_document(request: BuildRequest) -> anyhow::Result<BuiltDocument> {
    let document =
        DocumentBuilder::system().build(&request.fields, &request.note, request.secret)?;
    let bytes = builder::encode(&document)?;
    let filename = builder::suggested_filename(&document);
    Ok(BuiltDocument {
        document,
        bytes,
        filename,
    })
}

fn inspect_document(path: PathBuf) -> anyhow::Result<InspectedDocument> {
    let document = builder::read_document(&path)?;
    let fingerprint = crate::utils::hash_file(&path)?;
    let expired = document.payload().is_expired_at(SystemClock.now_utc());
    Ok(InspectedDocument {
        document,
        path,
        fingerprint,
        expired,
    })
}

/// Update status/error fields consistently for user feedback.
fn surface_event(model: &mut AppModel, message: String, is_error: bool) {
    if is_error {
        model.error = Some(message.clone());
    }
    model.status = Some(message);
}
