//! The edit session state machine.
//!
//! ```text
//! SelectNamespace -> SelectName -> SelectKey -> Fetch -> Populate -> Edit
//!   -> CompareEqual? --equal--> Done(Unchanged)
//!                    --differs--> Diff -> Confirm --no--> Cancelled
//!                                                 --yes--> Apply -> Done(Applied)
//! ```
//!
//! Every error is fatal and ends the session. The scratch buffer is
//! released on every path before the session returns.

use std::future::Future;
use std::time::Duration;

use kse_core::{Error, Result, SecretBytes, SecretRef, StoreError};
use kse_store::SecretStore;
use tracing::{debug, warn};

use crate::buffer::TransientBuffer;
use crate::diff::DiffResult;
use crate::editor::Editor;
use crate::prompt::Prompter;

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The edited value was byte-identical; nothing was written.
    Unchanged,
    /// The new value was written to the store.
    Applied,
    /// The user declined to save.
    Cancelled,
}

/// State carried through one edit of one key.
#[derive(Debug)]
pub struct EditSession {
    secret: SecretRef,
    key: String,
    original: SecretBytes,
    edited: Option<SecretBytes>,
}

impl EditSession {
    pub fn new(secret: SecretRef, key: impl Into<String>, original: SecretBytes) -> Self {
        Self {
            secret,
            key: key.into(),
            original,
            edited: None,
        }
    }

    pub fn secret(&self) -> &SecretRef {
        &self.secret
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn original(&self) -> &SecretBytes {
        &self.original
    }

    /// The value read back after editing, if editing has happened.
    pub fn edited(&self) -> Option<&SecretBytes> {
        self.edited.as_ref()
    }

    /// Whether the edited value differs from the original.
    pub fn is_changed(&self) -> bool {
        self.edited
            .as_ref()
            .is_some_and(|edited| *edited != self.original)
    }
}

/// Runs edit sessions against a store, an editor, and a prompter.
pub struct SessionRunner<'a> {
    store: &'a dyn SecretStore,
    editor: &'a dyn Editor,
    prompter: &'a dyn Prompter,
    request_timeout: Duration,
}

impl<'a> SessionRunner<'a> {
    pub fn new(
        store: &'a dyn SecretStore,
        editor: &'a dyn Editor,
        prompter: &'a dyn Prompter,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            editor,
            prompter,
            request_timeout,
        }
    }

    /// Run the full workflow, from namespace selection to write-back.
    pub async fn run(&self) -> Result<SessionOutcome> {
        let secret = self.select_secret().await?;
        let mut session = self.select_key(secret).await?;
        self.edit(&mut session).await
    }

    /// Let the user pick a namespace and then a secret within it.
    pub async fn select_secret(&self) -> Result<SecretRef> {
        self.prompter.notify("Loading namespaces...");
        let namespaces = self.remote(self.store.list_namespaces()).await?;
        let namespace = self.choose("Select namespace", "namespaces", namespaces)?;

        self.prompter
            .notify(&format!("Loading secrets in namespace '{namespace}'..."));
        let names = self.remote(self.store.list_names(&namespace)).await?;
        let name = self.choose(
            &format!("Select secret in '{namespace}'"),
            &format!("secrets in namespace '{namespace}'"),
            names,
        )?;

        Ok(SecretRef::new(namespace, name))
    }

    /// Fetch the selected object and let the user pick one of its keys.
    pub async fn select_key(&self, secret: SecretRef) -> Result<EditSession> {
        self.prompter.notify(&format!(
            "Loading secret '{}' in namespace '{}'...",
            secret.name, secret.namespace
        ));
        debug!(secret = %secret, "fetch");
        let mut data = self.remote(self.store.fetch(&secret)).await?;

        let key = self.choose(
            &format!("Select key in secret '{}'", secret.name),
            &format!("keys in secret '{secret}'"),
            data.keys().cloned().collect(),
        )?;
        let original = data
            .remove(&key)
            .ok_or_else(|| StoreError::not_found("key", format!("{secret}:{key}")))?;

        Ok(EditSession::new(secret, key, original))
    }

    /// Edit one key of an already fetched object and apply the change.
    ///
    /// On success the session carries the edited value.
    pub async fn edit(&self, session: &mut EditSession) -> Result<SessionOutcome> {
        debug!(secret = %session.secret, key = %session.key, "populate");
        let mut buffer = TransientBuffer::create()?;
        let edited = self.edit_in_buffer(&mut buffer, session);

        // The edited bytes are held in memory from here on, so the scratch
        // file is removed before the diff, confirm and apply steps.
        let released = buffer.release();
        let edited = match (edited, released) {
            (Ok(edited), Ok(())) => edited,
            (Ok(_), Err(e)) => return Err(e.into()),
            (Err(e), Err(release_err)) => {
                warn!("failed to remove scratch file: {release_err}");
                return Err(e);
            }
            (Err(e), Ok(())) => return Err(e),
        };

        let outcome = self.review_and_apply(session, &edited).await;
        session.edited = Some(edited);
        outcome
    }

    async fn review_and_apply(
        &self,
        session: &EditSession,
        edited: &SecretBytes,
    ) -> Result<SessionOutcome> {
        if *edited == session.original {
            debug!("content unchanged, skipping write-back");
            return Ok(SessionOutcome::Unchanged);
        }

        let diff = DiffResult::compute(session.original.expose_secret(), edited.expose_secret());
        self.prompter.show_diff(&diff);

        let label = format!(
            "Save changes to secret '{}' key '{}'",
            session.secret, session.key
        );
        match self.prompter.confirm(&label) {
            Ok(true) => {}
            Ok(false) => return Ok(SessionOutcome::Cancelled),
            Err(e) => {
                debug!("confirmation failed, treating as cancel: {e}");
                return Ok(SessionOutcome::Cancelled);
            }
        }

        debug!(secret = %session.secret, key = %session.key, "apply");
        self.remote(self.store.patch(&session.secret, &session.key, edited))
            .await?;
        Ok(SessionOutcome::Applied)
    }

    fn edit_in_buffer(
        &self,
        buffer: &mut TransientBuffer,
        session: &EditSession,
    ) -> Result<SecretBytes> {
        buffer.write(session.original.expose_secret())?;

        // Blocks this thread until the editor exits; nothing else is in flight.
        debug!("edit");
        self.editor.open(buffer.path())?;

        Ok(SecretBytes::new(buffer.read()?))
    }

    /// Present a sorted option list and return the user's choice.
    fn choose(&self, label: &str, what: &str, mut options: Vec<String>) -> Result<String> {
        if options.is_empty() {
            return Err(StoreError::Empty(what.to_string()).into());
        }
        options.sort();
        Ok(self.prompter.select(label, &options)?)
    }

    /// Run one remote call under the per-call timeout.
    async fn remote<T>(&self, call: impl Future<Output = kse_store::Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result.map_err(Error::from),
            Err(_) => Err(StoreError::Timeout(self.request_timeout.as_secs()).into()),
        }
    }
}
