//! Command and observation handle for a running session.

use tokio::sync::{mpsc, oneshot, watch};

use crate::{HandleError, SessionCommand, SessionView};

/// Handle to a session owned by a [`crate::Runtime`].
///
/// Commands are applied in the order they are sent. When every handle is
/// dropped the runtime tears the session down and exits.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<SessionCommand>,
        view: watch::Receiver<SessionView>,
    ) -> Self {
        Self { commands, view }
    }

    /// Begin streaming, connecting first if needed.
    pub async fn start(&self) -> Result<(), HandleError> {
        self.send(SessionCommand::Start).await
    }

    /// Stop requesting data. The socket stays open.
    pub async fn stop(&self) -> Result<(), HandleError> {
        self.send(SessionCommand::Stop).await
    }

    /// Stop, close the socket and clear history and band power.
    pub async fn disconnect(&self) -> Result<(), HandleError> {
        self.send(SessionCommand::Disconnect).await
    }

    /// Clear history and band power.
    pub async fn reset(&self) -> Result<(), HandleError> {
        self.send(SessionCommand::Reset).await
    }

    /// Tear the session down and stop the runtime.
    pub async fn shutdown(&self) -> Result<(), HandleError> {
        self.send(SessionCommand::Shutdown).await
    }

    /// Add `channel` to the display selection.
    ///
    /// Returns `false` if it was already selected.
    ///
    /// # Errors
    ///
    /// - `HandleError::Channel` if `channel` is not in the catalog
    /// - `HandleError::Closed` if the runtime has exited
    pub async fn select_channel(&self, channel: &str) -> Result<bool, HandleError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Select { channel: channel.to_owned(), reply }).await?;
        Ok(rx.await.map_err(|_| HandleError::Closed)??)
    }

    /// Remove `channel` from the display selection.
    ///
    /// Returns `false` if it was not selected.
    pub async fn deselect_channel(&self, channel: &str) -> Result<bool, HandleError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Deselect { channel: channel.to_owned(), reply }).await?;
        rx.await.map_err(|_| HandleError::Closed)
    }

    /// Latest published view.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Wait for the next published view.
    ///
    /// # Errors
    ///
    /// - `HandleError::Closed` if the runtime has exited
    pub async fn changed(&mut self) -> Result<SessionView, HandleError> {
        self.view.changed().await.map_err(|_| HandleError::Closed)?;
        Ok(self.view.borrow_and_update().clone())
    }

    /// Wait until a published view satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// - `HandleError::Closed` if the runtime exits first
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&SessionView) -> bool,
    ) -> Result<SessionView, HandleError> {
        let view = self.view.wait_for(predicate).await.map_err(|_| HandleError::Closed)?;
        Ok(view.clone())
    }

    async fn send(&self, command: SessionCommand) -> Result<(), HandleError> {
        self.commands.send(command).await.map_err(|_| HandleError::Closed)
    }
}
