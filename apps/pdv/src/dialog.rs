//! # Dialog Service
//!
//! Awaitable alert / error / success / confirm dialogs.
//!
//! ## Queue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  show_confirm("Excluir?") ──┐                                          │
//! │  show_error("Falhou")  ─────┤  push_back                               │
//! │                             ▼                                           │
//! │   ┌──────────┬──────────┬──────────┐                                   │
//! │   │ #1 head  │ #2       │ #3       │ ◄── one oneshot reply each        │
//! │   └────┬─────┴──────────┴──────────┘                                   │
//! │        │ current()                                                      │
//! │        ▼                                                                │
//! │   modal on screen ── respond(#1, true) ──► #1 future resolves          │
//! │                                            #2 becomes head              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every request has its own reply handle, so a second `show_*` never
//! orphans the first caller. A request dropped without an answer
//! (`dismiss_all`, service shut down) resolves confirms to `false`.
//!
//! `report_*` dialogs nobody awaits are collapsed: a report identical to
//! one already queued is skipped, and past [`MAX_PENDING`] the oldest
//! unawaited report behind the head is dropped.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{oneshot, Notify};
use tracing::debug;

/// Label of the acknowledgement button.
pub const ACK_LABEL: &str = "Entendi";

/// Queue length past which unawaited reports are evicted.
pub const MAX_PENDING: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Error,
    Success,
    Confirm,
}

/// What the modal shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogRequest {
    pub id: u64,
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    /// Only confirms have a cancel button.
    pub cancel_label: Option<String>,
}

#[derive(Debug)]
struct Pending {
    request: DialogRequest,
    reply: oneshot::Sender<bool>,
}

#[derive(Debug, Default)]
struct Inner {
    queue: Mutex<VecDeque<Pending>>,
    next_id: AtomicU64,
    changed: Notify,
}

/// FIFO dialog queue shared by the commands and the screen.
#[derive(Debug, Clone, Default)]
pub struct DialogService {
    inner: Arc<Inner>,
}

impl DialogService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_alert(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Future<Output = ()> + Send + 'static {
        let rx = self.enqueue(DialogKind::Alert, title.into(), message.into());
        async move {
            let _ = rx.await;
        }
    }

    pub fn show_error(&self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'static {
        let rx = self.enqueue(DialogKind::Error, "Erro".to_string(), message.into());
        async move {
            let _ = rx.await;
        }
    }

    pub fn show_success(
        &self,
        message: impl Into<String>,
    ) -> impl Future<Output = ()> + Send + 'static {
        let rx = self.enqueue(DialogKind::Success, "Sucesso".to_string(), message.into());
        async move {
            let _ = rx.await;
        }
    }

    /// Resolves to `true` only when the user confirms.
    pub fn show_confirm(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> impl Future<Output = bool> + Send + 'static {
        let rx = self.enqueue(DialogKind::Confirm, title.into(), message.into());
        async move { rx.await.unwrap_or(false) }
    }

    /// Queues an error dialog without waiting for its acknowledgement.
    pub fn report_error(&self, message: impl Into<String>) {
        self.report(DialogKind::Error, "Erro", message.into());
    }

    /// Queues a success dialog without waiting for its acknowledgement.
    pub fn report_success(&self, message: impl Into<String>) {
        self.report(DialogKind::Success, "Sucesso", message.into());
    }

    /// The dialog on screen, if any.
    pub fn current(&self) -> Option<DialogRequest> {
        self.queue().front().map(|p| p.request.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.queue().len()
    }

    /// Waits until a dialog is on screen and returns it.
    pub async fn next_request(&self) -> DialogRequest {
        loop {
            let changed = self.inner.changed.notified();
            if let Some(request) = self.current() {
                return request;
            }
            changed.await;
        }
    }

    /// Settles request `id`. `confirmed` is ignored by non-confirm dialogs.
    ///
    /// Returns `false` when no such request is pending.
    pub fn respond(&self, id: u64, confirmed: bool) -> bool {
        let pending = {
            let mut queue = self.queue();
            let Some(index) = queue.iter().position(|p| p.request.id == id) else {
                return false;
            };
            queue.remove(index)
        };

        if let Some(pending) = pending {
            debug!(id, confirmed, kind = ?pending.request.kind, "Dialog answered");
            // Caller may have stopped waiting
            let _ = pending.reply.send(confirmed);
        }
        self.inner.changed.notify_waiters();
        true
    }

    /// Drops every pending request. Confirms resolve to `false`.
    pub fn dismiss_all(&self) {
        let dropped: Vec<Pending> = self.queue().drain(..).collect();
        if !dropped.is_empty() {
            debug!(count = dropped.len(), "Dismissing dialogs");
        }
        drop(dropped);
        self.inner.changed.notify_waiters();
    }

    fn report(&self, kind: DialogKind, title: &str, message: String) {
        {
            let mut queue = self.queue();
            if queue
                .iter()
                .any(|p| p.request.kind == kind && p.request.message == message)
            {
                debug!(kind = ?kind, "Same dialog already queued, skipping");
                return;
            }

            if queue.len() >= MAX_PENDING {
                // The head is on screen; awaited requests are never dropped
                if let Some(index) = queue
                    .iter()
                    .skip(1)
                    .position(|p| p.reply.is_closed())
                    .map(|i| i + 1)
                {
                    if let Some(evicted) = queue.remove(index) {
                        debug!(id = evicted.request.id, "Evicting unawaited dialog");
                    }
                }
            }
        }

        drop(self.enqueue(kind, title.to_string(), message));
    }

    fn enqueue(&self, kind: DialogKind, title: String, message: String) -> oneshot::Receiver<bool> {
        let (reply, rx) = oneshot::channel();
        let request = DialogRequest {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            kind,
            title,
            message,
            confirm_label: match kind {
                DialogKind::Confirm => "Confirmar".to_string(),
                _ => ACK_LABEL.to_string(),
            },
            cancel_label: (kind == DialogKind::Confirm).then(|| "Cancelar".to_string()),
        };

        debug!(id = request.id, kind = ?kind, "Dialog queued");
        self.queue().push_back(Pending { request, reply });
        self.inner.changed.notify_waiters();
        rx
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Pending>> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requests_are_served_in_order() {
        let dialogs = DialogService::new();

        let first = dialogs.show_confirm("Excluir", "Excluir produto?");
        let second = dialogs.show_error("Falhou");

        let head = dialogs.current().unwrap();
        assert_eq!(head.kind, DialogKind::Confirm);
        assert_eq!(head.cancel_label.as_deref(), Some("Cancelar"));
        assert_eq!(dialogs.pending_count(), 2);

        assert!(dialogs.respond(head.id, true));
        assert!(first.await);

        let head = dialogs.current().unwrap();
        assert_eq!(head.kind, DialogKind::Error);
        assert_eq!(head.confirm_label, ACK_LABEL);
        dialogs.respond(head.id, false);
        second.await;

        assert!(dialogs.current().is_none());
    }

    #[tokio::test]
    async fn test_second_request_does_not_orphan_first() {
        let dialogs = DialogService::new();

        let first = tokio::spawn(dialogs.show_confirm("A", "primeiro"));
        let second = tokio::spawn(dialogs.show_confirm("B", "segundo"));

        let a = dialogs.next_request().await;
        dialogs.respond(a.id, true);
        let b = dialogs.next_request().await;
        dialogs.respond(b.id, false);

        assert!(first.await.unwrap());
        assert!(!second.await.unwrap());
    }

    #[tokio::test]
    async fn test_dismiss_resolves_confirm_false() {
        let dialogs = DialogService::new();
        let confirm = dialogs.show_confirm("Sair", "Deseja sair?");
        let alert = dialogs.show_alert("Aviso", "Algo");

        dialogs.dismiss_all();

        assert!(!confirm.await);
        alert.await;
        assert_eq!(dialogs.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_report_error_stays_queued() {
        let dialogs = DialogService::new();
        dialogs.report_error("Loja não encontrada");

        let head = dialogs.current().unwrap();
        assert_eq!(head.kind, DialogKind::Error);
        assert_eq!(head.message, "Loja não encontrada");
        assert!(dialogs.respond(head.id, false));
    }

    #[tokio::test]
    async fn test_repeated_report_is_collapsed() {
        let dialogs = DialogService::new();
        for _ in 0..3 {
            dialogs.report_error("Estoque insuficiente");
        }
        dialogs.report_success("Estoque insuficiente");
        assert_eq!(dialogs.pending_count(), 2);

        // Once answered, the same message can show again
        let head = dialogs.current().unwrap();
        dialogs.respond(head.id, false);
        dialogs.report_error("Estoque insuficiente");
        assert_eq!(dialogs.pending_count(), 2);
    }

    #[tokio::test]
    async fn test_reports_are_capped() {
        let dialogs = DialogService::new();
        let confirm = dialogs.show_confirm("Excluir", "Excluir produto?");
        dialogs.report_error("falha 0");
        let awaited = dialogs.show_error("aguardado");

        for i in 1..=(MAX_PENDING * 2) {
            dialogs.report_error(format!("falha {i}"));
        }
        assert_eq!(dialogs.pending_count(), MAX_PENDING);

        // Head and awaited requests survive eviction, oldest reports go
        let queued: Vec<String> = dialogs
            .queue()
            .iter()
            .map(|p| p.request.message.clone())
            .collect();
        assert_eq!(queued[0], "Excluir produto?");
        assert!(queued.contains(&"aguardado".to_string()));
        assert!(!queued.contains(&"falha 0".to_string()));
        assert_eq!(queued.last().unwrap(), &format!("falha {}", MAX_PENDING * 2));

        dialogs.dismiss_all();
        assert!(!confirm.await);
        awaited.await;
    }

    #[tokio::test]
    async fn test_respond_unknown_id() {
        let dialogs = DialogService::new();
        assert!(!dialogs.respond(42, true));
    }

    #[tokio::test]
    async fn test_next_request_waits_for_enqueue() {
        let dialogs = DialogService::new();
        let waiter = {
            let dialogs = dialogs.clone();
            tokio::spawn(async move { dialogs.next_request().await })
        };
        tokio::task::yield_now().await;

        dialogs.report_success("Produto salvo");
        let request = waiter.await.unwrap();
        assert_eq!(request.kind, DialogKind::Success);
    }
}
