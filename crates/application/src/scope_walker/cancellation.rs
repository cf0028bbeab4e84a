use tokio::sync::watch;

/// Cooperative cancellation observed by the walker between scopes.
#[derive(Debug, Clone)]
pub struct RunCancellation {
    receiver: Option<watch::Receiver<bool>>,
}

/// Handle that requests cancellation of every linked [`RunCancellation`].
#[derive(Debug)]
pub struct RunCancellationHandle {
    sender: watch::Sender<bool>,
}

impl RunCancellation {
    /// Creates a linked cancellation handle and token.
    #[must_use]
    pub fn new() -> (RunCancellationHandle, Self) {
        let (sender, receiver) = watch::channel(false);
        (
            RunCancellationHandle { sender },
            Self {
                receiver: Some(receiver),
            },
        )
    }

    /// Creates a token that is never cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self { receiver: None }
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.receiver
            .as_ref()
            .is_some_and(|receiver| *receiver.borrow())
    }

    /// Waits until cancellation is requested.
    ///
    /// Never resolves for [`RunCancellation::never`] or once the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(receiver) = self.receiver.as_ref() else {
            return std::future::pending().await;
        };

        let mut receiver = receiver.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl RunCancellationHandle {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::RunCancellation;

    #[test]
    fn handle_cancels_linked_tokens() {
        let (handle, cancellation) = RunCancellation::new();
        let linked = cancellation.clone();

        assert!(!linked.is_cancelled());
        handle.cancel();
        assert!(cancellation.is_cancelled());
        assert!(linked.is_cancelled());
    }

    #[test]
    fn never_token_stays_active() {
        assert!(!RunCancellation::never().is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let (handle, cancellation) = RunCancellation::new();
        handle.cancel();

        cancellation.cancelled().await;
        assert!(cancellation.is_cancelled());
    }
}
