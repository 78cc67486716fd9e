//! Player mode broadcast.
//!
//! A shared context object instead of a global: whoever owns the frame loop
//! owns the context and hands it to the systems that care. Subscribers get an
//! inbox of mode changes which they drain on their own tick.

/// What the player is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerMode {
    /// Walking around, free to pick things up.
    #[default]
    Roaming,
    /// Focused on a terminal; world interaction is blocked.
    TerminalFocus,
}

/// Handle returned by [`PlayerModeContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

#[derive(Debug, Default)]
pub struct PlayerModeContext {
    current: PlayerMode,
    next_id: u32,
    subscribers: Vec<(SubscriberId, Vec<PlayerMode>)>,
}

impl PlayerModeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PlayerMode {
        self.current
    }

    /// Change mode. Subscribers are only notified on an actual change.
    /// Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: PlayerMode) -> bool {
        if self.current == mode {
            return false;
        }
        self.current = mode;
        for (_, inbox) in &mut self.subscribers {
            inbox.push(mode);
        }
        log::info!("Player mode changed to {:?}", mode);
        true
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Vec::new()));
        id
    }

    /// Stop delivering to `id`. Pending events are discarded.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Drain mode changes delivered to `id` since its last poll, oldest first.
    pub fn poll(&mut self, id: SubscriberId) -> Vec<PlayerMode> {
        self.subscribers
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, inbox)| std::mem::take(inbox))
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_roaming() {
        assert_eq!(PlayerModeContext::new().current(), PlayerMode::Roaming);
    }

    #[test]
    fn repeated_mode_is_not_broadcast() {
        let mut ctx = PlayerModeContext::new();
        let sub = ctx.subscribe();
        assert!(!ctx.set_mode(PlayerMode::Roaming));
        assert!(ctx.set_mode(PlayerMode::TerminalFocus));
        assert!(!ctx.set_mode(PlayerMode::TerminalFocus));
        assert_eq!(ctx.poll(sub), vec![PlayerMode::TerminalFocus]);
        assert!(ctx.poll(sub).is_empty());
    }

    #[test]
    fn every_subscriber_gets_its_own_copy() {
        let mut ctx = PlayerModeContext::new();
        let a = ctx.subscribe();
        let b = ctx.subscribe();
        ctx.set_mode(PlayerMode::TerminalFocus);
        ctx.set_mode(PlayerMode::Roaming);
        let expected = vec![PlayerMode::TerminalFocus, PlayerMode::Roaming];
        assert_eq!(ctx.poll(a), expected);
        assert_eq!(ctx.poll(b), expected);
    }

    #[test]
    fn unsubscribed_inbox_is_gone() {
        let mut ctx = PlayerModeContext::new();
        let a = ctx.subscribe();
        ctx.set_mode(PlayerMode::TerminalFocus);
        ctx.unsubscribe(a);
        assert_eq!(ctx.subscriber_count(), 0);
        assert!(ctx.poll(a).is_empty());
    }
}
