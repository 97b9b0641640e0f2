// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Presence: defer node removal until exit animations finish.
//!
//! Removing a node the moment its logical visibility flips to `false` clips any exit
//! animation the styling layer configured. [`Presence`] sits between the "should render"
//! boolean and the actual removal of the host node:
//!
//! - A hide request inspects the node's declared exit animation *once*, at the moment of
//!   the request, through an [`AnimationProbe`]. No animation: the record detaches
//!   immediately. Otherwise it enters [`Phase::ExitPending`] and hands out a fresh
//!   [`AnimationToken`].
//! - The host reports completion with [`Presence::animation_end`] (or
//!   [`Presence::animation_cancel`]) and the token it was given. Only the latest token
//!   detaches; completions of superseded animations are ignored.
//! - A show request while exiting cancels the exit and invalidates the token.
//! - If the host never reports completion, [`Presence::tick`] detaches the record once
//!   [`PresenceConfig::exit_timeout_ms`] has elapsed, and logs a warning.
//!
//! Every call returns a [`PresenceChange`] telling the owner what to do with its node.
//!
//! ## Minimal example
//!
//! ```rust
//! use overstory_presence::{Phase, Presence, PresenceChange};
//! use overstory_tree::{NodeAttrs, Tree};
//!
//! let mut tree = Tree::new();
//! let content = tree.insert(None, NodeAttrs::new().with_exit_animation("fade-out"));
//!
//! let mut presence = Presence::new(true);
//! let PresenceChange::ExitStarted(token) = presence.set_visible(false, Some(content), &tree, 0)
//! else {
//!     panic!("a declared exit animation defers removal");
//! };
//! assert_eq!(presence.phase(), Phase::ExitPending);
//! assert!(presence.is_present(false));
//!
//! assert_eq!(presence.animation_end(token), PresenceChange::Detached);
//! assert!(!presence.is_present(false));
//! ```
//!
//! ## Timestamps
//!
//! Times are caller-supplied milliseconds from any monotonic origin; the crate never
//! reads a clock.
//!
//! This crate is `no_std`.

#![no_std]

use overstory_tree::{NodeFlags, NodeId, Tree};

/// Lifecycle phase of a presence record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The node is rendered and no exit is in flight.
    Mounted,
    /// A hide was requested and the node's exit animation has not finished yet.
    ExitPending,
    /// The node is (or may be) removed from the tree.
    Detached,
}

/// Identifies one exit animation run of one presence record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationToken(u64);

impl AnimationToken {
    /// Raw token value, for hosts that key animation listeners by integer.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// What the owner of a presence record must do after a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[must_use = "the owner must mount or detach its node according to the change"]
pub enum PresenceChange {
    /// Nothing changed.
    Unchanged,
    /// The node must be mounted (it was detached).
    Mounted,
    /// A pending exit was cancelled; the node stays where it is.
    ExitCancelled,
    /// An exit animation started; report its completion with this token.
    ExitStarted(AnimationToken),
    /// The node may be removed from the tree now.
    Detached,
}

/// Source of the exit animation a node declares right now.
///
/// This stands in for reading computed style at the moment a hide is requested.
pub trait AnimationProbe<K> {
    /// Name of the exit animation `node` would run, or `None` if it runs none.
    fn exit_animation(&self, node: K) -> Option<&str>;
}

/// Hidden nodes never run exit animations; neither do nodes declaring `none`.
impl AnimationProbe<NodeId> for Tree {
    fn exit_animation(&self, node: NodeId) -> Option<&str> {
        if !self.flags(node)?.contains(NodeFlags::VISIBLE) {
            return None;
        }
        Self::exit_animation(self, node).filter(|name| !name.is_empty() && *name != "none")
    }
}

/// Configuration of a presence record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresenceConfig {
    /// Longest time (milliseconds) an exit may stay pending before [`Presence::tick`]
    /// detaches the record anyway. `None` waits forever.
    pub exit_timeout_ms: Option<u64>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            exit_timeout_ms: Some(5_000),
        }
    }
}

/// Presence record of one content node.
#[derive(Clone, Debug)]
pub struct Presence {
    /// Configuration.
    pub config: PresenceConfig,
    requested_visible: bool,
    phase: Phase,
    last_token: Option<AnimationToken>,
    next_token: u64,
    exit_deadline: Option<u64>,
}

impl Presence {
    /// Create a record, `Mounted` if `visible` and `Detached` otherwise.
    pub fn new(visible: bool) -> Self {
        Self::with_config(visible, PresenceConfig::default())
    }

    /// Create a record with an explicit configuration.
    pub fn with_config(visible: bool, config: PresenceConfig) -> Self {
        Self {
            config,
            requested_visible: visible,
            phase: if visible {
                Phase::Mounted
            } else {
                Phase::Detached
            },
            last_token: None,
            next_token: 0,
            exit_deadline: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Last requested visibility.
    pub fn requested_visible(&self) -> bool {
        self.requested_visible
    }

    /// Token of the exit animation currently awaited, if any.
    pub fn last_token(&self) -> Option<AnimationToken> {
        self.last_token
    }

    /// Time after which a pending exit is forced, if one is pending.
    pub fn exit_deadline(&self) -> Option<u64> {
        self.exit_deadline
    }

    /// Whether the node should be in the tree.
    ///
    /// `force_mount` lets an external animation controller keep the node mounted
    /// regardless of phase.
    pub fn is_present(&self, force_mount: bool) -> bool {
        force_mount || self.phase != Phase::Detached
    }

    /// Request the node to be shown or hidden at time `now`.
    ///
    /// On hide, `probe` is asked once for the exit animation of `node`; a record
    /// without a node has nothing to animate.
    pub fn set_visible<K, P>(
        &mut self,
        visible: bool,
        node: Option<K>,
        probe: &P,
        now: u64,
    ) -> PresenceChange
    where
        P: AnimationProbe<K> + ?Sized,
    {
        self.requested_visible = visible;
        match (self.phase, visible) {
            (Phase::Mounted, true) | (Phase::ExitPending | Phase::Detached, false) => {
                PresenceChange::Unchanged
            }
            (Phase::Detached, true) => {
                self.phase = Phase::Mounted;
                tracing::debug!("presence mounted");
                PresenceChange::Mounted
            }
            (Phase::ExitPending, true) => {
                self.phase = Phase::Mounted;
                self.last_token = None;
                self.exit_deadline = None;
                tracing::debug!("presence exit cancelled by re-entry");
                PresenceChange::ExitCancelled
            }
            (Phase::Mounted, false) => {
                let animated = node.is_some_and(|n| probe.exit_animation(n).is_some());
                if animated {
                    let token = AnimationToken(self.next_token);
                    self.next_token = self.next_token.wrapping_add(1);
                    self.phase = Phase::ExitPending;
                    self.last_token = Some(token);
                    self.exit_deadline = self.config.exit_timeout_ms.map(|t| now.saturating_add(t));
                    tracing::debug!(token = token.0, "presence exit started");
                    PresenceChange::ExitStarted(token)
                } else {
                    self.detach()
                }
            }
        }
    }

    /// The host finished the exit animation identified by `token`.
    pub fn animation_end(&mut self, token: AnimationToken) -> PresenceChange {
        if self.phase == Phase::ExitPending && self.last_token == Some(token) {
            self.detach()
        } else {
            tracing::trace!(token = token.0, "ignoring stale animation completion");
            PresenceChange::Unchanged
        }
    }

    /// The host cancelled the exit animation identified by `token`.
    ///
    /// A cancelled exit animation will never end, so this detaches like
    /// [`Presence::animation_end`].
    pub fn animation_cancel(&mut self, token: AnimationToken) -> PresenceChange {
        self.animation_end(token)
    }

    /// Advance time; detaches an exit that has been pending past its deadline.
    pub fn tick(&mut self, now: u64) -> PresenceChange {
        match self.exit_deadline {
            Some(deadline) if self.phase == Phase::ExitPending && now >= deadline => {
                tracing::warn!(
                    token = self.last_token.map(AnimationToken::get),
                    "exit animation never reported completion; detaching after timeout"
                );
                self.detach()
            }
            _ => PresenceChange::Unchanged,
        }
    }

    fn detach(&mut self) -> PresenceChange {
        self.phase = Phase::Detached;
        self.last_token = None;
        self.exit_deadline = None;
        tracing::debug!("presence detached");
        PresenceChange::Detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overstory_tree::NodeAttrs;

    /// A probe that reports an animation for every node.
    struct Always;

    impl AnimationProbe<u32> for Always {
        fn exit_animation(&self, _node: u32) -> Option<&str> {
            Some("fade")
        }
    }

    /// A probe that reports no animation.
    struct Never;

    impl AnimationProbe<u32> for Never {
        fn exit_animation(&self, _node: u32) -> Option<&str> {
            None
        }
    }

    fn exit(p: &mut Presence, now: u64) -> AnimationToken {
        match p.set_visible(false, Some(1_u32), &Always, now) {
            PresenceChange::ExitStarted(token) => token,
            other => panic!("expected an exit to start, got {other:?}"),
        }
    }

    #[test]
    fn initial_phase_follows_visibility() {
        assert_eq!(Presence::new(true).phase(), Phase::Mounted);
        let hidden = Presence::new(false);
        assert_eq!(hidden.phase(), Phase::Detached);
        assert!(!hidden.is_present(false));
        assert!(hidden.is_present(true), "force_mount keeps the node");
    }

    #[test]
    fn hide_without_animation_detaches_immediately() {
        let mut p = Presence::new(true);
        assert_eq!(p.set_visible(false, Some(1_u32), &Never, 0), PresenceChange::Detached);
        assert_eq!(p.phase(), Phase::Detached);
        assert_eq!(p.last_token(), None);
    }

    #[test]
    fn hide_without_node_detaches_immediately() {
        let mut p = Presence::new(true);
        assert_eq!(p.set_visible(false, None::<u32>, &Always, 0), PresenceChange::Detached);
    }

    #[test]
    fn matching_token_detaches() {
        let mut p = Presence::new(true);
        let token = exit(&mut p, 0);
        assert_eq!(p.phase(), Phase::ExitPending);
        assert!(p.is_present(false));
        assert_eq!(p.animation_end(token), PresenceChange::Detached);
        assert_eq!(p.phase(), Phase::Detached);
    }

    #[test]
    fn cancel_detaches_like_end() {
        let mut p = Presence::new(true);
        let token = exit(&mut p, 0);
        assert_eq!(p.animation_cancel(token), PresenceChange::Detached);
    }

    #[test]
    fn stale_token_after_reentry_is_ignored() {
        let mut p = Presence::new(true);
        let stale = exit(&mut p, 0);
        assert_eq!(p.set_visible(true, Some(1_u32), &Always, 10), PresenceChange::ExitCancelled);
        assert_eq!(p.animation_end(stale), PresenceChange::Unchanged);
        assert_eq!(p.phase(), Phase::Mounted);

        // A second exit gets a new token; the old one still does nothing.
        let fresh = exit(&mut p, 20);
        assert_ne!(stale, fresh);
        assert_eq!(p.animation_end(stale), PresenceChange::Unchanged);
        assert_eq!(p.phase(), Phase::ExitPending);
        assert_eq!(p.animation_end(fresh), PresenceChange::Detached);
    }

    #[test]
    fn show_after_detach_mounts() {
        let mut p = Presence::new(false);
        assert_eq!(p.set_visible(true, None::<u32>, &Never, 0), PresenceChange::Mounted);
        assert_eq!(p.set_visible(true, None::<u32>, &Never, 0), PresenceChange::Unchanged);
        assert!(p.requested_visible());
    }

    #[test]
    fn repeated_hide_keeps_the_pending_token() {
        let mut p = Presence::new(true);
        let token = exit(&mut p, 0);
        assert_eq!(p.set_visible(false, Some(1_u32), &Always, 5), PresenceChange::Unchanged);
        assert_eq!(p.last_token(), Some(token));
    }

    #[test]
    fn timeout_detaches_stuck_exit() {
        let mut p = Presence::with_config(true, PresenceConfig { exit_timeout_ms: Some(300) });
        let token = exit(&mut p, 1_000);
        assert_eq!(p.exit_deadline(), Some(1_300));
        assert_eq!(p.tick(1_299), PresenceChange::Unchanged);
        assert_eq!(p.tick(1_300), PresenceChange::Detached);
        // The late completion is now stale.
        assert_eq!(p.animation_end(token), PresenceChange::Unchanged);
    }

    #[test]
    fn no_timeout_waits_forever() {
        let mut p = Presence::with_config(true, PresenceConfig { exit_timeout_ms: None });
        let _token = exit(&mut p, 0);
        assert_eq!(p.tick(u64::MAX), PresenceChange::Unchanged);
        assert_eq!(p.phase(), Phase::ExitPending);
    }

    #[test]
    fn tree_probe_reads_declared_animation() {
        let mut tree = Tree::new();
        let plain = tree.insert(None, NodeAttrs::new());
        let animated = tree.insert(None, NodeAttrs::new().with_exit_animation("slide"));
        let disabled = tree.insert(None, NodeAttrs::new().with_exit_animation("none"));

        assert_eq!(AnimationProbe::exit_animation(&tree, plain), None);
        assert_eq!(AnimationProbe::exit_animation(&tree, animated), Some("slide"));
        assert_eq!(AnimationProbe::exit_animation(&tree, disabled), None);

        // Hidden nodes never animate.
        tree.set_flag(animated, NodeFlags::VISIBLE, false);
        assert_eq!(AnimationProbe::exit_animation(&tree, animated), None);

        // Removed nodes have nothing to animate.
        tree.remove(plain);
        assert_eq!(AnimationProbe::exit_animation(&tree, plain), None);
    }

    #[test]
    fn probe_is_consulted_at_request_time() {
        let mut tree = Tree::new();
        let node = tree.insert(None, NodeAttrs::new());
        let mut p = Presence::new(true);
        tree.set_exit_animation(node, Some("fade"));
        let change = p.set_visible(false, Some(node), &tree, 0);
        assert!(matches!(change, PresenceChange::ExitStarted(_)));
        // Clearing the declaration later does not change the pending exit.
        tree.set_exit_animation(node, None);
        assert_eq!(p.phase(), Phase::ExitPending);
    }
}
