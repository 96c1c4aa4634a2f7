// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node configuration.

/// How a created node handles writes from threads other than its affine
/// context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WritePolicy {
    /// Wait until the write has been applied. A later read from the same
    /// thread sees it.
    #[default]
    Blocking,
    /// Queue the write and return. A read from the writing thread may still
    /// see the previous value until the affine context drains its queue.
    Deferred,
}

/// Configuration for a [`Node`](crate::Node).
///
/// ```rust
/// use understory_node::{NodeConfig, WritePolicy};
///
/// let config = NodeConfig::new()
///     .with_write_policy(WritePolicy::Deferred)
///     .with_label("toolbar");
/// assert_eq!(config.write_policy, WritePolicy::Deferred);
/// assert_eq!(config.label.as_deref(), Some("toolbar"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Off-context write behavior once created.
    pub write_policy: WritePolicy,
    /// Name used in log events.
    pub label: Option<String>,
}

impl NodeConfig {
    /// Returns the default configuration: blocking writes, no label.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the write policy.
    #[must_use]
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.write_policy = policy;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
