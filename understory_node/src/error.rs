// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Creation errors.

use understory_affinity::Unavailable;

/// Boxed error returned by backing factories.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Why a node could not produce its backing object.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CreateError {
    /// The factory failed. The node is still uninitialized with its shadow
    /// state intact, so creation can be retried.
    #[error("backing factory failed: {0}")]
    Factory(#[source] BoxError),
    /// The node's affine context no longer accepts work.
    #[error("affine context is unavailable")]
    Unavailable,
    /// The factory or the flush panicked. As with [`Factory`](Self::Factory)
    /// the node stays uninitialized with its shadow state intact.
    #[error("backing creation panicked: {0}")]
    Panicked(String),
    /// The factory tried to create the node it is creating.
    #[error("node creation re-entered from its own factory")]
    Reentrant,
}

impl From<Unavailable> for CreateError {
    fn from(_: Unavailable) -> Self {
        Self::Unavailable
    }
}
