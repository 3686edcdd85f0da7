//! Folding runs of pure stages into a single pass.

use std::sync::Arc;

use thiserror::Error;

use riffle_core::{PurityMarked, PurityTag};

use crate::stream::StatefulStream;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuseError {
    #[error("stage {index} is tagged {tag}; only pure stages can be fused")]
    Impure { index: usize, tag: PurityTag },
}

/// Two stages may be fused only when both are pure.
pub fn can_fuse<A, B>(a: &A, b: &B) -> bool
where
    A: PurityMarked,
    B: PurityMarked,
{
    a.purity().is_pure() && b.purity().is_pure()
}

/// Collapse `stages` into one stage that runs them in a single loop.
///
/// Equivalent to folding the list with `compose`, starting from `identity`.
/// Fails on the first stage that is not pure.
pub fn fuse_pure_sequence<T, S>(
    stages: &[StatefulStream<T, S, T>],
) -> Result<StatefulStream<T, S, T>, FuseError>
where
    T: 'static,
    S: 'static,
{
    if let Some((index, stage)) = stages
        .iter()
        .enumerate()
        .find(|(_, stage)| !stage.purity().is_pure())
    {
        return Err(FuseError::Impure {
            index,
            tag: stage.purity(),
        });
    }

    if stages.is_empty() {
        return Ok(StatefulStream::identity());
    }

    let pass: Arc<[StatefulStream<T, S, T>]> = stages.iter().cloned().collect();

    #[cfg(feature = "tracing")]
    tracing::trace!(stages = pass.len(), "fused pure sequence");

    Ok(StatefulStream::from_step(
        move |input, state| {
            pass.iter()
                .fold((state, input), |(state, value), stage| stage.run(value, state))
        },
        PurityTag::Pure,
    ))
}
