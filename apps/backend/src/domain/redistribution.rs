//! Chain redistribution policy.
//!
//! Each round after the first, submitted sentences are handed off to other
//! players' chains: a uniform shuffle of the submitting player ids pairs
//! each submitter (by input position) with a target chain, and fixed points
//! are redirected to the first differing id in shuffled order. The
//! redirection is intentional best-effort self-avoidance, not a hard
//! guarantee: with a single submitter self-assignment is unavoidable, and
//! a redirected sentence can double up on a chain that round.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::room::PlayerId;

/// One author-to-target-chain pairing produced by redistribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub author: PlayerId,
    pub target: PlayerId,
}

/// Choose a target chain for every submitting player.
///
/// `submitters` is the submission order (one entry per submitter, ids
/// unique). The caller supplies the RNG so tests can pass a seeded
/// generator.
pub fn assign_targets<R: Rng + ?Sized>(submitters: &[PlayerId], rng: &mut R) -> Vec<Assignment> {
    let mut shuffled: Vec<PlayerId> = submitters.to_vec();
    shuffled.shuffle(rng);

    submitters
        .iter()
        .enumerate()
        .map(|(i, &author)| {
            let mut target = shuffled[i];
            if target == author && shuffled.len() > 1 {
                // Redirect to the first differing id in shuffled order;
                // ids are unique so one always exists when len > 1.
                target = shuffled
                    .iter()
                    .copied()
                    .find(|&id| id != author)
                    .unwrap_or(shuffled[0]);
            }
            Assignment { author, target }
        })
        .collect()
}
