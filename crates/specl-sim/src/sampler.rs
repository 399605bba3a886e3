//! Random choice of states and actions.

use crate::model::{EvalResult, Model};
use crate::rng::SimRng;
use crate::state::State;

/// Pick a state uniformly from `states`. Returns None if `states` is empty.
pub fn random_state<'a>(rng: &mut SimRng, states: &'a [State]) -> Option<&'a State> {
    let len = states.len();
    if len == 0 {
        return None;
    }
    let index = (rng.next_f64() * len as f64).floor() as usize;
    states.get(index.min(len - 1))
}

/// Action indices visited from `start` stepping by `stride` modulo `len`.
///
/// With `stride` coprime to `len` this is a permutation of `0..len`.
pub fn probe_order(start: usize, stride: usize, len: usize) -> impl Iterator<Item = usize> {
    (0..len).scan(start, move |index, _| {
        let current = *index;
        *index = (*index + stride) % len;
        Some(current)
    })
}

/// Successors of `state` under a randomly chosen action.
///
/// Actions are probed in a random permutation (uniform start, random coprime
/// stride) and the first action with a non-empty successor set wins. Each
/// action is probed at most once. Returns `Ok(None)` when no action has a
/// successor, i.e. `state` is deadlocked.
pub fn random_next_states<M: Model + ?Sized>(
    model: &M,
    rng: &mut SimRng,
    state: &State,
) -> EvalResult<Option<Vec<State>>> {
    let len = model.action_names().len();
    if len == 0 {
        return Ok(None);
    }
    let start = ((rng.next_f64() * len as f64).floor() as usize).min(len - 1);
    let stride = rng.coprime_stride(len);
    for action in probe_order(start, stride, len) {
        let successors = model.successors(action, state)?;
        if !successors.is_empty() {
            return Ok(Some(successors));
        }
    }
    Ok(None)
}
