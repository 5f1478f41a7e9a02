//! State-threaded generation of a command sequence.

use crate::case::CommandCall;
use crate::command::Spec;
use crate::data::{Seed, Size};
use crate::error::{Result, StatecheckError};
use crate::picker::pick;
use crate::symbolic::{Handle, Symbolic};
use crate::tree::Tree;
use std::fmt::Debug;

/// Draw a sequence of command calls from `state`, consuming handles from
/// `handles` in order, and return the per-call shrink trees together with
/// the model state the sequence ends in.
///
/// Each step first makes a weighted stop/continue choice (one part stop,
/// `remaining` parts continue), so the empty tail is always reachable while
/// longer sequences stay likelier as long as the handle budget lasts. A
/// drawn command whose precondition rejects the drawn arguments is redrawn
/// at the same position; rejections never appear in the output.
///
/// Each emitted tree's shrink candidates replace the command with a simpler
/// one while keeping the handle and arguments aligned.
pub fn draw_sequence<S, V>(
    spec: &Spec<S, V>,
    state: &S,
    handles: &[Handle],
    size: Size,
    seed: &mut Seed,
    discard_limit: usize,
) -> Result<(Vec<Tree<CommandCall<S, V>>>, S)>
where
    S: Clone + Debug + 'static,
    V: Clone + 'static,
{
    let mut calls = Vec::new();
    let mut state = state.clone();
    let mut next = 0usize;

    while next < handles.len() {
        let remaining = (handles.len() - next) as u64;
        let (roll, _) = seed.step().next_bounded(remaining + 1);
        if roll == 0 {
            break;
        }

        let mut drawn = None;
        for _ in 0..discard_limit {
            let command_tree = pick(spec, &state, size, seed, discard_limit)?;
            let args_tree = command_tree
                .value
                .args_gen(&state)
                .generate(size, seed.step());
            let args = args_tree.value;
            if !command_tree.value.precondition(&state, &args) {
                continue;
            }
            drawn = Some((command_tree, args));
            break;
        }
        let Some((command_tree, args)) = drawn else {
            return Err(StatecheckError::GeneratorFailed {
                reason: format!(
                    "no precondition-satisfying draw in {discard_limit} attempts \
                     (model state: {state:?})"
                ),
            });
        };

        let handle = handles[next].clone();
        next += 1;

        let advanced =
            command_tree
                .value
                .next_state(&state, &args, &Symbolic::root(handle.clone()));

        calls.push(command_tree.map(move |command| CommandCall {
            handle: handle.clone(),
            command,
            args: args.clone(),
        }));
        state = advanced;
    }

    Ok((calls, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::gen::Gen;
    use crate::symbolic::Arg;

    fn handles(count: usize) -> Vec<Handle> {
        (1..=count).map(Handle::prefix).collect()
    }

    fn counting_spec() -> Spec<i32, i32> {
        Spec::new(|| 0).with_command(
            Command::new("incr").with_next_state(|state: &i32, _, _| state + 1),
        )
    }

    #[test]
    fn test_handles_are_consumed_in_order() {
        let spec = counting_spec();
        let mut seed = Seed::from_u64(17);
        let (calls, _) =
            draw_sequence(&spec, &0, &handles(10), Size::new(200), &mut seed, 100).unwrap();

        for (index, call) in calls.iter().enumerate() {
            assert_eq!(call.value.handle, Handle::prefix(index + 1));
        }
    }

    #[test]
    fn test_final_state_reflects_every_call() {
        let spec = counting_spec();
        let mut seed = Seed::from_u64(23);
        let (calls, state) =
            draw_sequence(&spec, &0, &handles(10), Size::new(200), &mut seed, 100).unwrap();

        assert_eq!(state, calls.len() as i32);
    }

    #[test]
    fn test_rejected_preconditions_never_appear() {
        // `flaky` can always be drawn but rejects every argument draw, so
        // only `incr` can land in the sequence.
        let spec = counting_spec().with_command(
            Command::new("flaky")
                .with_args(|_| Gen::constant(vec![Arg::value(0)]))
                .with_precondition(|_, _| false),
        );

        let mut seed = Seed::from_u64(31);
        for _ in 0..20 {
            let (calls, _) =
                draw_sequence(&spec, &0, &handles(6), Size::new(200), &mut seed, 100).unwrap();
            for call in &calls {
                assert_eq!(call.value.command.name, "incr");
            }
        }
    }

    #[test]
    fn test_empty_handle_budget_draws_nothing() {
        let spec = counting_spec();
        let mut seed = Seed::from_u64(41);
        let (calls, state) =
            draw_sequence(&spec, &0, &[], Size::new(200), &mut seed, 100).unwrap();

        assert!(calls.is_empty());
        assert_eq!(state, 0);
    }

    #[test]
    fn test_unsatisfiable_preconditions_are_reported() {
        let spec: Spec<i32, i32> = Spec::new(|| 0)
            .with_command(Command::new("stuck").with_precondition(|_, _| false));

        let mut seed = Seed::from_u64(43);
        let mut failed = false;
        // The stop/continue roll can end a sequence before any draw; try a
        // few seeds so at least one attempts a draw.
        for _ in 0..20 {
            match draw_sequence(&spec, &0, &handles(5), Size::new(200), &mut seed, 10) {
                Err(StatecheckError::GeneratorFailed { .. }) => {
                    failed = true;
                    break;
                }
                Ok((calls, _)) => assert!(calls.is_empty()),
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(failed);
    }
}
