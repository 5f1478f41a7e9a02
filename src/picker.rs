//! Drawing a command that is allowed to run in the current model state.

use crate::command::{Command, Spec};
use crate::data::{Seed, Size};
use crate::error::{Result, StatecheckError};
use crate::tree::Tree;
use std::fmt::Debug;
use std::rc::Rc;

/// Draw a command whose `requires` holds in `state`.
///
/// When the spec carries a command-name generator, a name is drawn and
/// looked up, rejecting (and redrawing, up to `discard_limit`) names whose
/// command is not currently allowed. Otherwise the choice is uniform over
/// the allowed commands, shrinking toward commands earlier in name order.
///
/// Fails with [`StatecheckError::NoCommandApplicable`] when nothing can be
/// drawn: the filtered set is empty, or the name generator produced a name
/// with no matching command.
pub fn pick<S, V>(
    spec: &Spec<S, V>,
    state: &S,
    size: Size,
    seed: &mut Seed,
    discard_limit: usize,
) -> Result<Tree<Rc<Command<S, V>>>>
where
    S: Clone + Debug + 'static,
    V: Clone + 'static,
{
    match spec.command_gen() {
        Some(generate_name) => {
            for _ in 0..discard_limit {
                let name_tree = generate_name(state).generate(size, seed.step());
                let Some(command) = spec.command(&name_tree.value) else {
                    return Err(StatecheckError::NoCommandApplicable {
                        detail: format!(
                            "command generator produced unknown name {:?}",
                            name_tree.value
                        ),
                        state: format!("{state:?}"),
                    });
                };
                if !command.requires(state) {
                    continue;
                }
                let root = Rc::clone(command);
                return Ok(resolve_names(spec, state, name_tree, root));
            }
            Err(StatecheckError::GeneratorFailed {
                reason: format!(
                    "command generator produced no allowed command in {discard_limit} draws \
                     (model state: {state:?})"
                ),
            })
        }
        None => {
            let allowed: Vec<Rc<Command<S, V>>> = spec
                .commands()
                .filter(|command| command.requires(state))
                .cloned()
                .collect();

            if allowed.is_empty() {
                return Err(StatecheckError::NoCommandApplicable {
                    detail: format!(
                        "none of the {} commands satisfies `requires`",
                        spec.command_count()
                    ),
                    state: format!("{state:?}"),
                });
            }

            let (index, _) = seed.step().next_bounded(allowed.len() as u64);
            let index = index as usize;
            let children = allowed[..index]
                .iter()
                .map(|command| Tree::singleton(Rc::clone(command)))
                .collect();
            Ok(Tree::with_children(Rc::clone(&allowed[index]), children))
        }
    }
}

/// Turn a tree of drawn names into a tree of commands, dropping shrink
/// candidates that are unknown or not currently allowed.
fn resolve_names<S, V>(
    spec: &Spec<S, V>,
    state: &S,
    tree: Tree<String>,
    root: Rc<Command<S, V>>,
) -> Tree<Rc<Command<S, V>>>
where
    S: Clone + 'static,
    V: Clone + 'static,
{
    let children = tree
        .children
        .into_iter()
        .filter_map(|child| {
            let command = Rc::clone(spec.command(&child.value)?);
            if !command.requires(state) {
                return None;
            }
            Some(resolve_names(spec, state, child, command))
        })
        .collect();

    Tree {
        value: root,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::Gen;

    fn counter_spec() -> Spec<i32, i32> {
        Spec::new(|| 0)
            .with_command(Command::new("incr"))
            .with_command(
                Command::new("decr").with_requires(|state: &i32| *state > 0),
            )
    }

    #[test]
    fn test_uniform_pick_respects_requires() {
        let spec = counter_spec();
        let mut seed = Seed::from_u64(11);

        // At 0 only `incr` is allowed, so it must always be chosen.
        for _ in 0..30 {
            let tree = pick(&spec, &0, Size::new(10), &mut seed, 100).unwrap();
            assert_eq!(tree.value.name, "incr");
            assert!(!tree.has_shrinks());
        }
    }

    #[test]
    fn test_uniform_pick_shrinks_toward_earlier_commands() {
        let spec = counter_spec();
        let mut seed = Seed::from_u64(5);

        // At 3 both commands are allowed, in name order "decr", "incr".
        // Drawing the later one must offer the earlier one as a shrink.
        let mut saw_shrink = false;
        for _ in 0..50 {
            let tree = pick(&spec, &3, Size::new(10), &mut seed, 100).unwrap();
            if tree.value.name == "incr" {
                assert_eq!(tree.children.len(), 1);
                assert_eq!(tree.children[0].value.name, "decr");
                saw_shrink = true;
            }
        }
        assert!(saw_shrink, "uniform pick never drew the later command");
    }

    #[test]
    fn test_nothing_applicable_fails_hard() {
        let spec: Spec<i32, i32> =
            Spec::new(|| 0).with_command(Command::new("locked").with_requires(|_| false));
        let mut seed = Seed::from_u64(1);

        match pick(&spec, &0, Size::new(10), &mut seed, 100) {
            Err(StatecheckError::NoCommandApplicable { state, .. }) => {
                assert_eq!(state, "0");
            }
            other => panic!("expected NoCommandApplicable, got {other:?}"),
        }
    }

    #[test]
    fn test_name_generator_mode_draws_named_command() {
        let spec = counter_spec().with_command_gen(|_| Gen::constant("incr".to_string()));
        let mut seed = Seed::from_u64(2);

        let tree = pick(&spec, &0, Size::new(10), &mut seed, 100).unwrap();
        assert_eq!(tree.value.name, "incr");
    }

    #[test]
    fn test_unknown_name_fails_hard() {
        let spec = counter_spec().with_command_gen(|_| Gen::constant("reset".to_string()));
        let mut seed = Seed::from_u64(3);

        match pick(&spec, &0, Size::new(10), &mut seed, 100) {
            Err(StatecheckError::NoCommandApplicable { detail, .. }) => {
                assert!(detail.contains("reset"));
            }
            other => panic!("expected NoCommandApplicable, got {other:?}"),
        }
    }

    #[test]
    fn test_name_generator_retries_disallowed_names() {
        // `decr` is never allowed at 0; the generator must keep drawing
        // until it lands on `incr`.
        let spec = counter_spec().with_command_gen(|_| {
            Gen::element_of(vec!["decr".to_string(), "incr".to_string()])
        });
        let mut seed = Seed::from_u64(4);

        for _ in 0..20 {
            let tree = pick(&spec, &0, Size::new(10), &mut seed, 100).unwrap();
            assert_eq!(tree.value.name, "incr");
        }
    }

    #[test]
    fn test_name_generator_exhaustion_is_reported() {
        let spec = counter_spec().with_command_gen(|_| Gen::constant("decr".to_string()));
        let mut seed = Seed::from_u64(6);

        match pick(&spec, &0, Size::new(10), &mut seed, 10) {
            Err(StatecheckError::GeneratorFailed { .. }) => {}
            other => panic!("expected GeneratorFailed, got {other:?}"),
        }
    }
}
