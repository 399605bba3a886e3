//! Models bundled with the CLI.

use crate::{CliError, CliResult};
use specl_sim::{EvalError, EvalResult, GuardedModel, Value};

pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// Constants and their defaults.
    pub constants: &'static [(&'static str, i64)],
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "counter",
        description: "counter incremented up to MAX, deadlocks there",
        constants: &[("MAX", 10)],
    },
    ModelInfo {
        name: "diehard",
        description: "3 and 5 gallon jugs; NotSolved fails once the big jug holds GOAL",
        constants: &[("GOAL", 4)],
    },
    ModelInfo {
        name: "philosophers",
        description: "N dining philosophers taking the left fork first",
        constants: &[("N", 3)],
    },
];

pub fn find(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

/// Parse `NAME=VALUE` assignments against a model's constants, filling in
/// defaults for the ones not given.
pub fn parse_constants(info: &ModelInfo, assignments: &[String]) -> CliResult<Vec<i64>> {
    let mut values: Vec<i64> = info.constants.iter().map(|(_, v)| *v).collect();

    for assignment in assignments {
        let Some((name, value)) = assignment.split_once('=') else {
            return Err(CliError::Other {
                message: format!(
                    "invalid constant format '{}', expected NAME=VALUE",
                    assignment
                ),
            });
        };
        let name = name.trim();
        let idx = info
            .constants
            .iter()
            .position(|(c, _)| *c == name)
            .ok_or_else(|| CliError::Other {
                message: format!("unknown constant '{}' for model '{}'", name, info.name),
            })?;
        values[idx] = value.trim().parse().map_err(|_| CliError::Other {
            message: format!("cannot parse value '{}' for constant '{}'", value.trim(), name),
        })?;
    }
    Ok(values)
}

pub fn build(info: &ModelInfo, constants: &[i64]) -> CliResult<GuardedModel> {
    match info.name {
        "counter" => Ok(counter(constants[0])),
        "diehard" => Ok(diehard(constants[0])),
        "philosophers" => {
            let n = constants[0];
            if !(2..=64).contains(&n) {
                return Err(CliError::Other {
                    message: format!("N must be between 2 and 64, got {}", n),
                });
            }
            Ok(philosophers(n as usize))
        }
        other => Err(CliError::UnknownModel {
            name: other.to_string(),
        }),
    }
}

fn int(v: &Value) -> EvalResult<i64> {
    v.as_int().ok_or_else(|| EvalError::TypeMismatch {
        expected: "Int".into(),
        found: v.to_string(),
    })
}

fn counter(max: i64) -> GuardedModel {
    GuardedModel::new("Counter", &["count"])
        .init(vec![Value::int(0)])
        .action("Inc", move |v| {
            let n = int(&v[0])?;
            Ok(if n < max {
                vec![vec![Value::int(n + 1)]]
            } else {
                vec![]
            })
        })
        .invariant("InRange", move |v| Ok((0..=max).contains(&int(&v[0])?)))
}

fn diehard(goal: i64) -> GuardedModel {
    let jugs = |small: i64, big: i64| vec![vec![Value::int(small), Value::int(big)]];
    GuardedModel::new("DieHard", &["small", "big"])
        .init(vec![Value::int(0), Value::int(0)])
        .action("FillSmall", move |v| Ok(jugs(3, int(&v[1])?)))
        .action("FillBig", move |v| Ok(jugs(int(&v[0])?, 5)))
        .action("EmptySmall", move |v| Ok(jugs(0, int(&v[1])?)))
        .action("EmptyBig", move |v| Ok(jugs(int(&v[0])?, 0)))
        .action("SmallToBig", move |v| {
            let (small, big) = (int(&v[0])?, int(&v[1])?);
            let poured = small.min(5 - big);
            Ok(jugs(small - poured, big + poured))
        })
        .action("BigToSmall", move |v| {
            let (small, big) = (int(&v[0])?, int(&v[1])?);
            let poured = big.min(3 - small);
            Ok(jugs(small + poured, big - poured))
        })
        .invariant("TypeOK", |v| {
            Ok((0..=3).contains(&int(&v[0])?) && (0..=5).contains(&int(&v[1])?))
        })
        .invariant("NotSolved", move |v| Ok(int(&v[1])? != goal))
}

const THINKING: i64 = 0;
const HUNGRY: i64 = 1;
const EATING: i64 = 2;
const FREE: i64 = -1;

/// Variables `phil0..` hold each philosopher's phase, `fork0..` the owner of
/// each fork (fork `i` is philosopher `i`'s left fork).
fn philosophers(n: usize) -> GuardedModel {
    let names: Vec<String> = (0..n)
        .map(|i| format!("phil{}", i))
        .chain((0..n).map(|i| format!("fork{}", i)))
        .collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut init = vec![Value::int(THINKING); n];
    init.extend(std::iter::repeat(Value::int(FREE)).take(n));

    let mut model = GuardedModel::new("Philosophers", &names).init(init);
    for i in 0..n {
        let left = n + i;
        let right = n + (i + 1) % n;
        let me = i as i64;
        model = model
            .action(&format!("TakeLeft{}", i), move |v| {
                if int(&v[i])? != THINKING || int(&v[left])? != FREE {
                    return Ok(vec![]);
                }
                let mut next = v.to_vec();
                next[i] = Value::int(HUNGRY);
                next[left] = Value::int(me);
                Ok(vec![next])
            })
            .action(&format!("TakeRight{}", i), move |v| {
                if int(&v[i])? != HUNGRY || int(&v[right])? != FREE {
                    return Ok(vec![]);
                }
                let mut next = v.to_vec();
                next[i] = Value::int(EATING);
                next[right] = Value::int(me);
                Ok(vec![next])
            })
            .action(&format!("Release{}", i), move |v| {
                if int(&v[i])? != EATING {
                    return Ok(vec![]);
                }
                let mut next = v.to_vec();
                next[i] = Value::int(THINKING);
                next[left] = Value::int(FREE);
                next[right] = Value::int(FREE);
                Ok(vec![next])
            });
    }
    model.invariant("NoAdjacentEating", move |v| {
        for i in 0..n {
            if int(&v[i])? == EATING && int(&v[(i + 1) % n])? == EATING {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use specl_sim::{Model, State};

    #[test]
    fn test_constants_default_and_override() {
        let info = find("philosophers").unwrap();
        assert_eq!(parse_constants(info, &[]).unwrap(), vec![3]);
        assert_eq!(parse_constants(info, &["N = 5".into()]).unwrap(), vec![5]);
        assert!(parse_constants(info, &["M=5".into()]).is_err());
        assert!(parse_constants(info, &["N".into()]).is_err());
        assert!(parse_constants(info, &["N=x".into()]).is_err());
    }

    #[test]
    fn test_every_model_builds() {
        for info in MODELS {
            let consts = parse_constants(info, &[]).unwrap();
            let model = build(info, &consts).unwrap();
            assert!(!model.action_names().is_empty(), "{}", info.name);
            assert_eq!(model.initial_states().unwrap().len(), 1);
        }
    }

    #[test]
    fn test_philosophers_all_hungry_is_deadlock() {
        let model = philosophers(2);
        // both philosophers hold their left fork
        let stuck = State::new(vec![
            Value::int(HUNGRY),
            Value::int(HUNGRY),
            Value::int(0),
            Value::int(1),
        ]);
        for a in 0..model.action_names().len() {
            assert!(model.successors(a, &stuck).unwrap().is_empty());
        }
    }

    #[test]
    fn test_diehard_pours() {
        let model = diehard(4);
        let s = State::new(vec![Value::int(3), Value::int(4)]);
        // SmallToBig moves only one gallon
        let next = model.successors(4, &s).unwrap();
        assert_eq!(next[0].vars.as_slice(), &[Value::int(2), Value::int(5)]);
    }
}
