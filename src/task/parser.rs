//! Reader for the SAS³ text format (spec §6.1). Tokenization of a single
//! line uses `nom`, in the same combinator style the teacher crate used for
//! its PDDL grammar; the overall line/token cursor follows the structure of
//! `TaskParser` in `examples/original_source/src/search/utils/task_parser.cc`,
//! which is the authoritative reader for this exact format.

use crate::error::TaskParseError;
use crate::name::Name;
use crate::task::fact::FactPair;
use crate::task::operator::{Effect, Operator};
use crate::task::variable::Variable;
use crate::task::{MutexGroup, Task};
use nom::character::complete::{digit1, multispace0};
use nom::combinator::recognize;
use nom::sequence::preceded;
use nom::IResult;

const PROTOCOL_VERSION: i32 = 3;

fn token(input: &str) -> IResult<&str, &str> {
    recognize(preceded(multispace0, nom::bytes::complete::is_not(" \t\r\n")))(input)
}

fn signed_int(input: &str) -> IResult<&str, &str> {
    recognize(preceded(
        multispace0,
        nom::sequence::pair(
            nom::combinator::opt(nom::character::complete::char('-')),
            digit1,
        ),
    ))(input)
}

/// A cursor over the non-blank lines of a SAS³ file, each split into
/// whitespace-separated tokens on demand.
struct Cursor<'a> {
    lines: Vec<(usize, &'a str)>,
    line_idx: usize,
    tokens: Vec<&'a str>,
    token_idx: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();
        Cursor {
            lines,
            line_idx: 0,
            tokens: Vec::new(),
            token_idx: 0,
        }
    }

    fn current_line_number(&self) -> usize {
        self.lines
            .get(self.line_idx.saturating_sub(if self.token_idx == 0 { 0 } else { 1 }))
            .map(|(n, _)| *n)
            .unwrap_or(0)
    }

    fn err(&self, message: impl Into<String>) -> TaskParseError {
        TaskParseError::Syntax {
            line: self.current_line_number(),
            message: message.into(),
        }
    }

    fn next_line(&mut self, context: &str) -> Result<&'a str, TaskParseError> {
        if self.token_idx != 0 {
            return Err(self.err(format!(
                "expected start of line while reading {context}, but mid-line"
            )));
        }
        let (_, line) = self
            .lines
            .get(self.line_idx)
            .copied()
            .ok_or_else(|| TaskParseError::UnexpectedEof {
                context: context.to_string(),
            })?;
        self.line_idx += 1;
        Ok(line)
    }

    fn load_tokens_if_needed(&mut self, context: &str) -> Result<(), TaskParseError> {
        if self.tokens.is_empty() && self.token_idx == 0 {
            let line = self.next_line(context)?;
            let mut tokens = Vec::new();
            let mut rest = line;
            while let Ok((next, tok)) = token(rest) {
                tokens.push(tok);
                rest = next;
            }
            self.tokens = tokens;
        }
        Ok(())
    }

    fn read(&mut self, context: &str) -> Result<&'a str, TaskParseError> {
        self.load_tokens_if_needed(context)?;
        let tok = self
            .tokens
            .get(self.token_idx)
            .ok_or_else(|| self.err(format!("unexpected end of line while reading {context}")))?;
        self.token_idx += 1;
        Ok(*tok)
    }

    fn read_int(&mut self, context: &str) -> Result<i32, TaskParseError> {
        let tok = self.read(context)?;
        let (_, matched) =
            signed_int(tok).map_err(|_| self.err(format!("expected integer for {context}, got '{tok}'")))?;
        if matched.len() != tok.len() {
            return Err(self.err(format!("expected integer for {context}, got '{tok}'")));
        }
        tok.parse::<i32>()
            .map_err(|_| self.err(format!("expected integer for {context}, got '{tok}'")))
    }

    fn read_line_str(&mut self, context: &str) -> Result<&'a str, TaskParseError> {
        self.confirm_end_of_line(context)?;
        self.next_line(context)
    }

    fn read_line_int(&mut self, context: &str) -> Result<i32, TaskParseError> {
        let line = self.read_line_str(context)?;
        line.trim()
            .parse::<i32>()
            .map_err(|_| self.err(format!("expected integer line for {context}, got '{line}'")))
    }

    fn confirm_end_of_line(&mut self, context: &str) -> Result<(), TaskParseError> {
        if self.tokens.is_empty() {
            return Ok(());
        }
        if self.token_idx != self.tokens.len() {
            return Err(self.err(format!(
                "expected end of line while reading {context}, but {} token(s) remain",
                self.tokens.len() - self.token_idx
            )));
        }
        self.tokens.clear();
        self.token_idx = 0;
        Ok(())
    }

    fn magic_line(&mut self, magic: &str) -> Result<(), TaskParseError> {
        let line = self.read_line_str(magic)?;
        if line.trim() != magic {
            return Err(self.err(format!("expected '{magic}', got '{}'", line.trim())));
        }
        Ok(())
    }

    fn confirm_end_of_input(&mut self) -> Result<(), TaskParseError> {
        self.confirm_end_of_line("end of input")?;
        if self.line_idx != self.lines.len() {
            return Err(self.err("trailing content after end of task"));
        }
        Ok(())
    }
}

fn read_facts_single_line(cursor: &mut Cursor, context: &str) -> Result<Vec<FactPair>, TaskParseError> {
    let count = cursor.read_int("number of conditions")?;
    let mut facts = Vec::with_capacity(count.max(0) as usize);
    for _ in 0..count {
        let var = cursor.read_int("condition variable")? as usize;
        let value = cursor.read_int("condition value")?;
        facts.push(FactPair::new(var, value));
    }
    let _ = context;
    Ok(facts)
}

fn read_facts_multi_line(cursor: &mut Cursor, context: &str) -> Result<Vec<FactPair>, TaskParseError> {
    let count = cursor.read_line_int("number of conditions")?;
    let mut facts = Vec::with_capacity(count.max(0) as usize);
    for _ in 0..count {
        let var = cursor.read_int("condition variable")? as usize;
        let value = cursor.read_int("condition value")?;
        cursor.confirm_end_of_line(context)?;
        facts.push(FactPair::new(var, value));
    }
    Ok(facts)
}

fn read_variable(cursor: &mut Cursor) -> Result<Variable, TaskParseError> {
    cursor.magic_line("begin_variable")?;
    let name = Name::new(cursor.read_line_str("variable name")?.trim());
    let axiom_layer = cursor.read_line_int("variable axiom layer")?;
    let domain_size = cursor.read_line_int("variable domain size")?;
    if domain_size < 1 {
        return Err(cursor.err(format!("domain size must be >= 1, got {domain_size}")));
    }
    let mut fact_names = Vec::with_capacity(domain_size as usize);
    for _ in 0..domain_size {
        fact_names.push(Name::new(cursor.read_line_str("fact name")?.trim()));
    }
    cursor.magic_line("end_variable")?;
    Ok(Variable {
        name,
        fact_names,
        axiom_layer,
        default_axiom_value: -1,
    })
}

fn read_mutex_group(cursor: &mut Cursor) -> Result<MutexGroup, TaskParseError> {
    cursor.magic_line("begin_mutex_group")?;
    let count = cursor.read_line_int("number of facts in mutex group")?;
    if count < 1 {
        return Err(cursor.err(format!("mutex group must have >= 1 fact, got {count}")));
    }
    let mut facts = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let var = cursor.read_int("mutex variable")? as usize;
        let value = cursor.read_int("mutex value")?;
        cursor.confirm_end_of_line("mutex group")?;
        facts.push(FactPair::new(var, value));
    }
    cursor.magic_line("end_mutex_group")?;
    Ok(MutexGroup(facts))
}

fn read_operator_effect(cursor: &mut Cursor) -> Result<(Option<FactPair>, Effect), TaskParseError> {
    let conditions = read_facts_single_line(cursor, "operator effect")?;
    let var = cursor.read_int("variable affected by effect")? as usize;
    let value_pre = cursor.read_int("variable value precondition")?;
    let value_post = cursor.read_int("variable value postcondition")?;
    cursor.confirm_end_of_line("operator effect")?;
    let precondition = (value_pre != -1).then_some(FactPair::new(var, value_pre));
    Ok((
        precondition,
        Effect {
            conditions,
            effect: FactPair::new(var, value_post),
        },
    ))
}

fn read_operator(cursor: &mut Cursor, use_metric: bool) -> Result<Operator, TaskParseError> {
    cursor.magic_line("begin_operator")?;
    let name = Name::new(cursor.read_line_str("operator name")?.trim());
    let mut preconditions = read_facts_multi_line(cursor, "operator precondition")?;
    let num_effects = cursor.read_line_int("number of operator effects")?;
    let mut effects = Vec::with_capacity(num_effects.max(0) as usize);
    for _ in 0..num_effects {
        let (extra_precondition, effect) = read_operator_effect(cursor)?;
        preconditions.extend(extra_precondition);
        effects.push(effect);
    }
    let op_cost = cursor.read_line_int("operator cost")?;
    cursor.magic_line("end_operator")?;
    preconditions.sort_unstable();
    Ok(Operator {
        name,
        preconditions,
        effects,
        cost: if use_metric { op_cost } else { 1 },
        is_axiom: false,
    })
}

fn read_axiom(cursor: &mut Cursor) -> Result<Operator, TaskParseError> {
    cursor.magic_line("begin_rule")?;
    let conditions = read_facts_multi_line(cursor, "axiom condition")?;
    let var = cursor.read_int("variable affected by axiom")? as usize;
    let value_pre = cursor.read_int("variable value precondition")?;
    let value_post = cursor.read_int("variable value postcondition")?;
    cursor.confirm_end_of_line("axiom")?;
    cursor.magic_line("end_rule")?;
    let mut preconditions: Vec<FactPair> = conditions.clone();
    if value_pre != -1 {
        preconditions.push(FactPair::new(var, value_pre));
    }
    preconditions.sort_unstable();
    Ok(Operator {
        name: Name::new("<axiom>"),
        preconditions,
        effects: vec![Effect {
            conditions,
            effect: FactPair::new(var, value_post),
        }],
        cost: 0,
        is_axiom: true,
    })
}

pub fn parse_task(text: &str) -> Result<Task, TaskParseError> {
    let mut cursor = Cursor::new(text);

    cursor.magic_line("begin_version")?;
    let version = cursor.read_line_int("version number")?;
    if version != PROTOCOL_VERSION {
        return Err(TaskParseError::UnsupportedVersion {
            found: version,
            expected: PROTOCOL_VERSION,
        });
    }
    cursor.magic_line("end_version")?;

    cursor.magic_line("begin_metric")?;
    let use_metric = match cursor.read_line_int("use metric")? {
        0 => false,
        1 => true,
        other => return Err(cursor.err(format!("expected 0 or 1 for metric, got {other}"))),
    };
    cursor.magic_line("end_metric")?;

    let num_variables = cursor.read_line_int("variable count")?;
    if num_variables < 1 {
        return Err(cursor.err(format!("variable count must be >= 1, got {num_variables}")));
    }
    let mut variables = Vec::with_capacity(num_variables as usize);
    for _ in 0..num_variables {
        variables.push(read_variable(&mut cursor)?);
    }

    let num_mutex_groups = cursor.read_line_int("number of mutex groups")?;
    let mut mutexes = Vec::with_capacity(num_mutex_groups.max(0) as usize);
    for _ in 0..num_mutex_groups {
        mutexes.push(read_mutex_group(&mut cursor)?);
    }

    cursor.magic_line("begin_state")?;
    let mut initial_state_values = Vec::with_capacity(num_variables as usize);
    for _ in 0..num_variables {
        initial_state_values.push(cursor.read_line_int("initial state variable value")?);
    }
    cursor.magic_line("end_state")?;

    for (variable, &value) in variables.iter_mut().zip(initial_state_values.iter()) {
        variable.default_axiom_value = value;
    }

    cursor.magic_line("begin_goal")?;
    let goal = read_facts_multi_line(&mut cursor, "goal")?;
    cursor.magic_line("end_goal")?;

    let num_operators = cursor.read_line_int("number of operators")?;
    let mut operators = Vec::with_capacity(num_operators.max(0) as usize);
    for _ in 0..num_operators {
        operators.push(read_operator(&mut cursor, use_metric)?);
    }

    let num_axioms = cursor.read_line_int("number of axioms")?;
    for _ in 0..num_axioms {
        operators.push(read_axiom(&mut cursor)?);
    }

    cursor.confirm_end_of_input()?;

    Task::build(
        variables,
        mutexes,
        initial_state_values,
        goal,
        operators,
        use_metric,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::*;

    #[test]
    fn parses_trivial_goal() {
        let task = parse_task(TRIVIAL_GOAL).unwrap();
        assert_eq!(task.num_variables(), 1);
        assert_eq!(task.initial_state_values, vec![0]);
    }

    #[test]
    fn parses_one_step_with_cost() {
        let task = parse_task(ONE_STEP).unwrap();
        assert_eq!(task.operator_cost(crate::task::OperatorId(0)), 3);
    }

    #[test]
    fn rejects_bad_version() {
        let bad = TRIVIAL_GOAL.replacen("3\nend_version", "4\nend_version", 1);
        let err = parse_task(&bad).unwrap_err();
        assert!(matches!(err, TaskParseError::UnsupportedVersion { found: 4, .. }));
    }

    #[test]
    fn rejects_truncated_input() {
        let truncated = "begin_version\n3\n";
        let err = parse_task(truncated).unwrap_err();
        assert!(matches!(err, TaskParseError::UnexpectedEof { .. }));
    }
}
