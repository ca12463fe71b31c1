use crate::task::fact::FactPair;
use crate::name::Name;

/// A single conditional effect: `effect` fires iff every fact in `conditions`
/// holds in the state the effect is applied against (spec §3, §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub conditions: Vec<FactPair>,
    pub effect: FactPair,
}

impl Effect {
    pub fn is_satisfied(&self, values: &[i32]) -> bool {
        self.conditions
            .iter()
            .all(|condition| values[condition.var] == condition.value)
    }
}

/// A ground operator or a ground axiom rule (spec §3: "Operator ... and an
/// `is_axiom` flag"). Axioms are represented as zero-cost operators with a
/// single unconditional effect, following the modern Fast Downward encoding;
/// this lets the axiom evaluator and the relaxation heuristics share one
/// data type instead of duplicating precondition/effect storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub name: Name,
    /// Sorted, one entry per constrained variable (spec §3: "unique
    /// variables").
    pub preconditions: Vec<FactPair>,
    pub effects: Vec<Effect>,
    pub cost: i32,
    pub is_axiom: bool,
}

impl Operator {
    pub fn is_applicable(&self, values: &[i32]) -> bool {
        self.preconditions
            .iter()
            .all(|fact| values[fact.var] == fact.value)
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.effects.iter().any(|e| !e.conditions.is_empty())
    }
}

/// An index into the task's flat operator array. Kept distinct from `usize`
/// so the rest of the engine cannot accidentally mix it up with a state id
/// or a variable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperatorId(pub usize);

impl OperatorId {
    pub fn index(self) -> usize {
        self.0
    }
}
