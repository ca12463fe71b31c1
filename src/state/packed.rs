//! Bit-packed states (spec §3 "Packed State", §9 Design Notes: "contiguous
//! words with precomputed `(word, shift, mask)` per variable").

use crate::task::Task;

const WORD_BITS: u32 = 32;

#[derive(Debug, Clone, Copy)]
struct VarLayout {
    word: usize,
    shift: u32,
    mask: u32,
}

/// Precomputed per-variable bit positions, shared by every state the
/// [`crate::state::StateRegistry`] packs for a given task.
#[derive(Debug, Clone)]
pub struct StateLayout {
    vars: Vec<VarLayout>,
    num_words: usize,
}

impl StateLayout {
    pub fn new(task: &Task) -> Self {
        let mut vars = Vec::with_capacity(task.num_variables());
        let mut word = 0usize;
        let mut bit_offset = 0u32;
        for variable in &task.variables {
            let bits = bits_for_domain(variable.domain_size());
            if bit_offset + bits > WORD_BITS {
                word += 1;
                bit_offset = 0;
            }
            let mask = if bits == WORD_BITS {
                u32::MAX
            } else {
                (1u32 << bits) - 1
            };
            vars.push(VarLayout {
                word,
                shift: bit_offset,
                mask,
            });
            bit_offset += bits;
        }
        let num_words = if vars.is_empty() { 0 } else { word + 1 };
        StateLayout { vars, num_words }
    }

    pub fn pack(&self, values: &[i32]) -> PackedState {
        let mut words = vec![0u32; self.num_words];
        for (layout, &value) in self.vars.iter().zip(values.iter()) {
            debug_assert!(value >= 0 && (value as u32) <= layout.mask);
            words[layout.word] |= (value as u32) << layout.shift;
        }
        PackedState(words)
    }

    pub fn unpack(&self, packed: &PackedState) -> Vec<i32> {
        self.vars
            .iter()
            .map(|layout| ((packed.0[layout.word] >> layout.shift) & layout.mask) as i32)
            .collect()
    }
}

fn bits_for_domain(domain_size: usize) -> u32 {
    debug_assert!(domain_size >= 1);
    if domain_size == 1 {
        1
    } else {
        (usize::BITS - (domain_size - 1).leading_zeros()).max(1)
    }
}

/// A state packed into contiguous words. Equality and hashing are bit
/// equality over those words (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedState(Vec<u32>);

impl PackedState {
    pub fn words(&self) -> &[u32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::ONE_STEP;

    #[test]
    fn pack_unpack_round_trip() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let layout = StateLayout::new(&task);
        let packed = layout.pack(&task.initial_state_values);
        assert_eq!(layout.unpack(&packed), task.initial_state_values);
    }

    #[test]
    fn bit_width_matches_domain_size() {
        assert_eq!(bits_for_domain(1), 1);
        assert_eq!(bits_for_domain(2), 1);
        assert_eq!(bits_for_domain(3), 2);
        assert_eq!(bits_for_domain(4), 2);
        assert_eq!(bits_for_domain(5), 3);
        assert_eq!(bits_for_domain(256), 8);
    }

    #[test]
    fn identical_vectors_pack_to_equal_states() {
        let task = Task::from_text(ONE_STEP).unwrap();
        let layout = StateLayout::new(&task);
        assert_eq!(
            layout.pack(&task.initial_state_values),
            layout.pack(&task.initial_state_values)
        );
    }
}
