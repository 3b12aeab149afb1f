use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::content::bank::QuestionBank;
use crate::content::sets::SetLetter;

/// A schedule entry joined against the bank: what competition question i
/// shows on screen and which choice gets dictated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQuestion {
    pub id: u32,
    pub choices: [String; 3],
    pub target: usize,
}

impl ResolvedQuestion {
    pub fn sound(&self) -> &str {
        &self.choices[self.target]
    }
}

/// One practice candidate: a bank item with one of its choices promoted to
/// the spoken word. `correct` is the index of that choice, so the correct
/// tap is always the spoken word's own card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolEntry {
    pub id: u32,
    pub choices: [String; 3],
    pub correct: usize,
}

impl PoolEntry {
    pub fn sound(&self) -> &str {
        &self.choices[self.correct]
    }
}

/// Resolve the fixed schedule for `letter` in schedule order. An entry whose
/// id is missing from the bank is dropped, not fatal: that is a content
/// authoring bug, and the session simply runs short.
pub fn competition_sequence(letter: SetLetter, bank: &QuestionBank) -> Vec<ResolvedQuestion> {
    letter
        .schedule()
        .iter()
        .filter_map(|entry| match bank.get(entry.id) {
            Some(item) => Some(ResolvedQuestion {
                id: item.id,
                choices: item.choices.clone(),
                target: entry.target,
            }),
            None => {
                tracing::error!(set = %letter, id = entry.id, "schedule references unknown question id");
                None
            }
        })
        .collect()
}

/// Expand every bank item into one pool entry per choice. A 100-item bank
/// yields 300 candidates, each speaking a different choice of its item.
pub fn practice_pool(bank: &QuestionBank) -> Vec<PoolEntry> {
    bank.items()
        .iter()
        .flat_map(|item| {
            (0..item.choices.len()).map(|idx| PoolEntry {
                id: item.id,
                choices: item.choices.clone(),
                correct: idx,
            })
        })
        .collect()
}

/// Uniform shuffle, then greedily accept entries whose spoken word has not
/// been taken yet. Uniqueness is by word, not by bank item: two entries from
/// the same item can never both be selected, and entries from different
/// items that happen to share a spelling collide too. Returns
/// `min(count, distinct sound count)` entries in acceptance order.
pub fn select_unique_targets(pool: &[PoolEntry], count: usize, rng: &mut SmallRng) -> Vec<PoolEntry> {
    let mut shuffled: Vec<&PoolEntry> = pool.iter().collect();
    shuffled.shuffle(rng);

    let mut selected = Vec::with_capacity(count.min(pool.len()));
    let mut used_words: HashSet<&str> = HashSet::new();

    for entry in shuffled {
        if selected.len() >= count {
            break;
        }
        if used_words.insert(entry.sound()) {
            selected.push(entry.clone());
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn bank() -> QuestionBank {
        QuestionBank::load()
    }

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    #[test]
    fn every_set_resolves_to_sixty_questions_in_schedule_order() {
        let bank = bank();
        for letter in SetLetter::ALL {
            let sequence = competition_sequence(letter, &bank);
            assert_eq!(sequence.len(), 60, "set {letter}");
            for (resolved, entry) in sequence.iter().zip(letter.schedule()) {
                assert_eq!(resolved.id, entry.id);
                assert_eq!(resolved.target, entry.target);
                assert_eq!(resolved.sound(), resolved.choices[entry.target]);
            }
        }
    }

    #[test]
    fn competition_sequence_is_deterministic() {
        let bank = bank();
        let first = competition_sequence(SetLetter::C, &bank);
        let second = competition_sequence(SetLetter::C, &bank);
        assert_eq!(first, second);
    }

    #[test]
    fn set_a_question_one_speaks_bank_47_choice_2() {
        let bank = bank();
        let sequence = competition_sequence(SetLetter::A, &bank);
        let item = bank.get(47).unwrap();
        assert_eq!(sequence[0].id, 47);
        assert_eq!(sequence[0].sound(), item.choices[2]);
    }

    #[test]
    fn pool_expands_three_entries_per_item() {
        let bank = bank();
        let pool = practice_pool(&bank);
        assert_eq!(pool.len(), bank.len() * 3);

        let from_first: Vec<&PoolEntry> = pool.iter().filter(|p| p.id == 1).collect();
        assert_eq!(from_first.len(), 3);
        let sounds: HashSet<&str> = from_first.iter().map(|p| p.sound()).collect();
        assert_eq!(sounds.len(), 3, "each expansion speaks a different choice");
    }

    #[test]
    fn selected_targets_have_pairwise_distinct_sounds() {
        let bank = bank();
        let pool = practice_pool(&bank);
        for seed in 0..20 {
            let selected = select_unique_targets(&pool, 50, &mut rng(seed));
            assert_eq!(selected.len(), 50);
            let sounds: HashSet<&str> = selected.iter().map(|p| p.sound()).collect();
            assert_eq!(sounds.len(), selected.len());
        }
    }

    #[test]
    fn oversized_request_caps_at_distinct_sound_count() {
        let bank = bank();
        let pool = practice_pool(&bank);
        let distinct: HashSet<&str> = pool.iter().map(|p| p.sound()).collect();

        let selected = select_unique_targets(&pool, pool.len() + 100, &mut rng(7));
        assert_eq!(selected.len(), distinct.len());
    }

    #[test]
    fn uniqueness_is_by_word_not_by_bank_item() {
        // Two entries of the same item speak different words and may both be
        // taken; entries of different items sharing a spelling collide.
        let entry = |id: u32, choices: [&str; 3], correct: usize| PoolEntry {
            id,
            choices: choices.map(str::to_string),
            correct,
        };
        let pool = vec![
            entry(1, ["cat", "cot", "cut"], 0),
            entry(1, ["cat", "cot", "cut"], 1),
            entry(1, ["cat", "cot", "cut"], 2),
            entry(2, ["cat", "dog", "pig"], 0),
            entry(2, ["cat", "dog", "pig"], 1),
            entry(2, ["cat", "dog", "pig"], 2),
        ];

        let selected = select_unique_targets(&pool, pool.len(), &mut rng(3));
        // "cat" appears in both items but is accepted once; everything else
        // survives, so the same bank item contributes multiple entries.
        assert_eq!(selected.len(), 5);
        let from_item_one = selected.iter().filter(|p| p.id == 1).count();
        let from_item_two = selected.iter().filter(|p| p.id == 2).count();
        assert!(from_item_one >= 2);
        assert!(from_item_two >= 2);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let selected = select_unique_targets(&[], 10, &mut rng(0));
        assert!(selected.is_empty());
    }
}
