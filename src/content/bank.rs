use serde::Deserialize;

const QUESTIONS_EN: &str = include_str!("../../assets/questions-en.json");

/// A static word-choice question: three confusable spellings, one canonical
/// answer. The bank is authored data; it is never mutated at runtime.
#[derive(Clone, Debug, Deserialize)]
pub struct BankItem {
    pub id: u32,
    pub choices: [String; 3],
    pub correct: usize,
}

pub struct QuestionBank {
    items: Vec<BankItem>,
}

impl QuestionBank {
    pub fn load() -> Self {
        let items: Vec<BankItem> = serde_json::from_str(QUESTIONS_EN).unwrap_or_default();

        // Drop malformed rows rather than panic: a bad bank item is a data
        // authoring bug and must not take the app down.
        let items = items
            .into_iter()
            .filter(|item| item.correct < 3 && item.choices.iter().all(|c| !c.is_empty()))
            .collect();

        Self { items }
    }

    pub fn get(&self, id: u32) -> Option<&BankItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[BankItem] {
        &self.items
    }

    #[allow(dead_code)] // Used by selection tests
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::sets::SetLetter;

    #[test]
    fn bank_loads_one_hundred_items() {
        let bank = QuestionBank::load();
        assert_eq!(bank.len(), 100);
    }

    #[test]
    fn bank_ids_are_unique() {
        let bank = QuestionBank::load();
        let mut ids: Vec<u32> = bank.items().iter().map(|item| item.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), bank.len());
    }

    #[test]
    fn every_schedule_entry_resolves_against_the_shipped_bank() {
        let bank = QuestionBank::load();
        for letter in SetLetter::ALL {
            for entry in letter.schedule() {
                assert!(
                    bank.get(entry.id).is_some(),
                    "set {letter} references missing question id {}",
                    entry.id
                );
            }
        }
    }
}
