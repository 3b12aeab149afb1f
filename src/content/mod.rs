pub mod bank;
pub mod select;
pub mod sets;

pub use bank::{BankItem, QuestionBank};
pub use select::{PoolEntry, ResolvedQuestion, competition_sequence, practice_pool, select_unique_targets};
pub use sets::{ScheduleEntry, SetLetter};
