use std::fmt;
use std::time::Duration;

/// Questions per competition set.
pub const SET_QUESTION_COUNT: usize = 60;
/// Total competition session length (the master clock).
pub const TOTAL_TIME: Duration = Duration::from_secs(240);
/// Wall-clock slot allotted to each competition question.
pub const QUESTION_CYCLE: Duration = Duration::from_millis(4000);
/// Pause between the spoken question number and the target word.
pub const DICTATION_PAUSE: Duration = Duration::from_millis(500);
/// Dictation speaks the target word slightly slower for clarity.
pub const DICTATION_RATE: f64 = 0.85;

/// One entry of a pre-authored competition schedule: which bank question to
/// present, and which of its three choices is the spoken target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: u32,
    pub target: usize,
}

const fn e(id: u32, target: usize) -> ScheduleEntry {
    ScheduleEntry { id, target }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl SetLetter {
    pub const ALL: [SetLetter; 10] = [
        SetLetter::A,
        SetLetter::B,
        SetLetter::C,
        SetLetter::D,
        SetLetter::E,
        SetLetter::F,
        SetLetter::G,
        SetLetter::H,
        SetLetter::I,
        SetLetter::J,
    ];

    pub fn from_char(ch: char) -> Option<Self> {
        let idx = (ch.to_ascii_uppercase() as u32).checked_sub('A' as u32)?;
        Self::ALL.get(idx as usize).copied()
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }

    /// The fixed 60-entry schedule for this set. Entry order is a published
    /// contract: it must match the printed answer sheet for the same letter.
    pub fn schedule(self) -> &'static [ScheduleEntry; 60] {
        match self {
            SetLetter::A => &SET_A,
            SetLetter::B => &SET_B,
            SetLetter::C => &SET_C,
            SetLetter::D => &SET_D,
            SetLetter::E => &SET_E,
            SetLetter::F => &SET_F,
            SetLetter::G => &SET_G,
            SetLetter::H => &SET_H,
            SetLetter::I => &SET_I,
            SetLetter::J => &SET_J,
        }
    }
}

impl fmt::Display for SetLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

const SET_A: [ScheduleEntry; 60] = [
    e(47, 2), e(12, 0), e(83, 2), e(5, 2), e(91, 1), e(28, 1),
    e(64, 1), e(3, 0), e(76, 1), e(39, 0), e(15, 0), e(52, 1),
    e(8, 2), e(4, 2), e(21, 0), e(67, 1), e(34, 1), e(88, 1),
    e(1, 1), e(56, 2), e(43, 1), e(79, 1), e(26, 2), e(100, 1),
    e(17, 2), e(62, 2), e(31, 1), e(74, 2), e(9, 0), e(48, 0),
    e(85, 1), e(22, 1), e(59, 2), e(36, 0), e(93, 0), e(14, 2),
    e(71, 2), e(2, 2), e(45, 0), e(82, 1), e(19, 1), e(68, 2),
    e(33, 0), e(97, 1), e(54, 0), e(11, 2), e(78, 0), e(41, 2),
    e(6, 0), e(89, 2), e(24, 0), e(63, 0), e(37, 1), e(96, 0),
    e(50, 2), e(7, 1), e(72, 0), e(29, 2), e(84, 0), e(16, 1),
];

const SET_B: [ScheduleEntry; 60] = [
    e(33, 1), e(78, 1), e(4, 2), e(61, 2), e(19, 2), e(87, 0),
    e(42, 1), e(16, 2), e(94, 0), e(55, 2), e(8, 0), e(73, 2),
    e(27, 1), e(99, 1), e(38, 0), e(65, 0), e(12, 1), e(81, 0),
    e(50, 0), e(23, 0), e(96, 1), e(67, 2), e(3, 1), e(44, 0),
    e(89, 0), e(31, 2), e(76, 2), e(14, 0), e(58, 0), e(1, 2),
    e(85, 2), e(46, 2), e(21, 1), e(70, 0), e(9, 1), e(36, 1),
    e(92, 0), e(53, 0), e(17, 0), e(79, 2), e(28, 2), e(64, 2),
    e(5, 0), e(41, 0), e(86, 1), e(35, 0), e(100, 2), e(62, 0),
    e(24, 1), e(48, 1), e(7, 2), e(83, 0), e(59, 0), e(11, 0),
    e(68, 0), e(32, 0), e(91, 2), e(45, 1), e(20, 0), e(75, 1),
];

const SET_C: [ScheduleEntry; 60] = [
    e(22, 0), e(89, 1), e(51, 0), e(7, 0), e(63, 1), e(34, 0),
    e(98, 0), e(15, 1), e(77, 0), e(46, 0), e(2, 0), e(58, 1),
    e(83, 1), e(29, 1), e(91, 0), e(12, 2), e(67, 0), e(40, 2),
    e(94, 1), e(5, 1), e(72, 1), e(19, 0), e(55, 0), e(81, 1),
    e(36, 2), e(100, 0), e(48, 2), e(26, 0), e(69, 1), e(8, 1),
    e(43, 0), e(86, 2), e(61, 0), e(14, 1), e(75, 2), e(32, 1),
    e(97, 0), e(50, 1), e(23, 1), e(79, 0), e(3, 2), e(66, 1),
    e(38, 1), e(88, 0), e(17, 1), e(54, 1), e(9, 2), e(71, 0),
    e(28, 0), e(4, 0), e(44, 1), e(60, 2), e(21, 2), e(84, 1),
    e(11, 1), e(57, 2), e(35, 1), e(92, 1), e(1, 0), e(47, 0),
];

const SET_D: [ScheduleEntry; 60] = [
    e(56, 0), e(13, 2), e(81, 2), e(39, 1), e(1, 1), e(4, 0),
    e(68, 1), e(27, 2), e(84, 2), e(42, 2), e(10, 0), e(73, 0),
    e(31, 0), e(88, 2), e(19, 2), e(52, 2), e(6, 1), e(99, 0),
    e(64, 0), e(35, 2), e(78, 2), e(22, 2), e(47, 1), e(90, 1),
    e(15, 2), e(59, 1), e(2, 1), e(71, 1), e(36, 1), e(93, 1),
    e(24, 2), e(67, 2), e(8, 0), e(45, 1), e(80, 0), e(18, 2),
    e(54, 2), e(100, 0), e(33, 2), e(76, 0), e(49, 0), e(12, 1),
    e(61, 1), e(28, 0), e(87, 1), e(43, 2), e(70, 2), e(16, 0),
    e(97, 2), e(55, 1), e(3, 1), e(82, 0), e(38, 2), e(91, 0),
    e(25, 0), e(66, 2), e(50, 0), e(9, 1), e(74, 1), e(21, 1),
];

const SET_E: [ScheduleEntry; 60] = [
    e(44, 2), e(91, 1), e(18, 0), e(72, 2), e(5, 0), e(59, 2),
    e(33, 1), e(86, 0), e(14, 0), e(69, 2), e(27, 0), e(98, 1),
    e(41, 1), e(8, 1), e(77, 1), e(50, 2), e(22, 0), e(63, 2),
    e(1, 0), e(36, 0), e(81, 1), e(10, 2), e(54, 2), e(2, 0),
    e(67, 1), e(29, 0), e(88, 2), e(45, 2), e(76, 0), e(19, 0),
    e(58, 2), e(3, 0), e(84, 0), e(31, 0), e(97, 0), e(52, 0),
    e(15, 1), e(70, 1), e(39, 2), e(93, 2), e(24, 2), e(61, 0),
    e(7, 1), e(48, 2), e(83, 2), e(35, 1), e(100, 1), e(56, 0),
    e(12, 0), e(79, 0), e(43, 2), e(66, 0), e(21, 2), e(90, 2),
    e(47, 0), e(13, 0), e(74, 0), e(38, 1), e(85, 2), e(26, 1),
];

const SET_F: [ScheduleEntry; 60] = [
    e(71, 1), e(28, 2), e(93, 2), e(6, 2), e(49, 1), e(82, 2),
    e(17, 0), e(64, 0), e(35, 0), e(100, 2), e(52, 1), e(9, 0),
    e(78, 1), e(23, 2), e(67, 0), e(40, 0), e(86, 1), e(13, 1),
    e(59, 0), e(4, 1), e(91, 2), e(32, 2), e(75, 0), e(20, 1),
    e(56, 1), e(43, 0), e(98, 2), e(61, 1), e(15, 2), e(84, 2),
    e(37, 0), e(70, 0), e(2, 1), e(47, 1), e(88, 0), e(25, 1),
    e(54, 0), e(11, 2), e(79, 1), e(33, 0), e(96, 2), e(62, 1),
    e(8, 2), e(45, 1), e(19, 1), e(73, 2), e(30, 0), e(87, 2),
    e(50, 0), e(3, 2), e(68, 1), e(24, 0), e(5, 1), e(41, 2),
    e(77, 2), e(14, 2), e(58, 0), e(81, 0), e(39, 0), e(1, 2),
];

const SET_G: [ScheduleEntry; 60] = [
    e(85, 0), e(42, 0), e(7, 2), e(60, 1), e(23, 0), e(96, 1),
    e(51, 2), e(14, 1), e(78, 0), e(33, 1), e(89, 0), e(46, 1),
    e(11, 0), e(68, 0), e(25, 2), e(94, 2), e(37, 2), e(72, 2),
    e(4, 2), e(57, 1), e(18, 1), e(83, 0), e(30, 1), e(99, 2),
    e(62, 0), e(9, 2), e(44, 1), e(76, 2), e(21, 2), e(53, 1),
    e(87, 0), e(2, 0), e(65, 1), e(38, 0), e(91, 2), e(16, 2),
    e(74, 0), e(49, 2), e(80, 1), e(27, 0), e(63, 2), e(10, 1),
    e(55, 0), e(92, 0), e(35, 0), e(70, 1), e(5, 1), e(48, 1),
    e(81, 2), e(20, 0), e(97, 1), e(43, 0), e(66, 0), e(29, 1),
    e(84, 1), e(12, 2), e(59, 0), e(36, 2), e(3, 0), e(1, 0),
];

const SET_H: [ScheduleEntry; 60] = [
    e(63, 1), e(20, 1), e(97, 2), e(34, 2), e(81, 0), e(12, 0),
    e(58, 1), e(45, 0), e(90, 0), e(7, 0), e(52, 0), e(29, 0),
    e(76, 1), e(41, 0), e(88, 1), e(15, 0), e(69, 1), e(2, 1),
    e(55, 1), e(94, 0), e(38, 2), e(73, 1), e(16, 0), e(61, 2),
    e(84, 2), e(47, 2), e(10, 0), e(99, 0), e(32, 1), e(67, 0),
    e(4, 0), e(79, 2), e(22, 1), e(56, 2), e(91, 0), e(43, 1),
    e(8, 2), e(65, 2), e(28, 1), e(86, 2), e(49, 0), e(14, 1),
    e(71, 0), e(36, 1), e(93, 1), e(50, 1), e(25, 0), e(82, 1),
    e(19, 2), e(60, 0), e(3, 1), e(44, 0), e(77, 0), e(35, 2),
    e(100, 0), e(57, 0), e(24, 1), e(68, 2), e(9, 1), e(40, 1),
];

const SET_I: [ScheduleEntry; 60] = [
    e(38, 0), e(4, 2), e(62, 2), e(11, 1), e(74, 1), e(29, 2),
    e(83, 1), e(50, 1), e(7, 1), e(44, 2), e(91, 1), e(18, 2),
    e(67, 2), e(2, 2), e(56, 0), e(23, 1), e(80, 2), e(35, 1),
    e(98, 0), e(59, 1), e(14, 2), e(47, 0), e(86, 0), e(31, 2),
    e(72, 0), e(5, 0), e(40, 0), e(93, 0), e(26, 1), e(69, 0),
    e(12, 1), e(55, 2), e(88, 1), e(33, 2), e(76, 0), e(21, 0),
    e(64, 2), e(9, 0), e(42, 1), e(99, 1), e(16, 1), e(53, 2),
    e(78, 2), e(37, 1), e(84, 0), e(27, 1), e(60, 1), e(3, 0),
    e(46, 2), e(89, 2), e(20, 2), e(71, 2), e(8, 0), e(51, 1),
    e(94, 2), e(41, 0), e(66, 2), e(15, 0), e(82, 2), e(1, 1),
];

const SET_J: [ScheduleEntry; 60] = [
    e(79, 0), e(36, 0), e(93, 2), e(14, 0), e(51, 1), e(88, 0),
    e(25, 1), e(68, 2), e(3, 2), e(46, 0), e(81, 1), e(22, 0),
    e(59, 2), e(96, 2), e(33, 1), e(70, 0), e(17, 1), e(54, 1),
    e(91, 0), e(8, 1), e(45, 2), e(28, 2), e(73, 0), e(10, 2),
    e(65, 0), e(40, 1), e(97, 0), e(52, 2), e(19, 0), e(84, 2),
    e(31, 1), e(66, 1), e(5, 0), e(42, 2), e(87, 2), e(24, 1),
    e(61, 0), e(2, 0), e(49, 1), e(76, 2), e(13, 0), e(58, 2),
    e(35, 2), e(90, 1), e(47, 1), e(72, 1), e(29, 0), e(86, 2),
    e(43, 2), e(6, 2), e(77, 0), e(20, 0), e(63, 1), e(100, 2),
    e(37, 0), e(94, 1), e(55, 2), e(12, 2), e(69, 0), e(1, 2),
];
