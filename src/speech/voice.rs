/// A platform voice as reported by the speech engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    /// BCP 47 language tag, e.g. "en-US".
    pub language: String,
}

// Name patterns in priority order. Multi-part patterns must match in order
// ("microsoft ... online"). Platform engines expose wildly inconsistent
// naming, so this is substring matching, not exact ids.
const PREFERRED_PATTERNS: [&[&str]; 5] = [
    &["google"],
    &["neural"],
    &["microsoft", "online"],
    &["natural"],
    &["enhanced"],
];

/// Pick the best available voice: highest-priority pattern among English
/// voices, then any English voice, then whatever the platform has. Pure
/// function over an explicit list so it is testable with synthetic voices.
pub fn select_voice(voices: &[VoiceInfo]) -> Option<&VoiceInfo> {
    for pattern in PREFERRED_PATTERNS {
        if let Some(voice) = voices
            .iter()
            .find(|v| is_english(v) && name_matches(&v.name, pattern))
        {
            return Some(voice);
        }
    }

    voices.iter().find(|v| is_english(v)).or_else(|| voices.first())
}

fn is_english(voice: &VoiceInfo) -> bool {
    voice.language.to_ascii_lowercase().starts_with("en")
}

fn name_matches(name: &str, parts: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    let mut rest = lower.as_str();
    for part in parts {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, language: &str) -> VoiceInfo {
        VoiceInfo {
            id: name.to_string(),
            name: name.to_string(),
            language: language.to_string(),
        }
    }

    #[test]
    fn prefers_google_over_later_patterns() {
        let voices = [
            voice("Samantha Enhanced", "en-US"),
            voice("Google US English", "en-US"),
            voice("Microsoft Aria Online", "en-US"),
        ];
        assert_eq!(select_voice(&voices).unwrap().name, "Google US English");
    }

    #[test]
    fn microsoft_pattern_requires_online_after_microsoft() {
        let voices = [
            voice("Microsoft David Desktop", "en-US"),
            voice("Microsoft Jenny Online (Natural)", "en-GB"),
        ];
        assert_eq!(
            select_voice(&voices).unwrap().name,
            "Microsoft Jenny Online (Natural)"
        );
    }

    #[test]
    fn non_english_voices_never_win_a_pattern() {
        let voices = [
            voice("Google Deutsch", "de-DE"),
            voice("Plain English", "en-AU"),
        ];
        assert_eq!(select_voice(&voices).unwrap().name, "Plain English");
    }

    #[test]
    fn pattern_matching_is_case_insensitive() {
        let voices = [voice("eSpeak NEURAL en", "en")];
        assert_eq!(select_voice(&voices).unwrap().name, "eSpeak NEURAL en");
    }

    #[test]
    fn falls_back_to_first_english_then_first_any() {
        let voices = [voice("Hortense", "fr-FR"), voice("Daniel", "en-GB")];
        assert_eq!(select_voice(&voices).unwrap().name, "Daniel");

        let only_foreign = [voice("Hortense", "fr-FR"), voice("Yuna", "ko-KR")];
        assert_eq!(select_voice(&only_foreign).unwrap().name, "Hortense");
    }

    #[test]
    fn empty_list_selects_nothing() {
        assert!(select_voice(&[]).is_none());
    }
}
