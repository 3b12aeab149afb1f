use std::fmt::Write;

use crate::content::bank::QuestionBank;
use crate::content::select::{ResolvedQuestion, competition_sequence};
use crate::content::sets::SetLetter;

/// Render the printable A4 answer sheet for a set as a standalone HTML
/// document: 60 questions in two 30-question columns, every choice shown
/// unmarked. With `answers`, the spoken target of each question is checked
/// and bolded instead (the teacher's key).
///
/// The question order comes from the same `competition_sequence` the live
/// session uses, so sheet and session can never diverge for a letter.
pub fn render_sheet(letter: SetLetter, bank: &QuestionBank, answers: bool) -> String {
    let sequence = competition_sequence(letter, bank);
    let (left, right) = sequence.split_at(sequence.len().min(30));

    let title = if answers { "ANSWER KEY" } else { "PHONICS COMPETITION" };
    let generated = chrono::Local::now().format("%Y-%m-%d");

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>Phonics Competition - Set {letter}</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  @page {{ size: A4; margin: 6mm 8mm; }}
  html, body {{ width: 210mm; font-family: Arial, sans-serif; background: white; color: black; }}
  .container {{ padding: 4mm 6mm; display: flex; flex-direction: column; min-height: 285mm; }}
  .header {{ text-align: center; padding-bottom: 3mm; border-bottom: 2px solid black; }}
  .header h1 {{ font-size: 20px; font-weight: 900; letter-spacing: 1px; }}
  .header h2 {{ font-size: 26px; font-weight: 900; margin-bottom: 3mm; }}
  .fields {{ display: flex; justify-content: center; gap: 40px; font-size: 14px; font-weight: bold; }}
  .field-line {{ display: inline-block; border-bottom: 2px solid black; min-width: 140px; margin-left: 6px; }}
  .instructions {{ text-align: center; padding: 2mm 0; margin: 2mm 0; border: 1px solid #666; font-size: 11px; }}
  .grid {{ display: flex; gap: 6mm; flex: 1; }}
  .column {{ flex: 1; display: flex; flex-direction: column; justify-content: space-between; }}
  .column:first-child {{ border-right: 1px solid #999; padding-right: 5mm; }}
  .question {{ display: flex; align-items: center; flex: 1; border-bottom: 1px solid #ddd; }}
  .question:last-child {{ border-bottom: none; }}
  .num {{ font-weight: 900; width: 24px; text-align: right; margin-right: 8px; font-size: 13px; }}
  .choices {{ display: flex; gap: 12px; flex-wrap: wrap; }}
  .choice {{ font-weight: 700; font-size: 13px; white-space: nowrap; }}
  .choice.target {{ text-decoration: underline; }}
  .footer {{ text-align: center; padding-top: 2mm; border-top: 1px solid #999; font-size: 10px; color: #666; }}
</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>{title}</h1>
    <h2>SET {letter}</h2>
    <div class="fields">
      <div>Name: <span class="field-line"></span></div>
      <div>No: <span class="field-line" style="min-width:60px"></span></div>
    </div>
  </div>
  <div class="instructions">
    <strong>Instructions:</strong> Listen carefully to each word. Mark the correct spelling.
  </div>
  <div class="grid">
"#
    );

    for (column, offset) in [(left, 0), (right, 30)] {
        html.push_str("    <div class=\"column\">\n");
        for (idx, question) in column.iter().enumerate() {
            html.push_str(&question_html(question, offset + idx + 1, answers));
        }
        html.push_str("    </div>\n");
    }

    let _ = write!(
        html,
        r#"  </div>
  <div class="footer">60 Questions &bull; 4 Minutes &bull; {generated}</div>
</div>
</body>
</html>
"#
    );

    html
}

fn question_html(question: &ResolvedQuestion, number: usize, answers: bool) -> String {
    let mut out = String::new();
    let _ = write!(out, "      <div class=\"question\"><span class=\"num\">{number}.</span><div class=\"choices\">");
    for (idx, choice) in question.choices.iter().enumerate() {
        let is_target = answers && idx == question.target;
        let class = if is_target { "choice target" } else { "choice" };
        let mark = if is_target { "&#9745;" } else { "&#9744;" };
        let _ = write!(out, "<span class=\"{class}\">{mark} {}</span>", escape(choice));
    }
    out.push_str("</div></div>\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_lists_all_sixty_questions_in_sequence_order() {
        let bank = QuestionBank::load();
        let html = render_sheet(SetLetter::A, &bank, false);
        assert_eq!(html.matches("class=\"question\"").count(), 60);

        // Question 1 shows bank item 47's full choice set, unmarked.
        let item = bank.get(47).unwrap();
        for choice in &item.choices {
            assert!(html.contains(&format!("&#9744; {choice}")));
        }
        assert!(!html.contains("&#9745;"));

        // Ordering matches the live sequence: numbers appear in order.
        let sequence = competition_sequence(SetLetter::A, &bank);
        let mut cursor = 0;
        for (idx, question) in sequence.iter().enumerate() {
            let needle = format!("<span class=\"num\">{}.</span>", idx + 1);
            let pos = html[cursor..].find(&needle).expect("question number missing");
            cursor += pos;
            let row_end = html[cursor..].find("</div></div>").unwrap() + cursor;
            let row = &html[cursor..row_end];
            assert!(row.contains(question.sound()), "row {} lacks its word", idx + 1);
        }
    }

    #[test]
    fn answer_key_marks_exactly_the_targets() {
        let bank = QuestionBank::load();
        let html = render_sheet(SetLetter::B, &bank, true);
        assert_eq!(html.matches("&#9745;").count(), 60);
        assert_eq!(html.matches("choice target").count(), 60);
        assert!(html.contains("ANSWER KEY"));
    }

    #[test]
    fn student_sheet_never_reveals_targets() {
        let bank = QuestionBank::load();
        for letter in SetLetter::ALL {
            let html = render_sheet(letter, &bank, false);
            assert!(!html.contains("choice target"), "set {letter} leaks targets");
        }
    }
}
