//! Prompt rendering and reply parsing for guide synthesis.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Category, Tail, TailResponse, Vote, VoteOption};

const REASONING_OPEN: &str = "<think>";
const REASONING_CLOSE: &str = "</think>";

/// Label pairs accepted in a reply, tried in order.
const SECTION_LABELS: [(&str, &str); 2] = [("제목", "내용"), ("title", "content")];

static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    SECTION_LABELS
        .iter()
        .map(|(title, content)| {
            Regex::new(&format!(
                r"(?msi)^[ \t>#*_]*{title}[ \t*_]*[:：]\s*(?P<title>[^\n]+?)[ \t]*$.*?^[ \t>#*_]*{content}[ \t*_]*[:：]\s*(?P<content>.+)\z"
            ))
            .expect("section pattern is valid")
        })
        .collect()
});

static REASONING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}.*?{}",
        regex::escape(REASONING_OPEN),
        regex::escape(REASONING_CLOSE)
    ))
    .expect("reasoning pattern is valid")
});

/// Response count and share for one option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionTally {
    pub option_id: Uuid,
    pub content: String,
    pub count: u64,
    /// `count / total * 100`, or 0 when the vote has no responses.
    pub percentage: f64,
}

/// Compute per-option counts and percentages, in option order.
pub fn tally(options: &[VoteOption], counts: &HashMap<Uuid, u64>) -> Vec<OptionTally> {
    let total: u64 = options.iter().map(|o| counts.get(&o.id).copied().unwrap_or(0)).sum();

    options
        .iter()
        .map(|option| {
            let count = counts.get(&option.id).copied().unwrap_or(0);
            OptionTally {
                option_id: option.id,
                content: option.content.clone(),
                count,
                percentage: percentage(count, total),
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// The option with the most responses; ties go to the earlier option.
pub fn leading_option(tallies: &[OptionTally]) -> Option<&OptionTally> {
    tallies
        .iter()
        .fold(None, |best: Option<&OptionTally>, t| match best {
            Some(b) if b.count >= t.count => Some(b),
            _ => Some(t),
        })
}

/// Everything a guide prompt is rendered from.
#[derive(Debug)]
pub struct PromptInput<'a> {
    pub vote: &'a Vote,
    pub tallies: &'a [OptionTally],
    pub tail: &'a Tail,
    pub answers: &'a [TailResponse],
    pub guide_type: Category,
}

fn guide_focus(guide_type: Category) -> &'static str {
    match guide_type {
        Category::Travel => {
            "a practical travel guide: where to go, when, and what people recommend doing there"
        }
        Category::Food => "a food guide: what to eat or cook, where, and why people liked it",
        Category::Fashion => "a style guide: what to wear, how to combine it, and for which occasions",
        Category::Lifestyle => "a lifestyle guide: habits, routines and tips people found worth keeping",
        Category::Hobby => "a hobby guide: how to get started, what to pick up first, and common pitfalls",
        Category::General => "a concise guide that summarizes what the community decided and why",
    }
}

/// Render the natural-language prompt sent to the completion backend.
pub fn render_prompt(input: &PromptInput<'_>) -> String {
    let total: u64 = input.tallies.iter().map(|t| t.count).sum();
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are writing {} for a community poll.",
        guide_focus(input.guide_type)
    );
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Poll question: {}", input.vote.question);
    let _ = writeln!(prompt, "Category: {}", input.vote.category);
    let _ = writeln!(prompt, "Total responses: {total}");
    match leading_option(input.tallies) {
        Some(leader) if total > 0 => {
            let _ = writeln!(prompt, "Leading option: {} ({:.1}%)", leader.content, leader.percentage);
        }
        _ => {
            let _ = writeln!(prompt, "Leading option: none (no responses were recorded)");
        }
    }
    let _ = writeln!(prompt, "Results:");
    for t in input.tallies {
        let _ = writeln!(prompt, "- {}: {:.1}% ({} votes)", t.content, t.percentage, t.count);
    }

    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Follow-up question: {}", input.tail.question);
    if input.answers.is_empty() {
        let _ = writeln!(prompt, "Follow-up answers: (none)");
    } else {
        let _ = writeln!(prompt, "Follow-up answers:");
        for answer in input.answers {
            let text = answer.answer.trim();
            if !text.is_empty() {
                let _ = writeln!(prompt, "- {text}");
            }
        }
    }

    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Write the guide in Korean, grounded only in the results and answers above."
    );
    let _ = writeln!(prompt, "Reply in exactly this format and nothing else:");
    let _ = writeln!(prompt, "제목: <one-line title>");
    let _ = write!(prompt, "내용: <guide body>");

    prompt
}

/// Remove every `<think>...</think>` block from a raw reply.
pub fn strip_reasoning(raw: &str) -> String {
    REASONING_BLOCK.replace_all(raw, "").trim().to_string()
}

/// Title and body extracted from a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGuide {
    pub title: String,
    pub content: String,
}

/// Parse the two labeled sections, trying the Korean labels first and the
/// English ones second.
pub fn parse_reply(reply: &str) -> DomainResult<ParsedGuide> {
    for pattern in SECTION_PATTERNS.iter() {
        let Some(caps) = pattern.captures(reply) else {
            continue;
        };

        let title = clean_section(&caps["title"]);
        let content = clean_section(&caps["content"]);
        if !title.is_empty() && !content.is_empty() {
            return Ok(ParsedGuide { title, content });
        }
    }

    let preview: String = reply.chars().take(80).collect();
    Err(DomainError::InvalidGuideFormat(preview))
}

fn clean_section(s: &str) -> String {
    s.trim().trim_matches(|c: char| c == '*' || c == '"').trim().to_string()
}
