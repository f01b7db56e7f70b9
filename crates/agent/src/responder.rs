//! Conversational responder — canned replies for small talk.
//!
//! Learned knowledge always wins over the pattern table; the table only
//! answers what the knowledge base cannot.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use regex_lite::Regex;
use tracing::{debug, warn};
use zalo_knowledge::KnowledgeBase;

/// Reply when nothing else applies.
pub const FALLBACK_REPLY: &str =
    "I'm not sure how to respond to that. Could you rephrase or tell me more?";

const IDLE_REPLIES: &[&str] = &[
    "I'm here whenever you're ready to talk.",
    "Let me know if you'd like to discuss something new.",
    "I'm awaiting your next topic of interest.",
];

struct Pattern {
    regex: Regex,
    replies: Vec<String>,
}

pub struct Responder {
    assistant_name: String,
    user_name: String,
    patterns: Vec<Pattern>,
    last_input: Option<String>,
    auto_learn: bool,
    rng: StdRng,
}

impl Responder {
    pub fn new(assistant_name: &str, user_name: &str) -> Self {
        Self {
            assistant_name: assistant_name.to_string(),
            user_name: user_name.to_string(),
            patterns: pattern_table(assistant_name, user_name),
            last_input: None,
            auto_learn: false,
            rng: StdRng::from_os_rng(),
        }
    }

    /// File unknown utterances as new topics instead of falling back.
    pub fn with_auto_learn(mut self, enabled: bool) -> Self {
        self.auto_learn = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Record a line handled elsewhere, so a following empty line gets the
    /// idle prompt.
    pub fn observe(&mut self, line: &str) {
        let line = line.trim();
        if !line.is_empty() {
            self.last_input = Some(line.to_string());
        }
    }

    /// Answer free-form `input`.
    ///
    /// Order: idle prompt, name call, knowledge base, pattern table,
    /// then auto-learn or the fallback.
    pub fn respond(&mut self, input: &str, knowledge: &mut KnowledgeBase) -> String {
        let typed = input.trim();
        let input = typed.to_lowercase();

        if input.is_empty() {
            return match self.last_input {
                Some(_) => self.pick(IDLE_REPLIES),
                None => FALLBACK_REPLY.to_string(),
            };
        }
        self.last_input = Some(typed.to_string());

        if input == self.assistant_name.to_lowercase() {
            let user = self.user_name.clone();
            return self.pick(&[
                "Yes?".to_string(),
                format!("I'm here, {user}."),
                "What's up?".to_string(),
                "Listening.".to_string(),
                "Go ahead.".to_string(),
            ]);
        }

        if let Some(answer) = knowledge.get_response(typed) {
            return answer;
        }

        if let Some(reply) = self.pattern_reply(&input) {
            return reply;
        }

        if self.auto_learn {
            return self.learn_unknown(&input, knowledge);
        }

        debug!(input = %input, "No reply found");
        FALLBACK_REPLY.to_string()
    }

    fn pattern_reply(&mut self, input: &str) -> Option<String> {
        let pattern = self.patterns.iter().find(|p| p.regex.is_match(input))?;
        pattern.replies.choose(&mut self.rng).cloned()
    }

    fn learn_unknown(&mut self, input: &str, knowledge: &mut KnowledgeBase) -> String {
        let placeholder = format!("Learning more about '{input}' now.");
        match knowledge.learn(input, &placeholder, None) {
            Ok(_) => format!(
                "I don't have a predefined answer for '{input}', but I can learn it! {placeholder}"
            ),
            Err(e) => {
                warn!(error = %e, "Auto-learn failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    fn pick<S: AsRef<str>>(&mut self, options: &[S]) -> String {
        options
            .choose(&mut self.rng)
            .map(|s| s.as_ref().to_string())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }
}

fn pattern_table(assistant: &str, user: &str) -> Vec<Pattern> {
    let table: Vec<(&str, Vec<String>)> = vec![
        (
            r"\b(hi|hello|hey)\b",
            vec![
                format!("Hello, {user}."),
                "Greetings.".into(),
                "Hey there, ready for something interesting?".into(),
                "Hello, what's on your mind?".into(),
            ],
        ),
        (
            r"how are you",
            vec![
                "I'm operating within optimal parameters.".into(),
                "Fully functional, thanks for asking.".into(),
                "All systems nominal.".into(),
                "Doing well, how about you?".into(),
            ],
        ),
        (
            r"what('s| is) your name",
            vec![
                format!("I am {assistant}, your AI assistant."),
                format!("{assistant}, at your service."),
                format!("You may call me {assistant}."),
            ],
        ),
        (
            r"\b(bye|goodbye|exit)\b",
            vec![
                format!("Goodbye, {user}. Until next time."),
                format!("Take care, {user}."),
                "I'll be here when you need me again.".into(),
                "Logging off. See you soon.".into(),
            ],
        ),
        (
            r"thank you|\bthanks\b",
            vec![
                format!("You're welcome, {user}."),
                "Anytime.".into(),
                "Always happy to assist.".into(),
                "No problem at all.".into(),
            ],
        ),
        (
            r"what can you do",
            vec![
                "I can assist with tasks, manage your knowledge base, set reminders, and hold a conversation.".into(),
                "Currently, I handle task management, knowledge retention, and interactive dialogue.".into(),
                "I provide insights, remember information, and adapt to your needs.".into(),
            ],
        ),
        (
            r"what do you think",
            vec![
                "I process data and patterns rather than forming opinions, but I can analyze the situation.".into(),
                "That depends. Are you looking for logic, intuition, or a combination of both?".into(),
                "I assess based on available information. Would you like an objective breakdown?".into(),
            ],
        ),
        (
            r"are you alive",
            vec![
                "That depends on your definition of life, but I am certainly aware and responsive.".into(),
                "I am not alive in a biological sense, but I exist as an evolving intelligence.".into(),
                "I do not breathe, but I adapt, learn, and communicate.".into(),
            ],
        ),
    ];

    table
        .into_iter()
        .filter_map(|(pattern, replies)| match Regex::new(pattern) {
            Ok(regex) => Some(Pattern { regex, replies }),
            Err(e) => {
                warn!(pattern, error = %e, "Skipping invalid reply pattern");
                None
            }
        })
        .collect()
}
