//! Counter animator
//!
//! Counts an element's number text up from zero in fixed steps. Values are
//! computed from the step index rather than accumulated, and the final step
//! restores the original text, so a finished counter always reads exactly
//! what it started with.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::CounterConfig;
use crate::motion::Millis;
use crate::page::{ElementId, Page};
use crate::schedule::{TaskId, TaskQueue};
use crate::Result;

use super::Job;

fn grouped_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^(\D*)(\d{1,3}(?:,\d{3})+)(\D.*)?$").expect("static regex"))
}

fn plain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^(\D*)(\d+)(.*)$").expect("static regex"))
}

/// Number text split around its leading integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterText {
    pub prefix: String,
    pub target: u64,
    pub suffix: String,
    /// Digits were written with `,` thousands separators
    pub grouped: bool,
    pub original: String,
}

impl CounterText {
    /// `None` when the text has no digits (or the number does not fit)
    pub fn parse(text: &str) -> Option<Self> {
        let (caps, grouped) = match grouped_regex().captures(text) {
            Some(caps) => (caps, true),
            None => (plain_regex().captures(text)?, false),
        };

        let digits: String = caps.get(2)?.as_str().chars().filter(|c| *c != ',').collect();
        let target = digits.parse().ok()?;

        Some(Self {
            prefix: caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
            target,
            suffix: caps.get(3).map(|m| m.as_str()).unwrap_or_default().to_string(),
            grouped,
            original: text.to_string(),
        })
    }

    /// Text shown for an intermediate value
    pub fn format(&self, value: u64) -> String {
        let number = if self.grouped {
            group_thousands(value)
        } else {
            value.to_string()
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One running counter
#[derive(Debug, Clone, PartialEq)]
pub struct CounterState {
    pub current_value: f64,
    pub target_value: u64,
    pub step_value: f64,
    pub steps_remaining: u32,
    step: u32,
    text: CounterText,
    task: TaskId,
}

#[derive(Debug, Clone)]
pub struct CounterAnimator {
    duration_ms: Millis,
    steps: u32,
    states: HashMap<ElementId, CounterState>,
    completed: u64,
}

impl CounterAnimator {
    pub fn new(config: &CounterConfig) -> Self {
        Self {
            duration_ms: config.duration_ms,
            steps: config.steps.max(1),
            states: HashMap::new(),
            completed: 0,
        }
    }

    /// Interval between steps
    pub fn step_ms(&self) -> Millis {
        self.duration_ms / self.steps as f64
    }

    /// Start counting `el` up from zero
    ///
    /// Returns false when the text holds no number. Restarting a running
    /// counter cancels its interval and counts toward the same original text.
    pub fn start(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, now: Millis, el: ElementId) -> Result<bool> {
        let text = match self.states.remove(&el) {
            Some(previous) => {
                tasks.cancel(previous.task);
                previous.text
            }
            None => {
                let current = page.text(el).unwrap_or_default();
                match CounterText::parse(&current) {
                    Some(text) => text,
                    None => {
                        debug!(element = %el, text = %current, "Counter text has no number, skipping");
                        return Ok(false);
                    }
                }
            }
        };

        page.set_text(el, &text.format(0))?;

        let task = tasks.schedule_interval(now, self.step_ms(), Job::CounterStep { element: el });
        debug!(element = %el, target = text.target, "Counter started");
        self.states.insert(
            el,
            CounterState {
                current_value: 0.0,
                target_value: text.target,
                step_value: text.target as f64 / self.steps as f64,
                steps_remaining: self.steps,
                step: 0,
                text,
                task,
            },
        );
        Ok(true)
    }

    /// Advance `el` by one step; the last step cancels the interval
    pub fn step(&mut self, page: &mut dyn Page, tasks: &mut TaskQueue<Job>, el: ElementId) -> Result<()> {
        let Some(state) = self.states.get_mut(&el) else {
            return Ok(());
        };

        state.step += 1;
        state.steps_remaining = self.steps.saturating_sub(state.step);

        if state.steps_remaining == 0 {
            let state = match self.states.remove(&el) {
                Some(state) => state,
                None => return Ok(()),
            };
            tasks.cancel(state.task);
            self.completed += 1;
            debug!(element = %el, text = %state.text.original, "Counter finished");
            return page.set_text(el, &state.text.original);
        }

        let value = (state.target_value as u128 * state.step as u128 / self.steps as u128) as u64;
        state.current_value = value as f64;
        let text = state.text.format(value);
        page.set_text(el, &text)
    }

    pub fn state(&self, el: ElementId) -> Option<&CounterState> {
        self.states.get(&el)
    }

    pub fn is_running(&self, el: ElementId) -> bool {
        self.states.contains_key(&el)
    }

    pub fn running(&self) -> usize {
        self.states.len()
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Forget every running counter (their tasks are dropped by the owner)
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::VirtualPage;

    #[test]
    fn test_parse_grouped_with_suffix() {
        let text = CounterText::parse("1,234 users").unwrap();
        assert_eq!(text.target, 1234);
        assert_eq!(text.suffix, " users");
        assert_eq!(text.prefix, "");
        assert!(text.grouped);
        assert_eq!(text.format(617), "617 users");
        assert_eq!(text.format(1200), "1,200 users");
    }

    #[test]
    fn test_parse_plain_and_prefix() {
        let text = CounterText::parse("98%").unwrap();
        assert_eq!((text.target, text.suffix.as_str(), text.grouped), (98, "%", false));

        let text = CounterText::parse("$50+").unwrap();
        assert_eq!((text.prefix.as_str(), text.target, text.suffix.as_str()), ("$", 50, "+"));

        let text = CounterText::parse("1,2345").unwrap();
        assert_eq!((text.target, text.suffix.as_str(), text.grouped), (1, ",2345", false));
    }

    #[test]
    fn test_parse_without_digits() {
        assert_eq!(CounterText::parse("N/A"), None);
        assert_eq!(CounterText::parse(""), None);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    fn page_with(text: &str) -> (VirtualPage, ElementId) {
        let mut page = VirtualPage::new(1280.0, 800.0);
        let body = page.body();
        let el = page
            .insert_element(body, crate::page::NewElement::new("span").text(text), crate::page::Placement::Last)
            .unwrap();
        page.take_mutations();
        (page, el)
    }

    fn run_to_end(animator: &mut CounterAnimator, page: &mut VirtualPage, tasks: &mut TaskQueue<Job>) -> Vec<String> {
        let mut texts = Vec::new();
        while let Some(task) = tasks.pop_next() {
            if let Job::CounterStep { element } = task.job {
                animator.step(page, tasks, element).unwrap();
                texts.push(page.text(element).unwrap());
            }
        }
        texts
    }

    #[test]
    fn test_counts_to_original_text() {
        let (mut page, el) = page_with("1,234 users");
        let mut tasks = TaskQueue::new();
        let mut animator = CounterAnimator::new(&CounterConfig::default());

        assert!(animator.start(&mut page, &mut tasks, 0.0, el).unwrap());
        assert_eq!(page.text(el).as_deref(), Some("0 users"));

        let texts = run_to_end(&mut animator, &mut page, &mut tasks);
        assert_eq!(texts.len(), 60);
        assert_eq!(texts[0], "20 users");
        assert_eq!(texts.last().map(String::as_str), Some("1,234 users"));
        assert!(!animator.is_running(el));
        assert!(tasks.is_empty());
        assert_eq!(animator.completed(), 1);
    }

    #[test]
    fn test_values_never_decrease() {
        let (mut page, el) = page_with("7 days");
        let mut tasks = TaskQueue::new();
        let mut animator = CounterAnimator::new(&CounterConfig::default());
        animator.start(&mut page, &mut tasks, 0.0, el).unwrap();

        let values: Vec<u64> = run_to_end(&mut animator, &mut page, &mut tasks)
            .iter()
            .map(|t| CounterText::parse(t).unwrap().target)
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values.last(), Some(&7));
    }

    #[test]
    fn test_no_number_leaves_element_alone() {
        let (mut page, el) = page_with("N/A");
        let mut tasks = TaskQueue::new();
        let mut animator = CounterAnimator::new(&CounterConfig::default());

        assert!(!animator.start(&mut page, &mut tasks, 0.0, el).unwrap());
        assert!(page.mutations().is_empty());
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_restart_cancels_previous_interval() {
        let (mut page, el) = page_with("50+");
        let mut tasks = TaskQueue::new();
        let mut animator = CounterAnimator::new(&CounterConfig::default());

        animator.start(&mut page, &mut tasks, 0.0, el).unwrap();
        for _ in 0..10 {
            animator.step(&mut page, &mut tasks, el).unwrap();
        }
        assert_ne!(page.text(el).as_deref(), Some("50+"));

        animator.start(&mut page, &mut tasks, 200.0, el).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(page.text(el).as_deref(), Some("0+"));

        let texts = run_to_end(&mut animator, &mut page, &mut tasks);
        assert_eq!(texts.last().map(String::as_str), Some("50+"));
    }

    #[test]
    fn test_step_interval() {
        let animator = CounterAnimator::new(&CounterConfig::default());
        assert!((animator.step_ms() - 2000.0 / 60.0).abs() < 1e-9);
    }
}
