//! Count-up animation for statistic displays

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSuffix {
    None,
    Percent,
    Plus,
}

impl StatSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            StatSuffix::None => "",
            StatSuffix::Percent => "%",
            StatSuffix::Plus => "+",
        }
    }
}

/// Final value of a statistic as written in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    /// Interpolated from zero, e.g. `42`, `85%`, `150+`
    Count { target: u64, suffix: StatSuffix },
    /// Shown as-is without interpolation, e.g. `3/4` or `24/7`
    Literal(String),
}

impl StatValue {
    /// Parse a displayed value
    ///
    /// A `%` or `+` anywhere selects that suffix, otherwise a `/` marks a
    /// literal fraction. The numeric part is the leading run of digits; text
    /// with no leading digits is kept literal.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let suffix = if text.contains('%') {
            StatSuffix::Percent
        } else if text.contains('+') {
            StatSuffix::Plus
        } else if text.contains('/') {
            return StatValue::Literal(text.to_string());
        } else {
            StatSuffix::None
        };

        match leading_integer(text) {
            Some(target) => StatValue::Count { target, suffix },
            None => StatValue::Literal(text.to_string()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, StatValue::Literal(_))
    }

    pub fn final_text(&self) -> String {
        self.to_string()
    }

    /// Text shown at `step` of `steps`
    pub fn frame(&self, step: u32, steps: u32) -> String {
        match self {
            StatValue::Literal(text) => text.clone(),
            StatValue::Count { target, suffix } => {
                if steps == 0 || step >= steps {
                    return self.final_text();
                }
                let value = u128::from(*target) * u128::from(step) / u128::from(steps);
                format!("{}{}", value, suffix.as_str())
            }
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count { target, suffix } => write!(f, "{}{}", target, suffix.as_str()),
            StatValue::Literal(text) => f.write_str(text),
        }
    }
}

/// Leading unsigned integer, tolerating a `+` sign
fn leading_integer(text: &str) -> Option<u64> {
    let digits: String = text
        .strip_prefix('+')
        .unwrap_or(text)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// One frame produced by [`CountUp::tick`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountFrame {
    pub text: String,
    pub done: bool,
}

/// Stepwise interpolation from zero to a [`StatValue`]
#[derive(Debug, Clone)]
pub struct CountUp {
    value: StatValue,
    steps: u32,
    step: u32,
}

impl CountUp {
    pub fn new(value: StatValue, steps: u32) -> Self {
        Self {
            value,
            steps: steps.max(1),
            step: 0,
        }
    }

    pub fn value(&self) -> &StatValue {
        &self.value
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Frames produced so far
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Literal values skip interpolation entirely
    pub fn is_immediate(&self) -> bool {
        self.value.is_literal()
    }

    pub fn is_done(&self) -> bool {
        self.is_immediate() || self.step >= self.steps
    }

    pub fn tick(&mut self) -> CountFrame {
        if self.is_immediate() {
            return CountFrame {
                text: self.value.final_text(),
                done: true,
            };
        }
        self.step = (self.step + 1).min(self.steps);
        CountFrame {
            text: self.value.frame(self.step, self.steps),
            done: self.step >= self.steps,
        }
    }

    /// Skip to the final frame
    pub fn finish(&mut self) -> CountFrame {
        self.step = self.steps;
        CountFrame {
            text: self.value.final_text(),
            done: true,
        }
    }
}
