//! two operand addition challenge that guards the reveal of the demo
//! credentials.
//!
//! the gate only ever moves forward from [`GateState::ChallengeShown`] to
//! [`GateState::CredentialsShown`]. a wrong answer keeps the gate where it is
//! and draws a fresh challenge, an empty or non-numeric answer is rejected
//! without touching the current challenge.

use std::ops::RangeInclusive;

use rand::Rng;

pub const OPERAND_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    operand1: u8,
    operand2: u8,
    expected: i64,
}

impl Challenge {
    pub fn generate<R>(rng: &mut R) -> Self
    where
        R: Rng
    {
        let operand1 = rng.gen_range(OPERAND_RANGE);
        let operand2 = rng.gen_range(OPERAND_RANGE);

        Challenge {
            operand1,
            operand2,
            expected: operand1 as i64 + operand2 as i64,
        }
    }

    pub fn operand1(&self) -> u8 {
        self.operand1
    }

    pub fn operand2(&self) -> u8 {
        self.operand2
    }

    pub fn expected_sum(&self) -> i64 {
        self.expected
    }
}

impl std::fmt::Display for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {} = ?", self.operand1, self.operand2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    ChallengeShown,
    CredentialsShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// nothing usable was given, the current challenge stays
    Missing,
    /// wrong sum, a new challenge has been drawn
    Incorrect,
    /// the gate moved to [`GateState::CredentialsShown`]
    Correct,
    /// the gate was already open, nothing changed
    AlreadySolved,
}

impl Verdict {
    pub fn alert(&self) -> Option<&'static str> {
        match self {
            Verdict::Missing => Some("Please enter an answer"),
            Verdict::Incorrect => Some("Incorrect answer. Please try again."),
            Verdict::Correct |
            Verdict::AlreadySolved => None,
        }
    }
}

#[derive(Debug)]
pub struct CaptchaGate {
    state: GateState,
    challenge: Challenge,
    draws: u64,
}

impl CaptchaGate {
    pub fn new<R>(rng: &mut R) -> Self
    where
        R: Rng
    {
        CaptchaGate {
            state: GateState::ChallengeShown,
            challenge: Challenge::generate(rng),
            draws: 1,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    /// total number of challenges drawn since the gate was created
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::CredentialsShown
    }

    /// submits the raw answer given by the user.
    ///
    /// leading integer digits are used the same way a lenient integer parse
    /// would, so "12abc" is read as 12 while "abc" counts as no answer.
    pub fn submit<R>(&mut self, answer: &str, rng: &mut R) -> Verdict
    where
        R: Rng
    {
        if self.is_open() {
            return Verdict::AlreadySolved;
        }

        let Some(value) = parse_answer(answer) else {
            return Verdict::Missing;
        };

        if value == self.challenge.expected {
            self.state = GateState::CredentialsShown;

            Verdict::Correct
        } else {
            self.challenge = Challenge::generate(rng);
            self.draws += 1;

            Verdict::Incorrect
        }
    }
}

fn parse_answer(given: &str) -> Option<i64> {
    let trimmed = given.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits.find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>()
        .ok()
        .map(|v| v * sign)
}
