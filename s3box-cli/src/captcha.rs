use rand::SeedableRng;
use rand::rngs::SmallRng;
use s3box_lib::captcha::{CaptchaGate, Challenge, Verdict};

use crate::config::Demo;
use crate::input::Prompt;

/// captcha gate in front of the demo credentials. a fresh challenge is drawn
/// when the gate is created.
pub struct Captcha {
    gate: CaptchaGate,
    rng: SmallRng,
    demo: Option<Demo>,
}

impl Captcha {
    pub fn new(demo: Option<Demo>) -> Self {
        Self::with_rng(SmallRng::from_entropy(), demo)
    }

    pub fn with_rng(mut rng: SmallRng, demo: Option<Demo>) -> Self {
        Captcha {
            gate: CaptchaGate::new(&mut rng),
            rng,
            demo,
        }
    }

    pub fn challenge(&self) -> &Challenge {
        self.gate.challenge()
    }

    pub fn gate(&self) -> &CaptchaGate {
        &self.gate
    }

    pub fn submit(&mut self, answer: &str, prompt: &dyn Prompt) -> Verdict {
        let verdict = self.gate.submit(answer, &mut self.rng);

        tracing::debug!("captcha verdict {:?}", verdict);

        if let Some(alert) = verdict.alert() {
            prompt.alert(alert);
        }

        verdict
    }

    /// the demo credentials, only available once the gate is open
    pub fn credentials(&self) -> Option<Option<&Demo>> {
        if self.gate.is_open() {
            Some(self.demo.as_ref())
        } else {
            None
        }
    }
}
